//! Extensible OAuth 2.0 identity-provider client: build authorization redirects, exchange any
//! grant through a pluggable grant registry, and fetch authenticated profile data over the
//! HTTP transport of your choice.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod grant;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; compiled with the `reqwest`
	//! transport and hidden from the public docs.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::IdpClient,
		http::ReqwestHttpClient,
		provider::{GenericProvider, IdentityProvider, ProviderConfig},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = IdpClient<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`IdpClient`] for the provided generic provider and configuration, backed by
	/// the reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(
		provider: GenericProvider,
		config: ProviderConfig,
	) -> ReqwestTestClient {
		let provider: Arc<dyn IdentityProvider> = Arc::new(provider);

		IdpClient::with_http_client(config, provider, test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
