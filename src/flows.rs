//! High-level client operations against a single identity provider.
//!
//! [`IdpClient`] owns the provider configuration, the provider hooks, the grant registry, and
//! the HTTP transport. Individual operations live in submodules: `authorize` composes the
//! redirect, `exchange` talks to the token endpoint, and `resource` fetches authenticated
//! documents.

pub mod authorize;

mod common;
mod exchange;
mod resource;

pub use authorize::*;

// self
use crate::{
	_prelude::*,
	grant::{Grant, GrantRegistry},
	http::TokenHttpClient,
	provider::{IdentityProvider, ProviderConfig},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestIdpClient = IdpClient<ReqwestHttpClient>;

/// OAuth 2.0 client bound to one identity provider.
///
/// Every field is shared through [`Arc`], so clones are cheap and one client can serve
/// concurrent requests. Nothing mutates after construction.
pub struct IdpClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Provider hooks (endpoints, authorize parameters, profile mapping).
	pub provider: Arc<dyn IdentityProvider>,
	/// Client credentials and wire options.
	pub config: Arc<ProviderConfig>,
	/// Grants addressable by name during exchanges.
	pub grants: Arc<GrantRegistry>,
}
impl<C> IdpClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	///
	/// The grant registry starts with the four standard grants; add more with
	/// [`IdpClient::with_grant`].
	pub fn with_http_client(
		config: ProviderConfig,
		provider: Arc<dyn IdentityProvider>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			provider,
			config: Arc::new(config),
			grants: Arc::new(GrantRegistry::standard()),
		}
	}

	/// Registers an additional grant, replacing any grant with the same name.
	pub fn with_grant(mut self, grant: Arc<dyn Grant>) -> Self {
		Arc::make_mut(&mut self.grants).register(grant);

		self
	}

	/// Replaces the whole grant registry.
	pub fn with_grants(mut self, grants: GrantRegistry) -> Self {
		self.grants = Arc::new(grants);

		self
	}
}
#[cfg(feature = "reqwest")]
impl IdpClient<ReqwestHttpClient> {
	/// Creates a new client backed by a reqwest transport that never follows redirects.
	pub fn new(config: ProviderConfig, provider: Arc<dyn IdentityProvider>) -> Result<Self> {
		Ok(Self::with_http_client(config, provider, ReqwestHttpClient::new()?))
	}
}
impl<C> Clone for IdpClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			provider: Arc::clone(&self.provider),
			config: Arc::clone(&self.config),
			grants: Arc::clone(&self.grants),
		}
	}
}
impl<C> Debug for IdpClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdpClient")
			.field("provider", &self.provider)
			.field("config", &self.config)
			.field("grants", &self.grants)
			.finish()
	}
}
