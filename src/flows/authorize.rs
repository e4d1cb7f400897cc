//! Authorization redirect composition with CSRF state and optional PKCE.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, Scopes},
	flows::IdpClient,
	http::TokenHttpClient,
	obs::{self, Operation},
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;
const DEFAULT_RESPONSE_TYPE: &str = "code";

/// Per-call overrides for [`IdpClient::build_authorization_redirect`].
#[derive(Clone, Debug, Default)]
pub struct AuthorizeOptions {
	response_type: Option<String>,
	scopes: Option<Scopes>,
	extra_params: BTreeMap<String, String>,
	pkce: bool,
}
impl AuthorizeOptions {
	/// Creates options that keep every configured default.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the `response_type` parameter (defaults to `code`).
	pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
		self.response_type = Some(response_type.into());

		self
	}

	/// Requests these scopes instead of the configured ones.
	pub fn scopes(mut self, scopes: impl Into<Scopes>) -> Self {
		self.scopes = Some(scopes.into());

		self
	}

	/// Adds a parameter that overrides every other source.
	pub fn extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.insert(key.into(), value.into());

		self
	}

	/// Attaches an RFC 7636 `S256` code challenge; the verifier is returned with the redirect.
	pub fn with_pkce(mut self) -> Self {
		self.pkce = true;

		self
	}
}

/// Redirect produced by [`IdpClient::build_authorization_redirect`].
///
/// The host persists [`state`](Self::state) (and the PKCE verifier, if any) under
/// [`state_cookie_name`](Self::state_cookie_name), then checks the value echoed back to the
/// redirect URI with [`validate_state`](Self::validate_state).
#[derive(Clone)]
pub struct AuthorizationRedirect {
	/// Fully-formed authorization URL to send the user agent to.
	pub url: Url,
	/// Unpredictable state nonce embedded in `url`.
	pub state: String,
	provider: ProviderId,
	pkce_verifier: Option<String>,
}
impl AuthorizationRedirect {
	/// PKCE verifier to send with the code exchange, when PKCE was requested.
	pub fn pkce_verifier(&self) -> Option<&str> {
		self.pkce_verifier.as_deref()
	}

	/// Session or cookie key under which hosts store the state (`<provider>_authorize_state`).
	pub fn state_cookie_name(&self) -> String {
		format!("{}_authorize_state", self.provider)
	}

	/// Validates the `state` parameter returned to the redirect URI.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if constant_shape_eq(self.state.as_bytes(), returned_state.as_bytes()) {
			Ok(())
		} else {
			Err(Error::StateMismatch)
		}
	}
}
impl Debug for AuthorizationRedirect {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRedirect")
			.field("url", &self.url.as_str())
			.field("state", &self.state)
			.field("provider", &self.provider)
			.field("pkce", &self.pkce_verifier.is_some())
			.finish()
	}
}

impl<C> IdpClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Builds the URL that sends the user agent to the provider's consent page.
	///
	/// Parameters are layered from lowest to highest precedence: the base set (`client_id`,
	/// `redirect_uri`, `state`, `scope`, `response_type`, PKCE challenge), the provider's
	/// [`augment_authorize_params`](crate::provider::IdentityProvider::augment_authorize_params)
	/// hook, the configured static `authorize_params`, and finally the per-call extras. No I/O
	/// is performed.
	pub fn build_authorization_redirect(
		&self,
		options: AuthorizeOptions,
	) -> AuthorizationRedirect {
		obs::observe_infallible(Operation::Authorize, self.provider.id(), || {
			let AuthorizeOptions { response_type, scopes, extra_params, pkce } = options;
			let state = random_string(STATE_LEN);
			let scope =
				scopes.as_ref().unwrap_or(self.config.scopes()).join(self.config.scope_separator());
			let mut params = BTreeMap::from_iter([
				("client_id".to_owned(), self.config.client_id().to_owned()),
				("redirect_uri".to_owned(), self.config.redirect_uri().to_owned()),
				("state".to_owned(), state.clone()),
				("scope".to_owned(), scope),
				(
					"response_type".to_owned(),
					response_type.unwrap_or_else(|| DEFAULT_RESPONSE_TYPE.to_owned()),
				),
			]);
			let pkce_verifier = pkce.then(|| {
				let verifier = random_string(PKCE_VERIFIER_LEN);

				params.insert("code_challenge".into(), pkce_challenge(&verifier));
				params.insert("code_challenge_method".into(), "S256".into());

				verifier
			});

			self.provider.augment_authorize_params(&mut params);
			params.extend(self.config.authorize_params().clone());
			params.extend(extra_params);

			let mut url = self.provider.authorization_endpoint().clone();

			url.query_pairs_mut().extend_pairs(params.iter());

			AuthorizationRedirect {
				url,
				state,
				provider: self.provider.id().clone(),
				pkce_verifier,
			}
		})
	}
}

/// Derives the RFC 7636 `S256` code challenge for `verifier`.
pub fn pkce_challenge(verifier: &str) -> String {
	URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

fn constant_shape_eq(expected: &[u8], actual: &[u8]) -> bool {
	if expected.len() != actual.len() {
		return false;
	}

	expected.iter().zip(actual).fold(0_u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
