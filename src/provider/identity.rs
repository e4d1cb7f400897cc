//! Provider hook trait consumed by [`IdpClient`](crate::flows::IdpClient).
//!
//! Hooks work on crate-owned data (`BTreeMap`, [`ProfileRequest`], [`JsonValue`]) so
//! implementations never depend on the HTTP client in use.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ProviderId},
};

/// Behavior specific to one identity provider.
///
/// Implementors are required to be `Send + Sync`. Override only what you need:
/// `augment_authorize_params` has a default no-op implementation.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Stable provider identifier (e.g. `github`).
	fn id(&self) -> &ProviderId;

	/// Endpoint users are redirected to for consent.
	fn authorization_endpoint(&self) -> &Url;

	/// Endpoint grants are exchanged against.
	fn token_endpoint(&self) -> &Url;

	/// Adds or rewrites authorization redirect parameters.
	///
	/// Runs after the client composes the base parameters and before static and per-call
	/// extras are applied. Providers that insist on re-prompting (e.g. `approval_prompt=force`)
	/// set it here.
	fn augment_authorize_params(&self, _params: &mut BTreeMap<String, String>) {}

	/// Describes the request that fetches the authenticated user's profile.
	fn user_profile_request(&self, token: &AccessToken) -> Result<ProfileRequest>;

	/// Maps a raw profile document into a [`UserProfile`].
	fn parse_user_profile(&self, raw: JsonValue, token: &AccessToken) -> Result<UserProfile>;
}
impl Debug for dyn IdentityProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityProvider")
			.field("id", self.id())
			.field("authorization_endpoint", &self.authorization_endpoint().as_str())
			.field("token_endpoint", &self.token_endpoint().as_str())
			.finish()
	}
}

/// Authenticated resource request description.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileRequest {
	/// Resource URL.
	pub url: Url,
	/// Request headers; entries with empty values are dropped on send.
	pub headers: BTreeMap<String, String>,
}
impl ProfileRequest {
	/// Builds a request authorized with `Authorization: Bearer <token>`.
	pub fn bearer(url: Url, token: &AccessToken) -> Self {
		let headers =
			BTreeMap::from_iter([("Authorization".to_owned(), token.authorization_header())]);

		Self { url, headers }
	}

	/// Adds a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}
}
impl Debug for ProfileRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProfileRequest")
			.field("url", &self.url.as_str())
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Normalized user profile returned by [`IdentityProvider::parse_user_profile`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Provider the profile belongs to.
	pub provider: ProviderId,
	/// Provider-scoped user identifier.
	pub uid: String,
	/// Display name.
	pub name: Option<String>,
	/// Primary email address.
	pub email: Option<String>,
	/// Login or handle.
	pub nickname: Option<String>,
	/// Avatar URL.
	pub image_url: Option<String>,
	/// Raw profile document.
	pub raw: JsonValue,
}
