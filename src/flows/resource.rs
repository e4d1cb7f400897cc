//! Authenticated resource and user-profile fetches.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::ConfigError,
	flows::{IdpClient, common},
	http::TokenHttpClient,
	oauth,
	obs::{self, Operation},
	provider::UserProfile,
};

impl<C> IdpClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Performs an authenticated `GET` and decodes the JSON body.
	///
	/// Headers with empty values are dropped. A transport failure or a non-2xx response fails
	/// with [`Error::ResourceFetchError`] carrying the last line of the underlying cause or
	/// body; a success body that is not JSON fails with [`Error::MalformedResourceResponse`].
	pub async fn fetch_authenticated_resource(
		&self,
		url: &str,
		headers: &BTreeMap<String, String>,
	) -> Result<JsonValue> {
		obs::observe(Operation::ResourceFetch, self.provider.id(), async move {
			let url = Url::parse(url).map_err(|source| ConfigError::InvalidUrl { source })?;

			self.get_json(&url, headers).await
		})
		.await
	}

	/// Fetches and maps the authenticated user's profile through the provider hooks.
	pub async fn fetch_user_profile(&self, token: &AccessToken) -> Result<UserProfile> {
		obs::observe(Operation::ResourceFetch, self.provider.id(), async move {
			let request = self.provider.user_profile_request(token)?;
			let raw = self.get_json(&request.url, &request.headers).await?;

			self.provider.parse_user_profile(raw, token)
		})
		.await
	}

	async fn get_json(&self, url: &Url, headers: &BTreeMap<String, String>) -> Result<JsonValue> {
		let request = oauth::encode_resource_request(url, headers)?;
		let response =
			common::send(self.http_client.as_ref(), request).await.map_err(|e| match e {
				Error::Transport(e) =>
					Error::ResourceFetchError { message: oauth::error_summary(&e), status: None },
				e => e,
			})?;
		let status = response.status();

		if !status.is_success() {
			return Err(Error::ResourceFetchError {
				message: oauth::last_line(response.body()),
				status: Some(status.as_u16()),
			});
		}

		serde_json::from_slice(response.body())
			.map_err(|source| Error::MalformedResourceResponse { source })
	}
}
