//! Shared helpers for client operations (default parameters and transport calls).

// crates.io
use oauth2::{AsyncHttpClient, HttpRequest, HttpResponse};
// self
use crate::{
	_prelude::*,
	grant::TokenParams,
	http::TokenHttpClient,
	oauth,
	provider::ProviderConfig,
};

/// Builds the default token request parameters for `grant_type`.
///
/// The four standard keys are always present, even when empty; static `token_params` are
/// layered on top.
pub(crate) fn default_token_params(config: &ProviderConfig, grant_type: &str) -> TokenParams {
	let mut params = TokenParams::from_iter([
		("client_id".to_owned(), config.client_id().to_owned()),
		("client_secret".to_owned(), config.client_secret().to_owned()),
		("redirect_uri".to_owned(), config.redirect_uri().to_owned()),
		("grant_type".to_owned(), grant_type.to_owned()),
	]);

	params.extend(config.token_params().iter().map(|(k, v)| (k.clone(), v.clone())));

	params
}

/// Dispatches one request through a fresh transport handle.
pub(crate) async fn send<C>(http_client: &C, request: HttpRequest) -> Result<HttpResponse>
where
	C: ?Sized + TokenHttpClient,
{
	let handle = http_client.handle();

	handle.call(request).await.map_err(oauth::map_http_client_error)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_params_always_carry_standard_keys() {
		let config = ProviderConfig::builder("id")
			.token_param("resource", "api")
			.token_param("client_secret", "from-params")
			.build()
			.expect("Config should build.");
		let params = default_token_params(&config, "password");

		assert_eq!(params.get("client_id").map(String::as_str), Some("id"));
		assert_eq!(params.get("redirect_uri").map(String::as_str), Some(""));
		assert_eq!(params.get("grant_type").map(String::as_str), Some("password"));
		assert_eq!(params.get("resource").map(String::as_str), Some("api"));
		assert_eq!(params.get("client_secret").map(String::as_str), Some("from-params"));
	}
}
