//! Token endpoint exchanges for every registered grant.
//!
//! [`IdpClient::exchange_token`] resolves the grant before any I/O, merges the default
//! parameters through the grant, sends one request, and classifies the response: a
//! non-empty `error` field wins over the HTTP status, a bare non-2xx status comes next, and
//! everything else goes to the grant's parser.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	flows::{IdpClient, common},
	grant::{Grant, GrantDescriptor, GrantSelector, TokenParams},
	http::TokenHttpClient,
	oauth,
	obs::{self, Operation},
};

impl<C> IdpClient<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Exchanges a grant for an [`AccessToken`].
	///
	/// `params` override the defaults (`client_id`, `client_secret`, `redirect_uri`,
	/// `grant_type`, static `token_params`) and, for descriptor selectors, the descriptor's
	/// own parameters. Unknown grant names fail with [`Error::UnknownGrantKind`] without
	/// contacting the provider.
	pub async fn exchange_token(
		&self,
		grant: impl Into<GrantSelector>,
		params: TokenParams,
	) -> Result<AccessToken> {
		let selector = grant.into();

		obs::observe(Operation::TokenExchange, self.provider.id(), async move {
			let (grant, overrides) = self.resolve_grant(selector, params)?;
			let defaults = common::default_token_params(&self.config, grant.name());
			let final_params = grant.prepare_params(defaults, overrides);

			self.request_token(grant.as_ref(), &final_params).await
		})
		.await
	}

	/// Exchanges an authorization code, forwarding the PKCE verifier when present.
	pub async fn exchange_code(
		&self,
		code: impl Into<String>,
		code_verifier: Option<String>,
	) -> Result<AccessToken> {
		let descriptor = GrantDescriptor::AuthorizationCode { code: code.into(), code_verifier };

		self.exchange_token(descriptor, TokenParams::new()).await
	}

	/// Exchanges a refresh token for a new access token.
	pub async fn refresh_access_token(
		&self,
		refresh_token: impl Into<String>,
	) -> Result<AccessToken> {
		let descriptor = GrantDescriptor::RefreshToken { refresh_token: refresh_token.into() };

		self.exchange_token(descriptor, TokenParams::new()).await
	}

	/// Requests an app-only token; `params` carry extras such as `scope` or `audience`.
	pub async fn client_credentials(&self, params: TokenParams) -> Result<AccessToken> {
		self.exchange_token(GrantDescriptor::ClientCredentials, params).await
	}

	/// Exchanges resource-owner credentials.
	pub async fn password(
		&self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Result<AccessToken> {
		let descriptor =
			GrantDescriptor::Password { username: username.into(), password: password.into() };

		self.exchange_token(descriptor, TokenParams::new()).await
	}

	fn resolve_grant(
		&self,
		selector: GrantSelector,
		params: TokenParams,
	) -> Result<(Arc<dyn Grant>, TokenParams)> {
		match selector {
			GrantSelector::Name(name) => Ok((self.grants.resolve(&name)?, params)),
			GrantSelector::Descriptor(descriptor) => {
				let grant = self.grants.resolve(descriptor.name())?;
				let mut overrides = descriptor.params();

				overrides.extend(params);

				Ok((grant, overrides))
			},
			GrantSelector::Instance(grant) => Ok((grant, params)),
		}
	}

	async fn request_token(&self, grant: &dyn Grant, params: &TokenParams) -> Result<AccessToken> {
		let request = oauth::encode_token_request(
			self.provider.token_endpoint(),
			self.config.token_method(),
			self.config.response_encoding(),
			params,
		)?;
		let response = common::send(self.http_client.as_ref(), request).await?;
		let status = response.status().as_u16();
		let body = response.body();
		let payload =
			oauth::decode_token_response(body, self.config.response_encoding(), Some(status));

		match payload {
			Ok(payload) if oauth::has_provider_error(&payload) =>
				Err(Error::ProviderError { payload, status: Some(status) }),
			_ if !response.status().is_success() =>
				Err(Error::TokenEndpoint { status, body: oauth::body_text(body) }),
			Ok(payload) => grant.parse_response(payload, self.config.uid_key()),
			Err(e) => Err(e),
		}
	}
}
