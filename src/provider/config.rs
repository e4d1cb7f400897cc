//! Immutable client configuration and its builder.

// self
use crate::{_prelude::*, auth::Scopes, grant::TokenParams};

const DEFAULT_SCOPE_SEPARATOR: &str = ",";
const DEFAULT_UID_KEY: &str = "uid";

/// HTTP method used to call the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMethod {
	/// Parameters travel in the query string.
	Get,
	#[default]
	/// Parameters travel in an `application/x-www-form-urlencoded` body.
	Post,
}

/// Body encoding the token endpoint responds with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseEncoding {
	#[default]
	/// JSON object.
	Json,
	/// URL-encoded query string (`access_token=...&expires=...`).
	#[serde(alias = "string")]
	UrlEncoded,
}

/// Errors raised while validating a [`ProviderConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderConfigError {
	/// Scope separators cannot contain control characters.
	#[error("Scope separator must be printable: {separator:?}.")]
	InvalidScopeSeparator {
		/// Invalid separator that was supplied.
		separator: String,
	},
	/// The uid key cannot be empty.
	#[error("The uid key cannot be empty.")]
	EmptyUidKey,
}

/// Immutable client configuration for one identity provider.
///
/// Client id, secret, and redirect URI are opaque: they are forwarded verbatim and never
/// validated here. Deserialization goes through [`ProviderConfigBuilder`], so configs loaded
/// from files obey the same checks as programmatic ones.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProviderConfigBuilder")]
pub struct ProviderConfig {
	client_id: String,
	client_secret: String,
	redirect_uri: String,
	scopes: Scopes,
	scope_separator: String,
	token_method: TokenMethod,
	response_encoding: ResponseEncoding,
	uid_key: String,
	authorize_params: TokenParams,
	token_params: TokenParams,
}
impl ProviderConfig {
	/// Creates a new builder for the provided client identifier.
	pub fn builder(client_id: impl Into<String>) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(client_id)
	}

	/// OAuth 2.0 client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Client secret; empty for public clients.
	pub fn client_secret(&self) -> &str {
		&self.client_secret
	}

	/// Redirect URI registered with the provider.
	pub fn redirect_uri(&self) -> &str {
		&self.redirect_uri
	}

	/// Default scopes requested during authorization.
	pub fn scopes(&self) -> &Scopes {
		&self.scopes
	}

	/// Separator used to join list scopes.
	pub fn scope_separator(&self) -> &str {
		&self.scope_separator
	}

	/// HTTP method for token exchanges.
	pub fn token_method(&self) -> TokenMethod {
		self.token_method
	}

	/// Token endpoint response encoding.
	pub fn response_encoding(&self) -> ResponseEncoding {
		self.response_encoding
	}

	/// Token response field holding the provider user id.
	pub fn uid_key(&self) -> &str {
		&self.uid_key
	}

	/// Static parameters appended to every authorization redirect.
	pub fn authorize_params(&self) -> &TokenParams {
		&self.authorize_params
	}

	/// Static parameters appended to every token request.
	pub fn token_params(&self) -> &TokenParams {
		&self.token_params
	}
}
impl Debug for ProviderConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("redirect_uri", &self.redirect_uri)
			.field("scopes", &self.scopes)
			.field("scope_separator", &self.scope_separator)
			.field("token_method", &self.token_method)
			.field("response_encoding", &self.response_encoding)
			.field("uid_key", &self.uid_key)
			.field("authorize_params", &self.authorize_params)
			.field("token_params", &self.token_params.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`ProviderConfig`] values.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfigBuilder {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret (empty for public clients).
	#[serde(default)]
	pub client_secret: String,
	/// Redirect URI registered with the provider.
	#[serde(default)]
	pub redirect_uri: String,
	/// Default scopes.
	#[serde(default)]
	pub scopes: Scopes,
	/// Separator used to join list scopes.
	#[serde(default = "default_scope_separator")]
	pub scope_separator: String,
	/// HTTP method for token exchanges.
	#[serde(default)]
	pub token_method: TokenMethod,
	/// Token endpoint response encoding.
	#[serde(default)]
	pub response_encoding: ResponseEncoding,
	/// Token response field holding the provider user id.
	#[serde(default = "default_uid_key")]
	pub uid_key: String,
	/// Static authorization redirect parameters.
	#[serde(default)]
	pub authorize_params: TokenParams,
	/// Static token request parameters.
	#[serde(default)]
	pub token_params: TokenParams,
}
impl ProviderConfigBuilder {
	/// Creates a new builder seeded with the provided client identifier.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: String::new(),
			redirect_uri: String::new(),
			scopes: Scopes::default(),
			scope_separator: default_scope_separator(),
			token_method: TokenMethod::default(),
			response_encoding: ResponseEncoding::default(),
			uid_key: default_uid_key(),
			authorize_params: TokenParams::new(),
			token_params: TokenParams::new(),
		}
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = secret.into();

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = uri.into();

		self
	}

	/// Sets the default scopes.
	pub fn scopes(mut self, scopes: impl Into<Scopes>) -> Self {
		self.scopes = scopes.into();

		self
	}

	/// Overrides the scope separator (defaults to `,`).
	pub fn scope_separator(mut self, separator: impl Into<String>) -> Self {
		self.scope_separator = separator.into();

		self
	}

	/// Overrides the token exchange method (defaults to `POST`).
	pub fn token_method(mut self, method: TokenMethod) -> Self {
		self.token_method = method;

		self
	}

	/// Overrides the token response encoding (defaults to JSON).
	pub fn response_encoding(mut self, encoding: ResponseEncoding) -> Self {
		self.response_encoding = encoding;

		self
	}

	/// Overrides the uid key (defaults to `uid`).
	pub fn uid_key(mut self, key: impl Into<String>) -> Self {
		self.uid_key = key.into();

		self
	}

	/// Adds a static authorization redirect parameter.
	pub fn authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.authorize_params.insert(key.into(), value.into());

		self
	}

	/// Adds a static token request parameter.
	pub fn token_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.token_params.insert(key.into(), value.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		if self.scope_separator.chars().any(char::is_control) {
			return Err(ProviderConfigError::InvalidScopeSeparator {
				separator: self.scope_separator,
			});
		}
		if self.uid_key.is_empty() {
			return Err(ProviderConfigError::EmptyUidKey);
		}

		Ok(ProviderConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			redirect_uri: self.redirect_uri,
			scopes: self.scopes,
			scope_separator: self.scope_separator,
			token_method: self.token_method,
			response_encoding: self.response_encoding,
			uid_key: self.uid_key,
			authorize_params: self.authorize_params,
			token_params: self.token_params,
		})
	}
}
impl TryFrom<ProviderConfigBuilder> for ProviderConfig {
	type Error = ProviderConfigError;

	fn try_from(value: ProviderConfigBuilder) -> Result<Self, Self::Error> {
		value.build()
	}
}

fn default_scope_separator() -> String {
	DEFAULT_SCOPE_SEPARATOR.into()
}

fn default_uid_key() -> String {
	DEFAULT_UID_KEY.into()
}
