//! Data-driven [`IdentityProvider`] assembled through a builder.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ProviderId},
	error::ConfigError,
	provider::{IdentityProvider, ProfileRequest, UserProfile},
};

/// Errors raised while constructing a [`GenericProvider`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum GenericProviderError {
	/// Authorization endpoint is required to build redirects.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for every exchange.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Profile field keys cannot be empty.
	#[error("Profile field `{field}` maps to an empty key.")]
	EmptyProfileField {
		/// Which profile field failed validation.
		field: &'static str,
	},
}

/// Profile document keys mapped into [`UserProfile`] fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
	/// Key holding the user identifier (string or number).
	pub id: String,
	/// Key holding the display name.
	pub name: String,
	/// Key holding the email address.
	pub email: String,
	/// Key holding the login or handle.
	pub nickname: String,
	/// Key holding the avatar URL.
	pub picture: String,
}
impl Default for ProfileFields {
	fn default() -> Self {
		Self {
			id: "id".into(),
			name: "name".into(),
			email: "email".into(),
			nickname: "login".into(),
			picture: "picture".into(),
		}
	}
}

/// Provider described entirely by endpoints, static parameters, and profile field keys.
///
/// Deserialization goes through [`GenericProviderBuilder`], so missing endpoints and empty
/// profile keys are rejected for file-loaded providers too.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GenericProviderBuilder")]
pub struct GenericProvider {
	id: ProviderId,
	authorization_endpoint: Url,
	token_endpoint: Url,
	user_info_endpoint: Option<Url>,
	authorize_params: BTreeMap<String, String>,
	profile_fields: ProfileFields,
}
impl GenericProvider {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> GenericProviderBuilder {
		GenericProviderBuilder::new(id)
	}

	/// Optional user-info endpoint.
	pub fn user_info_endpoint(&self) -> Option<&Url> {
		self.user_info_endpoint.as_ref()
	}

	/// Profile key mapping.
	pub fn profile_fields(&self) -> &ProfileFields {
		&self.profile_fields
	}
}
impl IdentityProvider for GenericProvider {
	fn id(&self) -> &ProviderId {
		&self.id
	}

	fn authorization_endpoint(&self) -> &Url {
		&self.authorization_endpoint
	}

	fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	fn augment_authorize_params(&self, params: &mut BTreeMap<String, String>) {
		params.extend(self.authorize_params.iter().map(|(k, v)| (k.clone(), v.clone())));
	}

	fn user_profile_request(&self, token: &AccessToken) -> Result<ProfileRequest> {
		let url = self.user_info_endpoint.clone().ok_or_else(|| {
			ConfigError::MissingUserInfoEndpoint { provider: self.id.to_string() }
		})?;

		Ok(ProfileRequest::bearer(url, token))
	}

	fn parse_user_profile(&self, raw: JsonValue, token: &AccessToken) -> Result<UserProfile> {
		let JsonValue::Object(fields) = &raw else {
			return Err(Error::MalformedUserProfile {
				reason: "profile document is not a JSON object".into(),
			});
		};
		let keys = &self.profile_fields;
		let uid = match fields.get(&keys.id) {
			Some(JsonValue::String(id)) if !id.is_empty() => id.clone(),
			Some(JsonValue::Number(id)) => id.to_string(),
			Some(_) =>
				return Err(Error::MalformedUserProfile {
					reason: format!("field `{}` must be a non-empty string or a number", keys.id),
				}),
			None => token.uid().map(ToOwned::to_owned).ok_or_else(|| {
				Error::MalformedUserProfile { reason: format!("field `{}` is missing", keys.id) }
			})?,
		};
		let text = |key: &str| fields.get(key).and_then(JsonValue::as_str).map(ToOwned::to_owned);

		Ok(UserProfile {
			provider: self.id.clone(),
			uid,
			name: text(&keys.name),
			email: text(&keys.email),
			nickname: text(&keys.nickname),
			image_url: text(&keys.picture),
			raw,
		})
	}
}

/// Builder for [`GenericProvider`] values.
#[derive(Debug, Deserialize)]
pub struct GenericProviderBuilder {
	/// Identifier for the provider being constructed.
	pub id: ProviderId,
	/// Authorization endpoint (required).
	#[serde(default)]
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint (required).
	#[serde(default)]
	pub token_endpoint: Option<Url>,
	/// Optional user-info endpoint used by profile fetches.
	#[serde(default)]
	pub user_info_endpoint: Option<Url>,
	/// Static parameters appended to every authorization redirect.
	#[serde(default)]
	pub authorize_params: BTreeMap<String, String>,
	/// Profile key mapping.
	#[serde(default)]
	pub profile_fields: ProfileFields,
}
impl GenericProviderBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			user_info_endpoint: None,
			authorize_params: BTreeMap::new(),
			profile_fields: ProfileFields::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the optional user-info endpoint.
	pub fn user_info_endpoint(mut self, url: Url) -> Self {
		self.user_info_endpoint = Some(url);

		self
	}

	/// Adds a static authorization redirect parameter.
	pub fn authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.authorize_params.insert(key.into(), value.into());

		self
	}

	/// Overrides the profile key mapping.
	pub fn profile_fields(mut self, fields: ProfileFields) -> Self {
		self.profile_fields = fields;

		self
	}

	/// Consumes the builder and validates the resulting provider.
	pub fn build(self) -> Result<GenericProvider, GenericProviderError> {
		let authorization_endpoint = self
			.authorization_endpoint
			.ok_or(GenericProviderError::MissingAuthorizationEndpoint)?;
		let token_endpoint =
			self.token_endpoint.ok_or(GenericProviderError::MissingTokenEndpoint)?;

		validate_profile_fields(&self.profile_fields)?;

		Ok(GenericProvider {
			id: self.id,
			authorization_endpoint,
			token_endpoint,
			user_info_endpoint: self.user_info_endpoint,
			authorize_params: self.authorize_params,
			profile_fields: self.profile_fields,
		})
	}
}

impl TryFrom<GenericProviderBuilder> for GenericProvider {
	type Error = GenericProviderError;

	fn try_from(value: GenericProviderBuilder) -> Result<Self, Self::Error> {
		value.build()
	}
}

fn validate_profile_fields(fields: &ProfileFields) -> Result<(), GenericProviderError> {
	[
		("id", &fields.id),
		("name", &fields.name),
		("email", &fields.email),
		("nickname", &fields.nickname),
		("picture", &fields.picture),
	]
	.into_iter()
	.find(|(_, key)| key.is_empty())
	.map_or(Ok(()), |(field, _)| Err(GenericProviderError::EmptyProfileField { field }))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	fn id(value: &str) -> ProviderId {
		ProviderId::new(value).expect("Provider id should be valid.")
	}

	fn provider() -> GenericProvider {
		GenericProvider::builder(id("acme"))
			.authorization_endpoint(url("https://idp.example.com/authorize"))
			.token_endpoint(url("https://idp.example.com/token"))
			.user_info_endpoint(url("https://api.example.com/me"))
			.build()
			.expect("Provider should build.")
	}

	fn token(uid: Option<&str>) -> AccessToken {
		let mut payload = JsonMap::new();

		payload.insert("access_token".into(), "abc123".into());

		if let Some(uid) = uid {
			payload.insert("uid".into(), uid.into());
		}

		AccessToken::from_payload(payload, "uid", OffsetDateTime::UNIX_EPOCH)
			.expect("Token fixture should parse.")
	}

	#[test]
	fn builder_requires_both_endpoints() {
		let err = GenericProvider::builder(id("acme"))
			.token_endpoint(url("https://idp.example.com/token"))
			.build()
			.expect_err("Missing authorization endpoint must fail.");

		assert_eq!(err, GenericProviderError::MissingAuthorizationEndpoint);

		let err = GenericProvider::builder(id("acme"))
			.authorization_endpoint(url("https://idp.example.com/authorize"))
			.build()
			.expect_err("Missing token endpoint must fail.");

		assert_eq!(err, GenericProviderError::MissingTokenEndpoint);
	}

	#[test]
	fn plain_http_endpoints_are_accepted() {
		let provider = GenericProvider::builder(id("local"))
			.authorization_endpoint(url("http://127.0.0.1:8080/authorize"))
			.token_endpoint(url("http://127.0.0.1:8080/token"))
			.build()
			.expect("Plain HTTP endpoints should be allowed.");

		assert_eq!(provider.token_endpoint().scheme(), "http");
	}

	#[test]
	fn profile_requests_need_a_user_info_endpoint() {
		let provider = GenericProvider::builder(id("bare"))
			.authorization_endpoint(url("https://idp.example.com/authorize"))
			.token_endpoint(url("https://idp.example.com/token"))
			.build()
			.expect("Provider should build.");
		let err = provider
			.user_profile_request(&token(None))
			.expect_err("Missing user-info endpoint must fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingUserInfoEndpoint { provider }) if provider == "bare"
		));
	}

	#[test]
	fn profiles_map_configured_fields() {
		let raw = serde_json::json!({
			"id": 42,
			"name": "Ada Lovelace",
			"email": "ada@example.com",
			"login": "ada",
			"picture": 7
		});
		let profile =
			provider().parse_user_profile(raw.clone(), &token(None)).expect("Profile should map.");

		assert_eq!(profile.provider.as_ref(), "acme");
		assert_eq!(profile.uid, "42");
		assert_eq!(profile.name.as_deref(), Some("Ada Lovelace"));
		assert_eq!(profile.nickname.as_deref(), Some("ada"));
		assert_eq!(profile.image_url, None);
		assert_eq!(profile.raw, raw);
	}

	#[test]
	fn profiles_fall_back_to_token_uid() {
		let profile = provider()
			.parse_user_profile(serde_json::json!({ "name": "Ada" }), &token(Some("u-1")))
			.expect("Token uid should fill in.");

		assert_eq!(profile.uid, "u-1");

		let err = provider()
			.parse_user_profile(serde_json::json!({ "name": "Ada" }), &token(None))
			.expect_err("Missing ids must fail.");

		assert!(matches!(err, Error::MalformedUserProfile { .. }));
		assert!(matches!(
			provider().parse_user_profile(serde_json::json!([1]), &token(None)),
			Err(Error::MalformedUserProfile { .. })
		));
	}

	#[test]
	fn static_authorize_params_are_applied() {
		let provider = GenericProvider::builder(id("acme"))
			.authorization_endpoint(url("https://idp.example.com/authorize"))
			.token_endpoint(url("https://idp.example.com/token"))
			.authorize_param("approval_prompt", "force")
			.build()
			.expect("Provider should build.");
		let mut params = BTreeMap::from_iter([("client_id".to_owned(), "id".to_owned())]);

		provider.augment_authorize_params(&mut params);

		assert_eq!(params.get("approval_prompt").map(String::as_str), Some("force"));
		assert_eq!(params.len(), 2);
	}

	#[test]
	fn deserialization_runs_builder_validation() {
		let provider: GenericProvider = serde_json::from_str(
			r#"{
				"id": "acme",
				"authorization_endpoint": "https://idp.example.com/authorize",
				"token_endpoint": "https://idp.example.com/token",
				"profile_fields": { "picture": "avatar_url" }
			}"#,
		)
		.expect("Complete providers should deserialize.");

		assert_eq!(provider.profile_fields().picture, "avatar_url");
		assert_eq!(provider.profile_fields().nickname, "login");
		assert!(provider.user_info_endpoint().is_none());

		let round_trip: GenericProvider = serde_json::from_value(
			serde_json::to_value(&provider).expect("Provider should serialize."),
		)
		.expect("Serialized providers should deserialize.");

		assert_eq!(round_trip, provider);
		assert!(
			serde_json::from_str::<GenericProvider>(
				r#"{"id":"acme","authorization_endpoint":"https://idp.example.com/authorize"}"#
			)
			.is_err()
		);
		assert!(
			serde_json::from_str::<GenericProvider>(
				r#"{
					"id": "acme",
					"authorization_endpoint": "https://idp.example.com/authorize",
					"token_endpoint": "https://idp.example.com/token",
					"profile_fields": { "id": "" }
				}"#
			)
			.is_err()
		);
	}
}
