//! Immutable access token parsed from a token endpoint response.

// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, oauth::TokenPayload};

const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";
const EXPIRES_IN_KEY: &str = "expires_in";
const EXPIRES_KEY: &str = "expires";

/// Bearer credential issued by an identity provider.
///
/// Values are only produced by [`Grant::parse_response`](crate::grant::Grant::parse_response)
/// through [`AccessToken::from_payload`] and never change afterwards. Provider fields the
/// client does not model (`token_type`, `scope`, `id_token`, ...) are kept verbatim in
/// [`extra`](Self::extra).
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
	access_token: TokenSecret,
	refresh_token: Option<TokenSecret>,
	expires: Option<OffsetDateTime>,
	uid: Option<String>,
	issued_at: OffsetDateTime,
	extra: JsonMap<String, JsonValue>,
}
impl AccessToken {
	/// Builds a token from a decoded response payload.
	///
	/// `expires_in` is read as seconds from `issued_at`. Providers that send `expires`
	/// instead are handled too: values past `issued_at` as a unix timestamp are treated as an
	/// absolute instant, smaller values as a relative lifetime. Numeric fields may be JSON
	/// numbers or numeric strings, since URL-encoded responses carry only strings.
	pub fn from_payload(
		payload: TokenPayload,
		uid_key: &str,
		issued_at: OffsetDateTime,
	) -> Result<Self> {
		let fields: StandardFields =
			serde_path_to_error::deserialize(JsonValue::Object(payload.clone())).map_err(|e| {
				Error::MalformedTokenResponse { reason: e.to_string(), status: None }
			})?;
		let expires = match (fields.expires_in, fields.expires) {
			(Some(secs), _) => Some(offset(issued_at, secs, EXPIRES_IN_KEY)?),
			(None, Some(value)) if value > issued_at.unix_timestamp() => Some(
				OffsetDateTime::from_unix_timestamp(value)
					.map_err(|_| out_of_range(EXPIRES_KEY))?,
			),
			(None, Some(secs)) => Some(offset(issued_at, secs, EXPIRES_KEY)?),
			(None, None) => None,
		};
		let uid = match payload.get(uid_key) {
			Some(JsonValue::String(value)) => Some(value.clone()),
			Some(JsonValue::Number(value)) => Some(value.to_string()),
			_ => None,
		};
		let mut extra = payload;

		for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_IN_KEY, EXPIRES_KEY, uid_key] {
			extra.remove(key);
		}

		Ok(Self {
			access_token: TokenSecret::new(fields.access_token),
			refresh_token: fields.refresh_token.map(TokenSecret::new),
			expires,
			uid,
			issued_at,
			extra,
		})
	}

	/// Access token secret; callers must avoid logging it.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Refresh token secret, if the provider issued one.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref()
	}

	/// Absolute expiry instant, if the provider declared a lifetime.
	pub fn expires(&self) -> Option<OffsetDateTime> {
		self.expires
	}

	/// Provider user identifier read from the configured uid key.
	pub fn uid(&self) -> Option<&str> {
		self.uid.as_deref()
	}

	/// Instant the token response was received.
	pub fn issued_at(&self) -> OffsetDateTime {
		self.issued_at
	}

	/// Provider fields not modeled explicitly.
	pub fn extra(&self) -> &JsonMap<String, JsonValue> {
		&self.extra
	}

	/// Looks up a passthrough field by name.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.extra.get(key)
	}

	/// Returns the `token_type` field when present.
	pub fn token_type(&self) -> Option<&str> {
		self.extra.get("token_type").and_then(JsonValue::as_str)
	}

	/// Returns `true` if the token has expired at the provided instant.
	///
	/// Tokens without a declared lifetime never expire locally.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires.is_some_and(|expires| instant >= expires)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime at `instant`, clamped at zero.
	pub fn expires_in_at(&self, instant: OffsetDateTime) -> Option<Duration> {
		self.expires.map(|expires| (expires - instant).max(Duration::ZERO))
	}

	/// Formats the `Authorization` header value for resource requests.
	pub fn authorization_header(&self) -> String {
		format!("Bearer {}", self.access_token.expose())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires", &self.expires)
			.field("uid", &self.uid)
			.field("issued_at", &self.issued_at)
			.field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[derive(Deserialize)]
struct StandardFields {
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default, deserialize_with = "lenient_seconds")]
	expires_in: Option<i64>,
	#[serde(default, deserialize_with = "lenient_seconds")]
	expires: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeconds {
	Int(i64),
	Float(f64),
	Text(String),
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	match <Option<RawSeconds>>::deserialize(deserializer)? {
		None => Ok(None),
		Some(RawSeconds::Int(value)) => Ok(Some(value)),
		Some(RawSeconds::Float(value)) => Ok(Some(value.trunc() as i64)),
		Some(RawSeconds::Text(text)) if text.trim().is_empty() => Ok(None),
		Some(RawSeconds::Text(text)) => text
			.trim()
			.parse::<i64>()
			.map(Some)
			.map_err(|_| DeError::custom(format!("`{text}` is not a number of seconds"))),
	}
}

fn offset(issued_at: OffsetDateTime, secs: i64, key: &str) -> Result<OffsetDateTime> {
	issued_at.checked_add(Duration::seconds(secs)).ok_or_else(|| out_of_range(key))
}

fn out_of_range(key: &str) -> Error {
	Error::MalformedTokenResponse {
		reason: format!("the {key} value exceeds the supported range"),
		status: None,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;

	fn payload(value: JsonValue) -> TokenPayload {
		match value {
			JsonValue::Object(map) => map,
			other => panic!("Fixture must be a JSON object, got {other}."),
		}
	}

	#[test]
	fn parses_minimal_json_response() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = AccessToken::from_payload(
			payload(json!({ "access_token": "abc123", "expires_in": 3600 })),
			"uid",
			issued,
		)
		.expect("Minimal token response should parse.");

		assert_eq!(token.access_token().expose(), "abc123");
		assert_eq!(token.expires(), Some(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(token.refresh_token().is_none());
		assert!(token.extra().is_empty());
	}

	#[test]
	fn keeps_passthrough_fields_and_uid() {
		let token = AccessToken::from_payload(
			payload(json!({
				"access_token": "abc",
				"refresh_token": "def",
				"token_type": "bearer",
				"user_id": 42,
				"id_token": "jwt"
			})),
			"user_id",
			OffsetDateTime::now_utc(),
		)
		.expect("Token response with extras should parse.");

		assert_eq!(token.refresh_token().map(TokenSecret::expose), Some("def"));
		assert_eq!(token.uid(), Some("42"));
		assert_eq!(token.token_type(), Some("bearer"));
		assert_eq!(token.get("id_token"), Some(&json!("jwt")));
		assert!(token.get("user_id").is_none());
		assert!(token.expires().is_none());
		assert!(!token.is_expired());
	}

	#[test]
	fn accepts_string_encoded_lifetimes() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = AccessToken::from_payload(
			payload(json!({ "access_token": "abc", "expires_in": "120" })),
			"uid",
			issued,
		)
		.expect("String lifetimes should parse.");

		assert_eq!(token.expires(), Some(macros::datetime!(2025-01-01 00:02 UTC)));
		assert_eq!(
			token.expires_in_at(macros::datetime!(2025-01-01 00:01 UTC)),
			Some(Duration::minutes(1))
		);
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 00:02 UTC)));
	}

	#[test]
	fn expires_field_supports_relative_and_absolute_values() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let relative = AccessToken::from_payload(
			payload(json!({ "access_token": "abc", "expires": "5183999" })),
			"uid",
			issued,
		)
		.expect("Relative expires should parse.");

		assert_eq!(relative.expires(), Some(issued + Duration::seconds(5_183_999)));

		let absolute_at = macros::datetime!(2025-06-01 00:00 UTC);
		let absolute = AccessToken::from_payload(
			payload(json!({ "access_token": "abc", "expires": absolute_at.unix_timestamp() })),
			"uid",
			issued,
		)
		.expect("Absolute expires should parse.");

		assert_eq!(absolute.expires(), Some(absolute_at));
	}

	#[test]
	fn missing_or_invalid_fields_are_malformed() {
		let now = OffsetDateTime::now_utc();
		let err = AccessToken::from_payload(payload(json!({ "token_type": "bearer" })), "uid", now)
			.expect_err("Missing access_token must be rejected.");

		assert!(matches!(err, Error::MalformedTokenResponse { .. }));

		let err = AccessToken::from_payload(
			payload(json!({ "access_token": "abc", "expires_in": "soon" })),
			"uid",
			now,
		)
		.expect_err("Non-numeric expires_in must be rejected.");

		match err {
			Error::MalformedTokenResponse { reason, .. } => assert!(reason.contains("soon")),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn debug_and_header_helpers() {
		let token = AccessToken::from_payload(
			payload(json!({ "access_token": "secret-value", "refresh_token": "also-secret" })),
			"uid",
			OffsetDateTime::now_utc(),
		)
		.expect("Token response should parse.");
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("secret-value"));
		assert!(!rendered.contains("also-secret"));
		assert_eq!(token.authorization_header(), "Bearer secret-value");
	}
}
