//! Client-level error types shared across grants, providers, and flows.

// self
use crate::{_prelude::*, oauth::TokenPayload};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Caller requested a grant name that is not registered.
	#[error("Unknown grant kind `{name}`.")]
	UnknownGrantKind {
		/// Grant name that failed to resolve.
		name: String,
	},
	/// Token endpoint body could not be decoded with the configured encoding.
	#[error("Token endpoint returned a malformed response: {reason}.")]
	MalformedTokenResponse {
		/// Decoder-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Decoded token response carried a non-empty `error` field.
	#[error("Identity provider rejected the request: {}.", describe_provider_error(payload))]
	ProviderError {
		/// Full decoded response so callers can inspect provider-specific fields.
		payload: TokenPayload,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint answered with a non-success status but no structured `error` field.
	#[error("Token endpoint responded with HTTP {status}.")]
	TokenEndpoint {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Authenticated resource fetch failed in transit or with a non-success status.
	#[error("Resource fetch failed: {message}.")]
	ResourceFetchError {
		/// Final line of the provider's error body, or of the transport failure.
		message: String,
		/// HTTP status code; `None` when no response arrived.
		status: Option<u16>,
	},
	/// Authenticated resource endpoint returned a body that is not valid JSON.
	#[error("Resource endpoint returned malformed JSON.")]
	MalformedResourceResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Resource payload could not be mapped into a user profile.
	#[error("User profile payload is malformed: {reason}.")]
	MalformedUserProfile {
		/// Mapping failure summary.
		reason: String,
	},
	/// State returned by the authorization redirect did not match the issued nonce.
	#[error("Authorization state mismatch.")]
	StateMismatch,
}
impl Error {
	/// Stable snake_case label for the failure category, used by metrics and spans.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::Transport(_) => "transport",
			Self::UnknownGrantKind { .. } => "unknown_grant_kind",
			Self::MalformedTokenResponse { .. } => "malformed_token_response",
			Self::ProviderError { .. } => "provider_error",
			Self::TokenEndpoint { .. } => "token_endpoint",
			Self::ResourceFetchError { .. } => "resource_fetch",
			Self::MalformedResourceResponse { .. } => "malformed_resource_response",
			Self::MalformedUserProfile { .. } => "malformed_user_profile",
			Self::StateMismatch => "state_mismatch",
		}
	}

	/// Returns the provider's `error` code when this is a [`Error::ProviderError`].
	pub fn provider_error_code(&self) -> Option<&str> {
		match self {
			Self::ProviderError { payload, .. } => payload.get("error").and_then(JsonValue::as_str),
			_ => None,
		}
	}

	/// Returns the provider's `error_description` when this is a [`Error::ProviderError`].
	pub fn provider_error_description(&self) -> Option<&str> {
		match self {
			Self::ProviderError { payload, .. } =>
				payload.get("error_description").and_then(JsonValue::as_str),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Resource URL cannot be parsed.
	#[error("Resource URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Header name or value is not valid HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// Provider does not expose a user-info endpoint.
	#[error("Provider `{provider}` does not define a user-info endpoint.")]
	MissingUserInfoEndpoint {
		/// Provider identifier string.
		provider: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the identity provider.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the identity provider: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn describe_provider_error(payload: &TokenPayload) -> String {
	let code = match payload.get("error") {
		Some(JsonValue::String(code)) => code.clone(),
		Some(other) => other.to_string(),
		None => "unknown error".into(),
	};

	match payload.get("error_description").and_then(JsonValue::as_str) {
		Some(description) => format!("{code} ({description})"),
		None => code,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_error_display_includes_description() {
		let mut payload = TokenPayload::new();

		payload.insert("error".into(), "invalid_grant".into());
		payload.insert("error_description".into(), "code already used".into());

		let err = Error::ProviderError { payload, status: Some(400) };

		assert_eq!(
			err.to_string(),
			"Identity provider rejected the request: invalid_grant (code already used)."
		);
		assert_eq!(err.provider_error_code(), Some("invalid_grant"));
		assert_eq!(err.provider_error_description(), Some("code already used"));
		assert_eq!(err.kind(), "provider_error");
	}

	#[test]
	fn provider_error_display_handles_structured_error_objects() {
		let mut payload = TokenPayload::new();

		payload.insert("error".into(), serde_json::json!({ "message": "bad token" }));

		let err = Error::ProviderError { payload, status: None };

		assert!(err.to_string().contains("bad token"));
		assert_eq!(err.provider_error_code(), None);
	}
}
