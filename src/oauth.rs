//! Token endpoint wire codec.
//!
//! Requests are encoded as a query string (`GET`) or an `application/x-www-form-urlencoded`
//! body (`POST`). Responses are decoded as a JSON object or as a URL-encoded query string,
//! depending on what the provider emits. The helpers here never look at HTTP status codes;
//! classification happens in the flows so error bodies travel through the same decoder as
//! success bodies.

pub use oauth2;

// crates.io
use oauth2::{
	HttpClientError, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue},
	},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	grant::TokenParams,
	provider::{ResponseEncoding, TokenMethod},
};

/// Decoded token endpoint response.
pub type TokenPayload = JsonMap<String, JsonValue>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Encodes the final token request parameters for the configured method.
pub fn encode_token_request(
	endpoint: &Url,
	method: TokenMethod,
	encoding: ResponseEncoding,
	params: &TokenParams,
) -> Result<HttpRequest> {
	let accept = match encoding {
		ResponseEncoding::Json => JSON_CONTENT_TYPE,
		ResponseEncoding::UrlEncoded => FORM_CONTENT_TYPE,
	};
	let request = match method {
		TokenMethod::Get => {
			let mut url = endpoint.clone();

			url.query_pairs_mut().extend_pairs(params.iter());

			Request::builder()
				.method(Method::GET)
				.uri(url.as_str())
				.header(ACCEPT, accept)
				.body(Vec::new())
		},
		TokenMethod::Post => {
			let body = url::form_urlencoded::Serializer::new(String::new())
				.extend_pairs(params.iter())
				.finish();

			Request::builder()
				.method(Method::POST)
				.uri(endpoint.as_str())
				.header(ACCEPT, accept)
				.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
				.body(body.into_bytes())
		},
	};

	request.map_err(|e| ConfigError::from(e).into())
}

/// Encodes an authenticated `GET` for a protected resource.
///
/// Headers with empty values are skipped so callers can pass optional entries unconditionally.
pub fn encode_resource_request(
	url: &Url,
	headers: &BTreeMap<String, String>,
) -> Result<HttpRequest> {
	let mut builder =
		Request::builder().method(Method::GET).uri(url.as_str()).header(ACCEPT, JSON_CONTENT_TYPE);

	for (name, value) in headers.iter().filter(|(_, value)| !value.is_empty()) {
		let header_name = HeaderName::from_bytes(name.as_bytes())
			.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;
		let header_value = HeaderValue::from_str(value)
			.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;

		builder = builder.header(header_name, header_value);
	}

	builder.body(Vec::new()).map_err(|e| ConfigError::from(e).into())
}

/// Decodes a token endpoint body with the provider's response encoding.
///
/// JSON bodies must be objects. URL-encoded bodies always decode; every value becomes a JSON
/// string.
pub fn decode_token_response(
	body: &[u8],
	encoding: ResponseEncoding,
	status: Option<u16>,
) -> Result<TokenPayload> {
	match encoding {
		ResponseEncoding::Json => match serde_json::from_slice::<JsonValue>(body) {
			Ok(JsonValue::Object(payload)) => Ok(payload),
			Ok(other) => Err(Error::MalformedTokenResponse {
				reason: format!("expected a JSON object, found {}", json_kind(&other)),
				status,
			}),
			Err(e) => Err(Error::MalformedTokenResponse { reason: e.to_string(), status }),
		},
		ResponseEncoding::UrlEncoded => Ok(url::form_urlencoded::parse(trim_ascii(body))
			.map(|(key, value)| (key.into_owned(), JsonValue::String(value.into_owned())))
			.collect()),
	}
}

/// Returns true when the payload carries a non-empty `error` field.
pub fn has_provider_error(payload: &TokenPayload) -> bool {
	match payload.get("error") {
		None | Some(JsonValue::Null) => false,
		Some(JsonValue::Bool(flag)) => *flag,
		Some(JsonValue::Number(code)) => code.as_f64() != Some(0.0),
		Some(JsonValue::String(code)) => !code.is_empty() && code != "0",
		Some(JsonValue::Array(items)) => !items.is_empty(),
		Some(JsonValue::Object(fields)) => !fields.is_empty(),
	}
}

/// Extracts the final non-blank line of an error body.
///
/// Several providers answer failed resource calls with a multi-line body whose last line
/// summarizes the failure.
pub fn last_line(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	text.trim_end().rsplit('\n').next().map(str::trim).unwrap_or_default().to_owned()
}

/// Summarizes a failure as the last line of its innermost cause.
pub(crate) fn error_summary(err: &(dyn StdError + 'static)) -> String {
	let mut cause = err;

	while let Some(source) = cause.source() {
		cause = source;
	}

	last_line(cause.to_string().as_bytes())
}

/// Renders a body for error reporting.
pub(crate) fn body_text(body: &[u8]) -> String {
	String::from_utf8_lossy(body).into_owned()
}

/// Converts an [`HttpClientError`] emitted by any transport into a client error.
pub(crate) fn map_http_client_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		_ => TransportError::Other { message: "unrecognized transport failure".into() }.into(),
	}
}

fn json_kind(value: &JsonValue) -> &'static str {
	match value {
		JsonValue::Null => "null",
		JsonValue::Bool(_) => "a boolean",
		JsonValue::Number(_) => "a number",
		JsonValue::String(_) => "a string",
		JsonValue::Array(_) => "an array",
		JsonValue::Object(_) => "an object",
	}
}

fn trim_ascii(body: &[u8]) -> &[u8] {
	let start = body.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(body.len());
	let end = body.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |idx| idx + 1);

	&body[start..end]
}
