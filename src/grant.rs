//! Pluggable grant strategies.
//!
//! A [`Grant`] turns default token-request parameters plus caller overrides into the final
//! request, then converts the decoded response into an [`AccessToken`]. The built-in
//! [`StandardGrant`]s cover the RFC 6749 grant types; [`PassthroughGrant`] is a pure merge
//! used for custom grant URNs and in tests. Grants are looked up by name through a
//! [`GrantRegistry`].

pub mod registry;
pub mod standard;

pub use registry::*;
pub use standard::*;

// self
use crate::{_prelude::*, auth::AccessToken, oauth::TokenPayload};

/// Ordered token request parameters.
pub type TokenParams = BTreeMap<String, String>;

/// Grant strategy hook shared by every token exchange.
///
/// Implementors must be `Send + Sync` so one registry can serve concurrent exchanges.
/// Override only what you need: `parse_response` defaults to [`AccessToken::from_payload`].
pub trait Grant
where
	Self: Send + Sync,
{
	/// Grant identifier sent as `grant_type`.
	fn name(&self) -> &str;

	/// Merges default parameters with caller overrides; overrides win on key collision.
	///
	/// Required keys are not validated here; the identity provider rejects malformed
	/// requests.
	fn prepare_params(&self, defaults: TokenParams, overrides: TokenParams) -> TokenParams;

	/// Converts a decoded token response into an [`AccessToken`].
	fn parse_response(&self, raw: TokenPayload, uid_key: &str) -> Result<AccessToken> {
		AccessToken::from_payload(raw, uid_key, OffsetDateTime::now_utc())
	}
}
impl Debug for dyn Grant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Grant({})", self.name())
	}
}

/// OAuth 2.0 grant types with built-in strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant for long-lived sessions.
	RefreshToken,
	/// Client Credentials grant for app-only tokens.
	ClientCredentials,
	/// Resource Owner Password Credentials grant.
	Password,
}
impl GrantKind {
	/// Every built-in grant kind, in registration order.
	pub const ALL: [GrantKind; 4] = [
		GrantKind::AuthorizationCode,
		GrantKind::RefreshToken,
		GrantKind::ClientCredentials,
		GrantKind::Password,
	];

	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantKind::AuthorizationCode => "authorization_code",
			GrantKind::RefreshToken => "refresh_token",
			GrantKind::ClientCredentials => "client_credentials",
			GrantKind::Password => "password",
		}
	}
}
impl Display for GrantKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for GrantKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| Error::UnknownGrantKind { name: s.to_owned() })
	}
}

/// Grant invocation with its grant-specific data.
///
/// Descriptors are stateless and built per call; [`params`](Self::params) yields the
/// grant-specific request keys (`code`, `refresh_token`, ...).
#[derive(Clone, PartialEq, Eq)]
pub enum GrantDescriptor {
	/// Exchange an authorization code, optionally proving PKCE possession.
	AuthorizationCode {
		/// Code returned to the redirect URI.
		code: String,
		/// PKCE verifier matching the challenge sent during authorization.
		code_verifier: Option<String>,
	},
	/// Rotate a refresh token.
	RefreshToken {
		/// Refresh token previously issued by the provider.
		refresh_token: String,
	},
	/// Request an app-only token.
	ClientCredentials,
	/// Exchange resource-owner credentials.
	Password {
		/// Resource owner username.
		username: String,
		/// Resource owner password.
		password: String,
	},
	/// Any registered grant addressed by name.
	Custom {
		/// Registered grant name.
		name: String,
		/// Grant-specific parameters.
		params: TokenParams,
	},
}
impl GrantDescriptor {
	/// Registered grant name this descriptor resolves to.
	pub fn name(&self) -> &str {
		match self {
			Self::AuthorizationCode { .. } => GrantKind::AuthorizationCode.as_str(),
			Self::RefreshToken { .. } => GrantKind::RefreshToken.as_str(),
			Self::ClientCredentials => GrantKind::ClientCredentials.as_str(),
			Self::Password { .. } => GrantKind::Password.as_str(),
			Self::Custom { name, .. } => name,
		}
	}

	/// Grant-specific request parameters.
	pub fn params(&self) -> TokenParams {
		let mut params = TokenParams::new();

		match self {
			Self::AuthorizationCode { code, code_verifier } => {
				params.insert("code".into(), code.clone());

				if let Some(verifier) = code_verifier {
					params.insert("code_verifier".into(), verifier.clone());
				}
			},
			Self::RefreshToken { refresh_token } => {
				params.insert("refresh_token".into(), refresh_token.clone());
			},
			Self::ClientCredentials => {},
			Self::Password { username, password } => {
				params.insert("username".into(), username.clone());
				params.insert("password".into(), password.clone());
			},
			Self::Custom { params: custom, .. } => params.extend(custom.clone()),
		}

		params
	}
}
impl Debug for GrantDescriptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::AuthorizationCode { code_verifier, .. } => f
				.debug_struct("AuthorizationCode")
				.field("code", &"<redacted>")
				.field("code_verifier", &code_verifier.as_ref().map(|_| "<redacted>"))
				.finish(),
			Self::RefreshToken { .. } =>
				f.debug_struct("RefreshToken").field("refresh_token", &"<redacted>").finish(),
			Self::ClientCredentials => f.write_str("ClientCredentials"),
			Self::Password { username, .. } => f
				.debug_struct("Password")
				.field("username", username)
				.field("password", &"<redacted>")
				.finish(),
			Self::Custom { name, params } => f
				.debug_struct("Custom")
				.field("name", name)
				.field("params", &params.keys().collect::<Vec<_>>())
				.finish(),
		}
	}
}

/// Selects the grant used by an exchange: a registered name, a descriptor, or an instance.
#[derive(Clone, Debug)]
pub enum GrantSelector {
	/// Grant name resolved through the registry.
	Name(String),
	/// Descriptor resolved through the registry; its params seed the overrides.
	Descriptor(GrantDescriptor),
	/// Grant instance used directly, bypassing the registry.
	Instance(Arc<dyn Grant>),
}
impl From<&str> for GrantSelector {
	fn from(value: &str) -> Self {
		Self::Name(value.to_owned())
	}
}
impl From<String> for GrantSelector {
	fn from(value: String) -> Self {
		Self::Name(value)
	}
}
impl From<GrantKind> for GrantSelector {
	fn from(value: GrantKind) -> Self {
		Self::Name(value.as_str().to_owned())
	}
}
impl From<GrantDescriptor> for GrantSelector {
	fn from(value: GrantDescriptor) -> Self {
		Self::Descriptor(value)
	}
}
impl From<Arc<dyn Grant>> for GrantSelector {
	fn from(value: Arc<dyn Grant>) -> Self {
		Self::Instance(value)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grant_kind_round_trips_names() {
		for kind in GrantKind::ALL {
			assert_eq!(kind.as_str().parse::<GrantKind>().expect("Known name should parse."), kind);
		}

		let err = "nonexistent".parse::<GrantKind>().expect_err("Unknown name must fail.");

		assert!(matches!(err, Error::UnknownGrantKind { name } if name == "nonexistent"));
	}

	#[test]
	fn descriptors_expose_grant_specific_params() {
		let code = GrantDescriptor::AuthorizationCode {
			code: "abc".into(),
			code_verifier: Some("verifier".into()),
		};

		assert_eq!(code.name(), "authorization_code");
		assert_eq!(code.params().get("code").map(String::as_str), Some("abc"));
		assert_eq!(code.params().get("code_verifier").map(String::as_str), Some("verifier"));

		let password =
			GrantDescriptor::Password { username: "ada".into(), password: "hunter2".into() };

		assert_eq!(password.params().len(), 2);
		assert!(!format!("{password:?}").contains("hunter2"));
		assert!(GrantDescriptor::ClientCredentials.params().is_empty());

		let custom = GrantDescriptor::Custom {
			name: "urn:ietf:params:oauth:grant-type:jwt-bearer".into(),
			params: TokenParams::from_iter([("assertion".into(), "jwt".into())]),
		};

		assert_eq!(custom.name(), "urn:ietf:params:oauth:grant-type:jwt-bearer");
		assert_eq!(custom.params().get("assertion").map(String::as_str), Some("jwt"));
	}
}
