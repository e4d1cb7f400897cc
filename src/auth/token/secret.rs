//! Credential string that never prints its contents.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Access or refresh token value.
///
/// `Debug` and `Display` print a placeholder; only [`expose`](Self::expose) and
/// serialization reveal the value, so hosts that persist tokens keep working.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw credential. Callers must avoid logging it.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Consumes the wrapper and returns the raw credential.
	pub fn into_exposed(self) -> String {
		self.0
	}

	/// Returns true for empty credentials, which some providers emit on revoked grants.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret({REDACTED})")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatting_never_reveals_the_credential() {
		let secret = TokenSecret::from("gho_live".to_owned());

		assert_eq!(format!("{secret:?}"), "TokenSecret(<redacted>)");
		assert_eq!(secret.to_string(), "<redacted>");
		assert_eq!(secret.expose(), "gho_live");
	}

	#[test]
	fn serialization_is_transparent() {
		let secret: TokenSecret =
			serde_json::from_str("\"r-1\"").expect("Plain strings should deserialize.");

		assert_eq!(serde_json::to_string(&secret).expect("Secret should serialize."), "\"r-1\"");
		assert!(!secret.is_empty());
		assert_eq!(secret.into_exposed(), "r-1");
	}
}
