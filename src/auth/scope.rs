//! Scope modeling used when composing authorization redirects.

// self
use crate::_prelude::*;

/// Requested scopes, either as a pre-joined string or an ordered list.
///
/// Identity providers disagree on the scope delimiter (`,` for some, a space for others), so
/// the list form is kept in caller order and only joined once the provider's separator is
/// known. A pre-joined string is passed through verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scopes {
	/// Scope string sent as-is.
	Joined(String),
	/// Ordered scope list joined with the configured separator.
	List(Vec<String>),
}
impl Scopes {
	/// Creates an ordered scope list from any iterator.
	pub fn list<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::List(scopes.into_iter().map(Into::into).collect())
	}

	/// Returns true if no scope would be sent.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Joined(value) => value.is_empty(),
			Self::List(values) => values.is_empty(),
		}
	}

	/// Renders the `scope` parameter value using `separator` for list scopes.
	pub fn join(&self, separator: &str) -> String {
		match self {
			Self::Joined(value) => value.clone(),
			Self::List(values) => values.join(separator),
		}
	}
}
impl Default for Scopes {
	fn default() -> Self {
		Self::List(Vec::new())
	}
}
impl From<&str> for Scopes {
	fn from(value: &str) -> Self {
		Self::Joined(value.to_owned())
	}
}
impl From<String> for Scopes {
	fn from(value: String) -> Self {
		Self::Joined(value)
	}
}
impl From<Vec<String>> for Scopes {
	fn from(value: Vec<String>) -> Self {
		Self::List(value)
	}
}
impl From<&[&str]> for Scopes {
	fn from(value: &[&str]) -> Self {
		Self::list(value.iter().copied())
	}
}
impl<const N: usize> From<[&str; N]> for Scopes {
	fn from(value: [&str; N]) -> Self {
		Self::list(value)
	}
}
