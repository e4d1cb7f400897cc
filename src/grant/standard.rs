//! Built-in grant strategies.

// self
use crate::{
	_prelude::*,
	grant::{Grant, GrantKind, TokenParams},
};

/// RFC 6749 grant whose `grant_type` is pinned to its own kind.
///
/// Overrides win for every key except `grant_type`, so a stray override cannot send an
/// authorization-code request under another grant name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandardGrant(pub GrantKind);
impl Grant for StandardGrant {
	fn name(&self) -> &str {
		self.0.as_str()
	}

	fn prepare_params(&self, defaults: TokenParams, overrides: TokenParams) -> TokenParams {
		let mut params = merge(defaults, overrides);

		params.insert("grant_type".into(), self.0.as_str().into());

		params
	}
}

/// Grant that merges defaults and overrides without touching either.
///
/// Useful for provider-specific grant URNs and as a fake grant in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassthroughGrant {
	name: String,
}
impl PassthroughGrant {
	/// Creates a passthrough grant registered under `name`.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}
impl Grant for PassthroughGrant {
	fn name(&self) -> &str {
		&self.name
	}

	fn prepare_params(&self, defaults: TokenParams, overrides: TokenParams) -> TokenParams {
		merge(defaults, overrides)
	}
}

fn merge(mut defaults: TokenParams, overrides: TokenParams) -> TokenParams {
	defaults.extend(overrides);

	defaults
}
