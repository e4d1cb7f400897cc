//! Name-to-strategy lookup table for grants.

// self
use crate::{
	_prelude::*,
	grant::{Grant, GrantKind, StandardGrant},
};

/// Explicit registry mapping grant names to strategies.
///
/// [`GrantRegistry::standard`] registers the four RFC 6749 grants. Lookups of unregistered
/// names fail closed with [`Error::UnknownGrantKind`].
#[derive(Clone)]
pub struct GrantRegistry {
	grants: HashMap<String, Arc<dyn Grant>>,
}
impl GrantRegistry {
	/// Creates an empty registry.
	pub fn empty() -> Self {
		Self { grants: HashMap::new() }
	}

	/// Creates a registry populated with every [`GrantKind`].
	pub fn standard() -> Self {
		GrantKind::ALL.into_iter().fold(Self::empty(), |registry, kind| {
			registry.with_grant(Arc::new(StandardGrant(kind)))
		})
	}

	/// Registers a grant under its own name, replacing any previous entry.
	pub fn register(&mut self, grant: Arc<dyn Grant>) -> Option<Arc<dyn Grant>> {
		self.grants.insert(grant.name().to_owned(), grant)
	}

	/// Builder-style variant of [`register`](Self::register).
	pub fn with_grant(mut self, grant: Arc<dyn Grant>) -> Self {
		self.register(grant);

		self
	}

	/// Resolves a grant by name.
	pub fn resolve(&self, name: &str) -> Result<Arc<dyn Grant>> {
		self.grants
			.get(name)
			.cloned()
			.ok_or_else(|| Error::UnknownGrantKind { name: name.to_owned() })
	}

	/// Returns true if a grant is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.grants.contains_key(name)
	}

	/// Iterator over registered grant names.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.grants.keys().map(String::as_str)
	}
}
impl Default for GrantRegistry {
	fn default() -> Self {
		Self::standard()
	}
}
impl Debug for GrantRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut names = self.names().collect::<Vec<_>>();

		names.sort_unstable();

		f.debug_tuple("GrantRegistry").field(&names).finish()
	}
}
