//! Identity-provider configuration (data) and provider hooks (behavior).
//!
//! `config` exposes the immutable [`ProviderConfig`] holding client credentials, scopes, and
//! token-exchange wire options. `identity` defines [`IdentityProvider`], the HTTP-client-agnostic
//! hook every provider implements (endpoints, authorize-parameter tweaks, profile mapping).
//! `generic` ships [`GenericProvider`], a data-driven implementation assembled with a builder.

pub mod config;
pub mod generic;
pub mod identity;

pub use config::*;
pub use generic::*;
pub use identity::*;
