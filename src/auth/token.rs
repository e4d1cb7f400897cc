//! Access token value objects and the redacted secret wrapper they store.

pub mod access;
pub mod secret;
