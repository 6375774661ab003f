//! Domain Services
//!
//! Stateless logic that operates on domain entities.

pub mod manifest_resolver;
pub mod shell;

pub use manifest_resolver::ManifestResolver;
