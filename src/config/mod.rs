//! Configuration for extraction runs
//!
//! Browser session options, environment-derived settings, and the
//! type-safe `ExtractRequest` builder.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{Complete, ExtractRequestBuilder, WithTarget};
pub use types::{ExtractRequest, ExtractSettings, SessionConfig};
