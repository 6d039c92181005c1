//! Service Module
//!
//! Business logic for baseline management.
//! Each component wraps the repositories it needs; [`baseline::BaselineService`]
//! chains them into the public operations.

pub mod baseline;
pub mod error;
pub mod flags;
pub mod lookup;
pub mod registry;
pub mod resolver;
pub mod retention;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export for convenience
pub use baseline::BaselineService;
pub use error::{BaselineError, Result};
pub use flags::FlagPropagator;
pub use lookup::ExecutionLookup;
pub use registry::{BaselineRegistry, RegistryOutcome};
pub use retention::{RetentionExtender, RetentionPolicy};
