//! Repository Module
//!
//! Data access layer for the baseline service.
//! Each repository is a trait over one collection so services can run
//! against Postgres in production and the in-memory store in tests.

mod baseline;
mod context;
mod error;
mod execution;
mod memory;
mod state;
mod verification;

use std::sync::Arc;

use sqlx::PgPool;

// Re-export traits
pub use baseline::BaselineRepository;
pub use context::{ExecutionContext, ExecutionContextProvider};
pub use execution::ExecutionRepository;
pub use state::StateExecutionRepository;
pub use verification::VerificationDataRepository;

// Re-export implementations
pub use baseline::PgBaselineRepository;
pub use context::PgExecutionContextProvider;
pub use execution::PgExecutionRepository;
pub use memory::InMemoryStore;
pub use state::PgStateExecutionRepository;
pub use verification::PgVerificationDataRepository;

pub use error::{RepositoryError, Result};

/// The full set of collaborators the baseline service needs
#[derive(Clone)]
pub struct Repositories {
    pub executions: Arc<dyn ExecutionRepository>,
    pub states: Arc<dyn StateExecutionRepository>,
    pub baselines: Arc<dyn BaselineRepository>,
    pub verification: Arc<dyn VerificationDataRepository>,
    pub contexts: Arc<dyn ExecutionContextProvider>,
}

impl Repositories {
    /// Postgres-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            executions: Arc::new(PgExecutionRepository::new(pool.clone())),
            states: Arc::new(PgStateExecutionRepository::new(pool.clone())),
            baselines: Arc::new(PgBaselineRepository::new(pool.clone())),
            verification: Arc::new(PgVerificationDataRepository::new(pool.clone())),
            contexts: Arc::new(PgExecutionContextProvider::new(pool)),
        }
    }

    /// Every repository served by the same in-memory store
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            executions: store.clone(),
            states: store.clone(),
            baselines: store.clone(),
            verification: store.clone(),
            contexts: store,
        }
    }
}
