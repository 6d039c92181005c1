//! Execution Context Provider
//!
//! Resolves the environment and service a running state belongs to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::error::Result;

/// Environment and service of an executing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub env_id: Uuid,
    pub service_id: Uuid,
}

/// Resolves execution contexts for (app, execution, state execution) triples
#[async_trait]
pub trait ExecutionContextProvider: Send + Sync {
    /// Returns `None` when the state execution is unknown or its environment
    /// or service cannot be determined
    async fn resolve(
        &self,
        app_id: Uuid,
        execution_id: Uuid,
        state_execution_id: Uuid,
    ) -> Result<Option<ExecutionContext>>;
}

/// Postgres implementation of ExecutionContextProvider
///
/// The service comes from the state's phase, falling back to the first
/// service of the execution.
pub struct PgExecutionContextProvider {
    pool: PgPool,
}

impl PgExecutionContextProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionContextProvider for PgExecutionContextProvider {
    async fn resolve(
        &self,
        app_id: Uuid,
        execution_id: Uuid,
        state_execution_id: Uuid,
    ) -> Result<Option<ExecutionContext>> {
        let row: Option<(Option<Uuid>, Option<Uuid>)> = sqlx::query_as(
            r#"
            SELECT e.env_id, COALESCE(s.service_id, e.service_ids[1])
            FROM state_executions s
            JOIN executions e ON e.id = s.execution_id
            WHERE s.id = $1 AND s.execution_id = $2 AND s.app_id = $3
            "#,
        )
        .bind(state_execution_id)
        .bind(execution_id)
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((Some(env_id), Some(service_id))) => Some(ExecutionContext { env_id, service_id }),
            _ => None,
        })
    }
}
