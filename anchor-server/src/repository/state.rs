//! State Execution Repository
//!
//! Read access to the executed states of a workflow run.

use anchor_core::domain::state::{StateExecution, StateType};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::error::Result;

/// Repository trait for state executions
#[async_trait]
pub trait StateExecutionRepository: Send + Sync {
    /// Lists the executed states of one workflow execution
    async fn find_by_execution(&self, app_id: Uuid, execution_id: Uuid)
    -> Result<Vec<StateExecution>>;

    /// Records an executed state
    async fn save(&self, state: &StateExecution) -> Result<()>;
}

/// Postgres implementation of StateExecutionRepository
pub struct PgStateExecutionRepository {
    pool: PgPool,
}

impl PgStateExecutionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateExecutionRepository for PgStateExecutionRepository {
    async fn find_by_execution(
        &self,
        app_id: Uuid,
        execution_id: Uuid,
    ) -> Result<Vec<StateExecution>> {
        let rows = sqlx::query_as::<_, StateExecutionRow>(
            r#"
            SELECT id, app_id, execution_id, state_type, service_id
            FROM state_executions
            WHERE app_id = $1 AND execution_id = $2
            "#,
        )
        .bind(app_id)
        .bind(execution_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn save(&self, state: &StateExecution) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO state_executions (id, app_id, execution_id, state_type, service_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET state_type = EXCLUDED.state_type, service_id = EXCLUDED.service_id
            "#,
        )
        .bind(state.id)
        .bind(state.app_id)
        .bind(state.execution_id)
        .bind(state.state_type.as_str())
        .bind(state.service_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct StateExecutionRow {
    id: Uuid,
    app_id: Uuid,
    execution_id: Uuid,
    state_type: String,
    service_id: Option<Uuid>,
}

impl From<StateExecutionRow> for StateExecution {
    fn from(row: StateExecutionRow) -> Self {
        StateExecution {
            id: row.id,
            app_id: row.app_id,
            execution_id: row.execution_id,
            state_type: StateType::parse(&row.state_type),
            service_id: row.service_id,
        }
    }
}
