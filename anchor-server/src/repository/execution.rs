//! Execution Repository
//!
//! Reads workflow and pipeline executions and writes their baseline flags.

use anchor_core::domain::execution::{Execution, PipelineExecution, WorkflowType};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::error::Result;

/// Repository trait for execution records
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Finds an execution by id within an application
    async fn find_by_id(&self, app_id: Uuid, id: Uuid) -> Result<Option<Execution>>;

    /// Inserts or replaces an execution
    async fn save(&self, execution: &Execution) -> Result<()>;

    /// Sets `is_baseline` on the execution record
    ///
    /// Returns `false` when no execution with that id exists.
    async fn set_baseline_flag(&self, execution_id: Uuid, is_baseline: bool) -> Result<bool>;

    /// Sets `is_baseline` on the snapshot of `execution_id` embedded in the
    /// pipeline document of `pipeline_execution_id`
    ///
    /// Returns `false` when the pipeline or the snapshot does not exist.
    async fn set_snapshot_baseline_flag(
        &self,
        pipeline_execution_id: Uuid,
        execution_id: Uuid,
        is_baseline: bool,
    ) -> Result<bool>;
}

/// Postgres implementation of ExecutionRepository
pub struct PgExecutionRepository {
    pool: PgPool,
}

impl PgExecutionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionRepository for PgExecutionRepository {
    async fn find_by_id(&self, app_id: Uuid, id: Uuid) -> Result<Option<Execution>> {
        let row = sqlx::query_as::<_, ExecutionRow>(
            r#"
            SELECT id, app_id, workflow_id, workflow_type, env_id, service_ids,
                   pipeline_execution_id, is_baseline, created_at, pipeline_execution
            FROM executions
            WHERE id = $1 AND app_id = $2
            "#,
        )
        .bind(id)
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Execution::try_from).transpose()
    }

    async fn save(&self, execution: &Execution) -> Result<()> {
        let pipeline_execution = execution
            .pipeline_execution
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO executions (
                id, app_id, workflow_id, workflow_type, env_id, service_ids,
                pipeline_execution_id, is_baseline, created_at, pipeline_execution
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET app_id = EXCLUDED.app_id,
                workflow_id = EXCLUDED.workflow_id,
                workflow_type = EXCLUDED.workflow_type,
                env_id = EXCLUDED.env_id,
                service_ids = EXCLUDED.service_ids,
                pipeline_execution_id = EXCLUDED.pipeline_execution_id,
                is_baseline = EXCLUDED.is_baseline,
                pipeline_execution = EXCLUDED.pipeline_execution
            "#,
        )
        .bind(execution.id)
        .bind(execution.app_id)
        .bind(execution.workflow_id)
        .bind(workflow_type_to_string(execution.workflow_type))
        .bind(execution.env_id)
        .bind(&execution.service_ids)
        .bind(execution.pipeline_execution_id)
        .bind(execution.is_baseline)
        .bind(execution.created_at)
        .bind(pipeline_execution)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_baseline_flag(&self, execution_id: Uuid, is_baseline: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE executions SET is_baseline = $1 WHERE id = $2")
            .bind(is_baseline)
            .bind(execution_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_snapshot_baseline_flag(
        &self,
        pipeline_execution_id: Uuid,
        execution_id: Uuid,
        is_baseline: bool,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let document: Option<(Option<serde_json::Value>,)> = sqlx::query_as(
            "SELECT pipeline_execution FROM executions WHERE id = $1 FOR UPDATE",
        )
        .bind(pipeline_execution_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((Some(document),)) = document else {
            return Ok(false);
        };

        let mut pipeline: PipelineExecution = serde_json::from_value(document)?;
        let Some(snapshot) = pipeline.snapshot_mut(execution_id) else {
            return Ok(false);
        };
        snapshot.is_baseline = is_baseline;

        sqlx::query("UPDATE executions SET pipeline_execution = $1 WHERE id = $2")
            .bind(serde_json::to_value(&pipeline)?)
            .bind(pipeline_execution_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn workflow_type_to_string(workflow_type: WorkflowType) -> &'static str {
    match workflow_type {
        WorkflowType::Workflow => "Workflow",
        WorkflowType::Pipeline => "Pipeline",
    }
}

fn string_to_workflow_type(s: &str) -> WorkflowType {
    match s {
        "Pipeline" => WorkflowType::Pipeline,
        _ => WorkflowType::Workflow,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ExecutionRow {
    id: Uuid,
    app_id: Uuid,
    workflow_id: Uuid,
    workflow_type: String,
    env_id: Option<Uuid>,
    service_ids: Vec<Uuid>,
    pipeline_execution_id: Option<Uuid>,
    is_baseline: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    pipeline_execution: Option<serde_json::Value>,
}

impl TryFrom<ExecutionRow> for Execution {
    type Error = super::RepositoryError;

    fn try_from(row: ExecutionRow) -> std::result::Result<Self, Self::Error> {
        let pipeline_execution = row
            .pipeline_execution
            .map(serde_json::from_value)
            .transpose()?;

        Ok(Execution {
            id: row.id,
            app_id: row.app_id,
            workflow_id: row.workflow_id,
            workflow_type: string_to_workflow_type(&row.workflow_type),
            env_id: row.env_id,
            service_ids: row.service_ids,
            pipeline_execution_id: row.pipeline_execution_id,
            is_baseline: row.is_baseline,
            created_at: row.created_at,
            pipeline_execution,
        })
    }
}
