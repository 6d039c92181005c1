//! Baseline Repository
//!
//! Storage for baseline records. Implementations must keep at most one
//! record per (workflow, environment, service) tuple.

use anchor_core::domain::actor::Actor;
use anchor_core::domain::baseline::{BaselineFilter, BaselineRecord, TupleKey};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::error::Result;

/// Repository trait for baseline records
#[async_trait]
pub trait BaselineRepository: Send + Sync {
    /// Stores `record`, atomically removing whatever record held its tuple
    ///
    /// Returns the removed record, if any.
    async fn replace(&self, record: &BaselineRecord) -> Result<Option<BaselineRecord>>;

    /// Deletes the record of `key` only if it references `workflow_execution_id`
    ///
    /// Returns the deleted record, if any.
    async fn delete_if_execution(
        &self,
        key: TupleKey,
        workflow_execution_id: Uuid,
    ) -> Result<Option<BaselineRecord>>;

    /// Lists records matching `filter`, oldest first
    async fn query(&self, filter: &BaselineFilter) -> Result<Vec<BaselineRecord>>;
}

/// Postgres implementation of BaselineRepository
///
/// The unique index on (workflow_id, env_id, service_id) backs the
/// one-record-per-tuple rule.
pub struct PgBaselineRepository {
    pool: PgPool,
}

impl PgBaselineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BASELINE_COLUMNS: &str = "id, app_id, workflow_id, env_id, service_id, workflow_execution_id, \
     pipeline_execution_id, created_by_id, created_by_name, created_at, \
     updated_by_id, updated_by_name, updated_at";

#[async_trait]
impl BaselineRepository for PgBaselineRepository {
    async fn replace(&self, record: &BaselineRecord) -> Result<Option<BaselineRecord>> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query_as::<_, BaselineRow>(&format!(
            r#"
            DELETE FROM execution_baselines
            WHERE workflow_id = $1 AND env_id = $2 AND service_id = $3
            RETURNING {BASELINE_COLUMNS}
            "#
        ))
        .bind(record.workflow_id)
        .bind(record.env_id)
        .bind(record.service_id)
        .fetch_optional(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO execution_baselines (
                id, app_id, workflow_id, env_id, service_id, workflow_execution_id,
                pipeline_execution_id, created_by_id, created_by_name, created_at,
                updated_by_id, updated_by_name, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id)
        .bind(record.app_id)
        .bind(record.workflow_id)
        .bind(record.env_id)
        .bind(record.service_id)
        .bind(record.workflow_execution_id)
        .bind(record.pipeline_execution_id)
        .bind(&record.created_by.id)
        .bind(&record.created_by.name)
        .bind(record.created_at)
        .bind(&record.updated_by.id)
        .bind(&record.updated_by.name)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(removed.map(|r| r.into()))
    }

    async fn delete_if_execution(
        &self,
        key: TupleKey,
        workflow_execution_id: Uuid,
    ) -> Result<Option<BaselineRecord>> {
        let removed = sqlx::query_as::<_, BaselineRow>(&format!(
            r#"
            DELETE FROM execution_baselines
            WHERE workflow_id = $1 AND env_id = $2 AND service_id = $3
              AND workflow_execution_id = $4
            RETURNING {BASELINE_COLUMNS}
            "#
        ))
        .bind(key.workflow_id)
        .bind(key.env_id)
        .bind(key.service_id)
        .bind(workflow_execution_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(removed.map(|r| r.into()))
    }

    async fn query(&self, filter: &BaselineFilter) -> Result<Vec<BaselineRecord>> {
        let rows = sqlx::query_as::<_, BaselineRow>(&format!(
            r#"
            SELECT {BASELINE_COLUMNS}
            FROM execution_baselines
            WHERE ($1::uuid IS NULL OR app_id = $1)
              AND ($2::uuid IS NULL OR workflow_id = $2)
              AND ($3::uuid IS NULL OR env_id = $3)
              AND ($4::uuid IS NULL OR service_id = $4)
              AND ($5::uuid IS NULL OR workflow_execution_id = $5)
            ORDER BY created_at ASC
            "#
        ))
        .bind(filter.app_id)
        .bind(filter.workflow_id)
        .bind(filter.env_id)
        .bind(filter.service_id)
        .bind(filter.workflow_execution_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BaselineRow {
    id: Uuid,
    app_id: Uuid,
    workflow_id: Uuid,
    env_id: Uuid,
    service_id: Uuid,
    workflow_execution_id: Uuid,
    pipeline_execution_id: Option<Uuid>,
    created_by_id: String,
    created_by_name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_by_id: String,
    updated_by_name: String,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<BaselineRow> for BaselineRecord {
    fn from(row: BaselineRow) -> Self {
        BaselineRecord {
            id: row.id,
            app_id: row.app_id,
            workflow_id: row.workflow_id,
            env_id: row.env_id,
            service_id: row.service_id,
            workflow_execution_id: row.workflow_execution_id,
            pipeline_execution_id: row.pipeline_execution_id,
            created_by: Actor::new(row.created_by_id, row.created_by_name),
            created_at: row.created_at,
            updated_by: Actor::new(row.updated_by_id, row.updated_by_name),
            updated_at: row.updated_at,
        }
    }
}
