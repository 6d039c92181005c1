//! Verification Data Repository
//!
//! Access to the three verification record collections. Anchor only ever
//! rewrites their `valid_until` column.

use std::collections::HashMap;

use anchor_core::domain::verification::{
    LogAnalysisSummary, MetricAnalysisSummary, TimeSeriesPoint, VerificationKind,
    VerificationRecord,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::error::Result;

/// Repository trait for verification records
#[async_trait]
pub trait VerificationDataRepository: Send + Sync {
    /// Sets `valid_until` on every record of `kind` belonging to one of
    /// `workflow_execution_ids`
    ///
    /// Returns the number of records updated.
    async fn update_valid_until(
        &self,
        kind: VerificationKind,
        workflow_execution_ids: &[Uuid],
        valid_until: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64>;

    /// Lists the records of `kind` for one workflow execution
    async fn find_by_workflow_execution(
        &self,
        kind: VerificationKind,
        workflow_execution_id: Uuid,
    ) -> Result<Vec<VerificationRecord>>;

    /// Inserts or replaces a record
    async fn save(&self, record: &VerificationRecord) -> Result<()>;
}

/// Postgres implementation of VerificationDataRepository
pub struct PgVerificationDataRepository {
    pool: PgPool,
}

impl PgVerificationDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationDataRepository for PgVerificationDataRepository {
    async fn update_valid_until(
        &self,
        kind: VerificationKind,
        workflow_execution_ids: &[Uuid],
        valid_until: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64> {
        let sql = format!(
            "UPDATE {} SET valid_until = $1 WHERE workflow_execution_id = ANY($2)",
            table_name(kind)
        );

        let result = sqlx::query(&sql)
            .bind(valid_until)
            .bind(workflow_execution_ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_by_workflow_execution(
        &self,
        kind: VerificationKind,
        workflow_execution_id: Uuid,
    ) -> Result<Vec<VerificationRecord>> {
        let records = match kind {
            VerificationKind::TimeSeries => sqlx::query_as::<_, TimeSeriesRow>(
                r#"
                SELECT id, account_id, workflow_execution_id, state_execution_id, host,
                       metric_name, recorded_at, metric_values, valid_until
                FROM time_series_points
                WHERE workflow_execution_id = $1
                "#,
            )
            .bind(workflow_execution_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|r| Ok(VerificationRecord::TimeSeries(r.try_into()?)))
            .collect::<Result<Vec<_>>>()?,
            VerificationKind::MetricAnalysis => sqlx::query_as::<_, MetricAnalysisRow>(
                r#"
                SELECT id, account_id, workflow_execution_id, state_execution_id,
                       analysis_minute, risk_level, transaction_count, message, valid_until
                FROM metric_analysis_summaries
                WHERE workflow_execution_id = $1
                "#,
            )
            .bind(workflow_execution_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|r| VerificationRecord::MetricAnalysis(r.into()))
            .collect(),
            VerificationKind::LogAnalysis => sqlx::query_as::<_, LogAnalysisRow>(
                r#"
                SELECT id, account_id, workflow_execution_id, state_execution_id, query,
                       analysis_minute, score, unknown_cluster_count, valid_until
                FROM log_analysis_summaries
                WHERE workflow_execution_id = $1
                "#,
            )
            .bind(workflow_execution_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|r| VerificationRecord::LogAnalysis(r.into()))
            .collect(),
        };

        Ok(records)
    }

    async fn save(&self, record: &VerificationRecord) -> Result<()> {
        match record {
            VerificationRecord::TimeSeries(point) => {
                sqlx::query(
                    r#"
                    INSERT INTO time_series_points (
                        id, account_id, workflow_execution_id, state_execution_id, host,
                        metric_name, recorded_at, metric_values, valid_until
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ON CONFLICT (id) DO UPDATE
                    SET metric_values = EXCLUDED.metric_values, valid_until = EXCLUDED.valid_until
                    "#,
                )
                .bind(point.id)
                .bind(point.account_id)
                .bind(point.workflow_execution_id)
                .bind(point.state_execution_id)
                .bind(&point.host)
                .bind(&point.metric_name)
                .bind(point.recorded_at)
                .bind(serde_json::to_value(&point.values)?)
                .bind(point.valid_until)
                .execute(&self.pool)
                .await?;
            }
            VerificationRecord::MetricAnalysis(summary) => {
                sqlx::query(
                    r#"
                    INSERT INTO metric_analysis_summaries (
                        id, account_id, workflow_execution_id, state_execution_id,
                        analysis_minute, risk_level, transaction_count, message, valid_until
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ON CONFLICT (id) DO UPDATE
                    SET risk_level = EXCLUDED.risk_level, valid_until = EXCLUDED.valid_until
                    "#,
                )
                .bind(summary.id)
                .bind(summary.account_id)
                .bind(summary.workflow_execution_id)
                .bind(summary.state_execution_id)
                .bind(summary.analysis_minute)
                .bind(summary.risk_level)
                .bind(summary.transaction_count)
                .bind(&summary.message)
                .bind(summary.valid_until)
                .execute(&self.pool)
                .await?;
            }
            VerificationRecord::LogAnalysis(summary) => {
                sqlx::query(
                    r#"
                    INSERT INTO log_analysis_summaries (
                        id, account_id, workflow_execution_id, state_execution_id, query,
                        analysis_minute, score, unknown_cluster_count, valid_until
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ON CONFLICT (id) DO UPDATE
                    SET score = EXCLUDED.score, valid_until = EXCLUDED.valid_until
                    "#,
                )
                .bind(summary.id)
                .bind(summary.account_id)
                .bind(summary.workflow_execution_id)
                .bind(summary.state_execution_id)
                .bind(&summary.query)
                .bind(summary.analysis_minute)
                .bind(summary.score)
                .bind(summary.unknown_cluster_count)
                .bind(summary.valid_until)
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn table_name(kind: VerificationKind) -> &'static str {
    match kind {
        VerificationKind::TimeSeries => "time_series_points",
        VerificationKind::MetricAnalysis => "metric_analysis_summaries",
        VerificationKind::LogAnalysis => "log_analysis_summaries",
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct TimeSeriesRow {
    id: Uuid,
    account_id: Uuid,
    workflow_execution_id: Uuid,
    state_execution_id: Uuid,
    host: String,
    metric_name: String,
    recorded_at: chrono::DateTime<chrono::Utc>,
    metric_values: serde_json::Value,
    valid_until: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<TimeSeriesRow> for TimeSeriesPoint {
    type Error = super::RepositoryError;

    fn try_from(row: TimeSeriesRow) -> std::result::Result<Self, Self::Error> {
        let values: HashMap<String, f64> = serde_json::from_value(row.metric_values)?;

        Ok(TimeSeriesPoint {
            id: row.id,
            account_id: row.account_id,
            workflow_execution_id: row.workflow_execution_id,
            state_execution_id: row.state_execution_id,
            host: row.host,
            metric_name: row.metric_name,
            recorded_at: row.recorded_at,
            values,
            valid_until: row.valid_until,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MetricAnalysisRow {
    id: Uuid,
    account_id: Uuid,
    workflow_execution_id: Uuid,
    state_execution_id: Uuid,
    analysis_minute: i64,
    risk_level: i32,
    transaction_count: i32,
    message: Option<String>,
    valid_until: chrono::DateTime<chrono::Utc>,
}

impl From<MetricAnalysisRow> for MetricAnalysisSummary {
    fn from(row: MetricAnalysisRow) -> Self {
        MetricAnalysisSummary {
            id: row.id,
            account_id: row.account_id,
            workflow_execution_id: row.workflow_execution_id,
            state_execution_id: row.state_execution_id,
            analysis_minute: row.analysis_minute,
            risk_level: row.risk_level,
            transaction_count: row.transaction_count,
            message: row.message,
            valid_until: row.valid_until,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LogAnalysisRow {
    id: Uuid,
    account_id: Uuid,
    workflow_execution_id: Uuid,
    state_execution_id: Uuid,
    query: String,
    analysis_minute: i64,
    score: f64,
    unknown_cluster_count: i32,
    valid_until: chrono::DateTime<chrono::Utc>,
}

impl From<LogAnalysisRow> for LogAnalysisSummary {
    fn from(row: LogAnalysisRow) -> Self {
        LogAnalysisSummary {
            id: row.id,
            account_id: row.account_id,
            workflow_execution_id: row.workflow_execution_id,
            state_execution_id: row.state_execution_id,
            query: row.query,
            analysis_minute: row.analysis_minute,
            score: row.score,
            unknown_cluster_count: row.unknown_cluster_count,
            valid_until: row.valid_until,
        }
    }
}
