use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::Config;

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Executions are written by the workflow engine; the table is created here
    // so a standalone deployment can boot against an empty database.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS executions (
            id UUID PRIMARY KEY,
            app_id UUID NOT NULL,
            workflow_id UUID NOT NULL,
            workflow_type VARCHAR(20) NOT NULL,
            env_id UUID,
            service_ids UUID[] NOT NULL DEFAULT '{}',
            pipeline_execution_id UUID,
            is_baseline BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL,
            pipeline_execution JSONB
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS state_executions (
            id UUID PRIMARY KEY,
            app_id UUID NOT NULL,
            execution_id UUID NOT NULL,
            state_type VARCHAR(50) NOT NULL,
            service_id UUID
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS execution_baselines (
            id UUID PRIMARY KEY,
            app_id UUID NOT NULL,
            workflow_id UUID NOT NULL,
            env_id UUID NOT NULL,
            service_id UUID NOT NULL,
            workflow_execution_id UUID NOT NULL,
            pipeline_execution_id UUID,
            created_by_id VARCHAR(255) NOT NULL,
            created_by_name VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_by_id VARCHAR(255) NOT NULL,
            updated_by_name VARCHAR(255) NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time_series_points (
            id UUID PRIMARY KEY,
            account_id UUID NOT NULL,
            workflow_execution_id UUID NOT NULL,
            state_execution_id UUID NOT NULL,
            host VARCHAR(255) NOT NULL,
            metric_name VARCHAR(255) NOT NULL,
            recorded_at TIMESTAMPTZ NOT NULL,
            metric_values JSONB NOT NULL DEFAULT '{}',
            valid_until TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS metric_analysis_summaries (
            id UUID PRIMARY KEY,
            account_id UUID NOT NULL,
            workflow_execution_id UUID NOT NULL,
            state_execution_id UUID NOT NULL,
            analysis_minute BIGINT NOT NULL,
            risk_level INTEGER NOT NULL,
            transaction_count INTEGER NOT NULL,
            message TEXT,
            valid_until TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS log_analysis_summaries (
            id UUID PRIMARY KEY,
            account_id UUID NOT NULL,
            workflow_execution_id UUID NOT NULL,
            state_execution_id UUID NOT NULL,
            query TEXT NOT NULL,
            analysis_minute BIGINT NOT NULL,
            score DOUBLE PRECISION NOT NULL,
            unknown_cluster_count INTEGER NOT NULL,
            valid_until TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One baseline per (workflow, environment, service)
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_baselines_tuple
        ON execution_baselines(workflow_id, env_id, service_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_baselines_workflow_execution ON execution_baselines(workflow_execution_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_executions_app ON executions(app_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_state_executions_execution ON state_executions(execution_id)",
    )
    .execute(pool)
    .await?;

    for table in [
        "time_series_points",
        "metric_analysis_summaries",
        "log_analysis_summaries",
    ] {
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_workflow_execution ON {table}(workflow_execution_id)"
        ))
        .execute(pool)
        .await?;
    }

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
