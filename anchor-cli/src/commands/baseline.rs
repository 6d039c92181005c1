//! Baseline command handlers
//!
//! Marks, unmarks, lists and inspects execution baselines.

use anchor_client::{AnchorClient, BaselineRecord};
use anchor_core::dto::baseline::BaselineDetailsQuery;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use uuid::Uuid;

use crate::config::Config;

/// Baseline subcommands
#[derive(Subcommand)]
pub enum BaselineCommands {
    /// Mark an execution as baseline
    Mark {
        /// Application ID
        app_id: Uuid,
        /// Workflow or pipeline execution ID
        execution_id: Uuid,
    },
    /// Unmark an execution as baseline
    Unmark {
        /// Application ID
        app_id: Uuid,
        /// Workflow or pipeline execution ID
        execution_id: Uuid,
    },
    /// List the current baselines of a workflow
    List {
        /// Application ID
        app_id: Uuid,
        /// Workflow ID
        workflow_id: Uuid,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the baseline a verification state compares against
    Details {
        /// Application ID
        app_id: Uuid,
        /// Baseline workflow execution ID
        workflow_execution_id: Uuid,
        /// State execution of the running verification
        #[arg(long)]
        state_execution_id: Uuid,
        /// Execution the state execution belongs to
        #[arg(long)]
        current_execution_id: Uuid,
    },
}

/// Handle baseline commands
pub async fn handle_baseline_command(command: BaselineCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        BaselineCommands::Mark {
            app_id,
            execution_id,
        } => mark(&client, app_id, execution_id, true).await,
        BaselineCommands::Unmark {
            app_id,
            execution_id,
        } => mark(&client, app_id, execution_id, false).await,
        BaselineCommands::List {
            app_id,
            workflow_id,
            json,
        } => list(&client, app_id, workflow_id, json).await,
        BaselineCommands::Details {
            app_id,
            workflow_execution_id,
            state_execution_id,
            current_execution_id,
        } => {
            let query = BaselineDetailsQuery {
                workflow_execution_id,
                state_execution_id,
                current_execution_id,
            };
            details(&client, app_id, &query).await
        }
    }
}

async fn mark(client: &AnchorClient, app_id: Uuid, execution_id: Uuid, mark: bool) -> Result<()> {
    let records = client
        .mark_baseline(app_id, execution_id, mark)
        .await
        .with_context(|| {
            format!(
                "Failed to {} execution {}",
                if mark { "mark" } else { "unmark" },
                execution_id
            )
        })?;

    if mark {
        println!(
            "{}",
            format!(
                "✓ Execution {} marked as baseline for {} tuple(s)",
                execution_id,
                records.len()
            )
            .green()
            .bold()
        );
        for record in &records {
            print_record_summary(record);
        }
    } else {
        println!(
            "{}",
            format!("✓ Execution {} unmarked as baseline", execution_id)
                .green()
                .bold()
        );
    }

    Ok(())
}

async fn list(client: &AnchorClient, app_id: Uuid, workflow_id: Uuid, json: bool) -> Result<()> {
    let records = client.list_baselines(app_id, workflow_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No baselines found.".yellow());
    } else {
        println!("{}", format!("Found {} baseline(s):", records.len()).bold());
        println!();
        for record in &records {
            print_record_summary(record);
        }
    }

    Ok(())
}

async fn details(client: &AnchorClient, app_id: Uuid, query: &BaselineDetailsQuery) -> Result<()> {
    match client.get_baseline_details(app_id, query).await? {
        Some(record) => print_record_details(&record),
        None => println!(
            "{}",
            format!(
                "Execution {} is not a baseline in this context.",
                query.workflow_execution_id
            )
            .yellow()
        ),
    }

    Ok(())
}

fn print_record_summary(record: &BaselineRecord) {
    println!(
        "  {} env {} service {}",
        record.workflow_execution_id.to_string().cyan(),
        short_id(record.env_id).dimmed(),
        short_id(record.service_id).dimmed()
    );
}

fn print_record_details(record: &BaselineRecord) {
    println!("{}", "Baseline".bold());
    println!("  Execution: {}", record.workflow_execution_id.to_string().cyan());
    println!("  Workflow:  {}", record.workflow_id);
    println!("  Env:       {}", record.env_id);
    println!("  Service:   {}", record.service_id);
    if let Some(pipeline) = record.pipeline_execution_id {
        println!("  Pipeline:  {}", pipeline);
    }
    println!(
        "  Marked by: {} at {}",
        record.created_by.name.bold(),
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// First block of a UUID
fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}
