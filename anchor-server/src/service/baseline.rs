//! Baseline Service
//!
//! Public entry points for marking, unmarking and reading baselines. A call
//! runs lookup, resolution, then for every tuple the registry update followed
//! by flag propagation and retention. Registry failures abort the call; flag
//! and retention failures are logged and skipped.

use anchor_core::domain::actor::Actor;
use anchor_core::domain::baseline::{BaselineFilter, BaselineRecord};
use uuid::Uuid;

use std::sync::Arc;

use crate::repository::{ExecutionContextProvider, Repositories};
use crate::service::error::{BaselineError, Result};
use crate::service::flags::FlagPropagator;
use crate::service::lookup::ExecutionLookup;
use crate::service::registry::BaselineRegistry;
use crate::service::resolver::resolve_tuples;
use crate::service::retention::{RetentionExtender, RetentionPolicy};

/// Service for baseline designation
#[derive(Clone)]
pub struct BaselineService {
    lookup: ExecutionLookup,
    registry: BaselineRegistry,
    flags: FlagPropagator,
    retention: RetentionExtender,
    contexts: Arc<dyn ExecutionContextProvider>,
}

impl BaselineService {
    pub fn new(repos: Repositories, policy: RetentionPolicy) -> Self {
        Self {
            lookup: ExecutionLookup::new(repos.executions.clone(), repos.states),
            registry: BaselineRegistry::new(repos.baselines),
            flags: FlagPropagator::new(repos.executions),
            retention: RetentionExtender::new(repos.verification, policy),
            contexts: repos.contexts,
        }
    }

    /// Marks (`mark = true`) or unmarks an execution as baseline
    ///
    /// A pipeline execution stands for all of its child workflow executions.
    /// Returns the records active for the resolved tuples after the call,
    /// which is empty when unmarking.
    pub async fn mark_baseline(
        &self,
        actor: &Actor,
        app_id: Uuid,
        execution_id: Uuid,
        mark: bool,
    ) -> Result<Vec<BaselineRecord>> {
        let execution = self.lookup.validate_eligible(app_id, execution_id).await?;
        let tuples = resolve_tuples(&execution)?;

        tracing::info!(
            "{} {} execution {} as baseline ({} tuples) for {}",
            if mark { "Marking" } else { "Unmarking" },
            execution.workflow_type,
            execution_id,
            tuples.len(),
            actor.id
        );

        let mut active: Vec<BaselineRecord> = Vec::with_capacity(tuples.len());
        for tuple in &tuples {
            let outcome = self.registry.apply(actor, tuple, mark).await?;

            for removed in &outcome.removed {
                if removed.workflow_execution_id != tuple.workflow_execution_id {
                    self.release(removed.workflow_execution_id, removed.pipeline_execution_id)
                        .await;
                }
            }

            if mark {
                self.propagate(tuple.workflow_execution_id, tuple.pipeline_execution_id, true)
                    .await;
            } else {
                self.release(tuple.workflow_execution_id, tuple.pipeline_execution_id)
                    .await;
            }

            for record in outcome.active {
                upsert_by_key(&mut active, record);
            }
        }

        Ok(active)
    }

    /// Baseline record matching a workflow execution in the environment and
    /// service of the given state execution
    ///
    /// The state execution is looked up within `current_execution_id`.
    /// Returns `None` when that context cannot be resolved or when no record
    /// matches.
    pub async fn get_baseline_details(
        &self,
        app_id: Uuid,
        workflow_execution_id: Uuid,
        state_execution_id: Uuid,
        current_execution_id: Uuid,
    ) -> Result<Option<BaselineRecord>> {
        let Some(context) = self
            .contexts
            .resolve(app_id, current_execution_id, state_execution_id)
            .await?
        else {
            tracing::info!(
                "Failed to get baseline details for app {}, execution {}, state execution {}",
                app_id,
                current_execution_id,
                state_execution_id
            );
            return Ok(None);
        };

        let mut records = self
            .registry
            .find(&BaselineFilter {
                app_id: Some(app_id),
                env_id: Some(context.env_id),
                service_id: Some(context.service_id),
                workflow_execution_id: Some(workflow_execution_id),
                ..Default::default()
            })
            .await?;

        if records.len() > 1 {
            return Err(BaselineError::Inconsistent(format!(
                "workflow execution {} exists in more than one baseline",
                workflow_execution_id
            )));
        }

        Ok(records.pop())
    }

    /// Current baselines of a workflow
    pub async fn list_baselines(&self, app_id: Uuid, workflow_id: Uuid) -> Result<Vec<BaselineRecord>> {
        let records = self
            .registry
            .find(&BaselineFilter {
                app_id: Some(app_id),
                workflow_id: Some(workflow_id),
                ..Default::default()
            })
            .await?;

        tracing::debug!("Found {} baselines for workflow {}", records.len(), workflow_id);
        Ok(records)
    }

    async fn propagate(
        &self,
        workflow_execution_id: Uuid,
        pipeline_execution_id: Option<Uuid>,
        mark: bool,
    ) {
        if let Err(e) = self
            .flags
            .apply(workflow_execution_id, pipeline_execution_id, mark)
            .await
        {
            tracing::warn!(
                "Failed to set baseline flag on execution {}: {}",
                workflow_execution_id,
                e
            );
        }

        if let Err(e) = self
            .retention
            .extend_retention(&[workflow_execution_id], mark)
            .await
        {
            tracing::warn!(
                "Failed to update retention of execution {}: {}",
                workflow_execution_id,
                e
            );
        }
    }

    /// Clears the flag and reverts retention of an execution no record
    /// references any more
    async fn release(&self, workflow_execution_id: Uuid, pipeline_execution_id: Option<Uuid>) {
        match self.registry.is_referenced(workflow_execution_id).await {
            Ok(true) => {
                tracing::debug!(
                    "Execution {} is still a baseline, keeping its flag",
                    workflow_execution_id
                );
                return;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    "Failed to check references of execution {}: {}",
                    workflow_execution_id,
                    e
                );
                return;
            }
        }

        self.propagate(workflow_execution_id, pipeline_execution_id, false)
            .await;
    }
}

/// Keeps the last record per tuple, in first-seen order
fn upsert_by_key(records: &mut Vec<BaselineRecord>, record: BaselineRecord) {
    let key = record.key();
    match records.iter_mut().find(|r| r.key() == key) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}
