//! In-memory store
//!
//! Serves every repository trait from one shared map set. Used by tests and
//! by local runs without a database.

use std::collections::HashMap;
use std::sync::Arc;

use anchor_core::domain::baseline::{BaselineFilter, BaselineRecord, TupleKey};
use anchor_core::domain::execution::Execution;
use anchor_core::domain::state::StateExecution;
use anchor_core::domain::verification::{Retained, VerificationKind, VerificationRecord};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::baseline::BaselineRepository;
use super::context::{ExecutionContext, ExecutionContextProvider};
use super::error::Result;
use super::execution::ExecutionRepository;
use super::state::StateExecutionRepository;
use super::verification::VerificationDataRepository;

#[derive(Default)]
struct StoreState {
    executions: HashMap<Uuid, Execution>,
    states: HashMap<Uuid, StateExecution>,
    baselines: HashMap<TupleKey, BaselineRecord>,
    verification: HashMap<Uuid, VerificationRecord>,
}

/// Thread-safe in-memory implementation of all repositories
///
/// Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionRepository for InMemoryStore {
    async fn find_by_id(&self, app_id: Uuid, id: Uuid) -> Result<Option<Execution>> {
        let state = self.state.read().await;
        Ok(state
            .executions
            .get(&id)
            .filter(|execution| execution.app_id == app_id)
            .cloned())
    }

    async fn save(&self, execution: &Execution) -> Result<()> {
        let mut state = self.state.write().await;
        state.executions.insert(execution.id, execution.clone());
        Ok(())
    }

    async fn set_baseline_flag(&self, execution_id: Uuid, is_baseline: bool) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.executions.get_mut(&execution_id) {
            Some(execution) => {
                execution.is_baseline = is_baseline;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_snapshot_baseline_flag(
        &self,
        pipeline_execution_id: Uuid,
        execution_id: Uuid,
        is_baseline: bool,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        let snapshot = state
            .executions
            .get_mut(&pipeline_execution_id)
            .and_then(|pipeline| pipeline.pipeline_execution.as_mut())
            .and_then(|document| document.snapshot_mut(execution_id));

        match snapshot {
            Some(snapshot) => {
                snapshot.is_baseline = is_baseline;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl StateExecutionRepository for InMemoryStore {
    async fn find_by_execution(
        &self,
        app_id: Uuid,
        execution_id: Uuid,
    ) -> Result<Vec<StateExecution>> {
        let state = self.state.read().await;
        Ok(state
            .states
            .values()
            .filter(|s| s.app_id == app_id && s.execution_id == execution_id)
            .cloned()
            .collect())
    }

    async fn save(&self, state_execution: &StateExecution) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .states
            .insert(state_execution.id, state_execution.clone());
        Ok(())
    }
}

#[async_trait]
impl BaselineRepository for InMemoryStore {
    async fn replace(&self, record: &BaselineRecord) -> Result<Option<BaselineRecord>> {
        let mut state = self.state.write().await;
        Ok(state.baselines.insert(record.key(), record.clone()))
    }

    async fn delete_if_execution(
        &self,
        key: TupleKey,
        workflow_execution_id: Uuid,
    ) -> Result<Option<BaselineRecord>> {
        let mut state = self.state.write().await;
        let matches = state
            .baselines
            .get(&key)
            .is_some_and(|record| record.workflow_execution_id == workflow_execution_id);

        Ok(if matches {
            state.baselines.remove(&key)
        } else {
            None
        })
    }

    async fn query(&self, filter: &BaselineFilter) -> Result<Vec<BaselineRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<BaselineRecord> = state
            .baselines
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }
}

#[async_trait]
impl VerificationDataRepository for InMemoryStore {
    async fn update_valid_until(
        &self,
        kind: VerificationKind,
        workflow_execution_ids: &[Uuid],
        valid_until: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for record in state.verification.values_mut() {
            if record.kind() == kind
                && workflow_execution_ids.contains(&record.workflow_execution_id())
            {
                record.set_valid_until(valid_until);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn find_by_workflow_execution(
        &self,
        kind: VerificationKind,
        workflow_execution_id: Uuid,
    ) -> Result<Vec<VerificationRecord>> {
        let state = self.state.read().await;
        Ok(state
            .verification
            .values()
            .filter(|r| r.kind() == kind && r.workflow_execution_id() == workflow_execution_id)
            .cloned()
            .collect())
    }

    async fn save(&self, record: &VerificationRecord) -> Result<()> {
        let mut state = self.state.write().await;
        state.verification.insert(record.id(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl ExecutionContextProvider for InMemoryStore {
    async fn resolve(
        &self,
        app_id: Uuid,
        execution_id: Uuid,
        state_execution_id: Uuid,
    ) -> Result<Option<ExecutionContext>> {
        let state = self.state.read().await;

        let Some(state_execution) = state
            .states
            .get(&state_execution_id)
            .filter(|s| s.app_id == app_id && s.execution_id == execution_id)
        else {
            return Ok(None);
        };
        let Some(execution) = state.executions.get(&execution_id) else {
            return Ok(None);
        };

        let service_id = state_execution
            .service_id
            .or_else(|| execution.service_ids.first().copied());

        Ok(match (execution.env_id, service_id) {
            (Some(env_id), Some(service_id)) => Some(ExecutionContext { env_id, service_id }),
            _ => None,
        })
    }
}
