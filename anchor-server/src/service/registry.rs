//! Baseline Registry
//!
//! Authoritative store of baseline designations. Marking a tuple replaces
//! whatever record held it; unmarking only removes a record that references
//! the execution being unmarked.

use std::sync::Arc;

use anchor_core::domain::actor::Actor;
use anchor_core::domain::baseline::{BaselineFilter, BaselineRecord, BaselineTuple};
use uuid::Uuid;

use crate::repository::BaselineRepository;
use crate::service::error::Result;

/// Records created and deleted by a registry update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryOutcome {
    pub active: Vec<BaselineRecord>,
    pub removed: Vec<BaselineRecord>,
}

impl RegistryOutcome {
    fn merge(&mut self, other: RegistryOutcome) {
        self.active.extend(other.active);
        self.removed.extend(other.removed);
    }
}

/// Registry of current baselines
#[derive(Clone)]
pub struct BaselineRegistry {
    baselines: Arc<dyn BaselineRepository>,
}

impl BaselineRegistry {
    pub fn new(baselines: Arc<dyn BaselineRepository>) -> Self {
        Self { baselines }
    }

    /// Applies `mark` to every tuple in order
    pub async fn set_baseline(
        &self,
        actor: &Actor,
        tuples: &[BaselineTuple],
        mark: bool,
    ) -> Result<RegistryOutcome> {
        let mut outcome = RegistryOutcome::default();
        for tuple in tuples {
            outcome.merge(self.apply(actor, tuple, mark).await?);
        }
        Ok(outcome)
    }

    /// Applies `mark` to a single tuple
    pub async fn apply(
        &self,
        actor: &Actor,
        tuple: &BaselineTuple,
        mark: bool,
    ) -> Result<RegistryOutcome> {
        if mark {
            self.mark(actor, tuple).await
        } else {
            self.unmark(tuple).await
        }
    }

    async fn mark(&self, actor: &Actor, tuple: &BaselineTuple) -> Result<RegistryOutcome> {
        let record = tuple.to_record(actor, chrono::Utc::now());
        let removed = self.baselines.replace(&record).await?;

        match &removed {
            Some(previous) if previous.workflow_execution_id != tuple.workflow_execution_id => {
                tracing::info!(
                    "Baseline for {} moved from execution {} to {}",
                    tuple.key(),
                    previous.workflow_execution_id,
                    tuple.workflow_execution_id
                );
            }
            Some(_) => {
                tracing::debug!(
                    "Baseline for {} re-marked with execution {}",
                    tuple.key(),
                    tuple.workflow_execution_id
                );
            }
            None => {
                tracing::info!(
                    "Execution {} marked as baseline for {}",
                    tuple.workflow_execution_id,
                    tuple.key()
                );
            }
        }

        Ok(RegistryOutcome {
            active: vec![record],
            removed: removed.into_iter().collect(),
        })
    }

    async fn unmark(&self, tuple: &BaselineTuple) -> Result<RegistryOutcome> {
        let removed = self
            .baselines
            .delete_if_execution(tuple.key(), tuple.workflow_execution_id)
            .await?;

        match &removed {
            Some(_) => tracing::info!(
                "Execution {} unmarked as baseline for {}",
                tuple.workflow_execution_id,
                tuple.key()
            ),
            None => tracing::debug!(
                "Execution {} is not the baseline for {}, nothing to unmark",
                tuple.workflow_execution_id,
                tuple.key()
            ),
        }

        Ok(RegistryOutcome {
            active: Vec::new(),
            removed: removed.into_iter().collect(),
        })
    }

    /// Whether any record still references `workflow_execution_id`
    pub async fn is_referenced(&self, workflow_execution_id: Uuid) -> Result<bool> {
        let records = self
            .find(&BaselineFilter {
                workflow_execution_id: Some(workflow_execution_id),
                ..Default::default()
            })
            .await?;
        Ok(!records.is_empty())
    }

    pub async fn find(&self, filter: &BaselineFilter) -> Result<Vec<BaselineRecord>> {
        Ok(self.baselines.query(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{Fixture, actor};

    fn tuple(fixture: &Fixture, workflow_execution_id: Uuid) -> BaselineTuple {
        BaselineTuple {
            app_id: fixture.app_id,
            workflow_id: fixture.workflow_id,
            env_id: fixture.env_id,
            service_id: fixture.service_id,
            workflow_execution_id,
            pipeline_execution_id: None,
        }
    }

    #[tokio::test]
    async fn test_mark_creates_record() {
        let fixture = Fixture::new();
        let registry = fixture.registry();
        let tuple = tuple(&fixture, Uuid::new_v4());

        let outcome = registry.set_baseline(&actor(), &[tuple], true).await.unwrap();

        assert_eq!(outcome.active.len(), 1);
        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.active[0].created_by, actor());
        assert!(registry.is_referenced(tuple.workflow_execution_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_replaces_other_execution() {
        let fixture = Fixture::new();
        let registry = fixture.registry();
        let first = tuple(&fixture, Uuid::new_v4());
        let second = tuple(&fixture, Uuid::new_v4());

        registry.set_baseline(&actor(), &[first], true).await.unwrap();
        let outcome = registry.set_baseline(&actor(), &[second], true).await.unwrap();

        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(
            outcome.removed[0].workflow_execution_id,
            first.workflow_execution_id
        );
        let all = registry.find(&BaselineFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].workflow_execution_id, second.workflow_execution_id);
    }

    #[tokio::test]
    async fn test_remark_same_execution_keeps_single_record() {
        let fixture = Fixture::new();
        let registry = fixture.registry();
        let tuple = tuple(&fixture, Uuid::new_v4());

        registry.set_baseline(&actor(), &[tuple], true).await.unwrap();
        registry.set_baseline(&actor(), &[tuple], true).await.unwrap();

        let all = registry.find(&BaselineFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].workflow_execution_id, tuple.workflow_execution_id);
    }

    #[tokio::test]
    async fn test_unmark_other_execution_is_noop() {
        let fixture = Fixture::new();
        let registry = fixture.registry();
        let holder = tuple(&fixture, Uuid::new_v4());
        let other = tuple(&fixture, Uuid::new_v4());

        registry.set_baseline(&actor(), &[holder], true).await.unwrap();
        let outcome = registry.set_baseline(&actor(), &[other], false).await.unwrap();

        assert_eq!(outcome, RegistryOutcome::default());
        assert!(registry.is_referenced(holder.workflow_execution_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unmark_removes_matching_record() {
        let fixture = Fixture::new();
        let registry = fixture.registry();
        let tuple = tuple(&fixture, Uuid::new_v4());

        registry.set_baseline(&actor(), &[tuple], true).await.unwrap();
        let outcome = registry.set_baseline(&actor(), &[tuple], false).await.unwrap();

        assert_eq!(outcome.removed.len(), 1);
        assert!(!registry.is_referenced(tuple.workflow_execution_id).await.unwrap());

        let again = registry.set_baseline(&actor(), &[tuple], false).await.unwrap();
        assert!(again.removed.is_empty());
    }
}
