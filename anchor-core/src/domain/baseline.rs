//! Baseline domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::actor::Actor;

/// Designation of a workflow execution as the comparison baseline for one
/// (workflow, environment, service) tuple.
///
/// At most one record exists per [`TupleKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRecord {
    pub id: Uuid,
    pub app_id: Uuid,
    pub workflow_id: Uuid,
    pub env_id: Uuid,
    pub service_id: Uuid,
    pub workflow_execution_id: Uuid,
    /// Absent when a standalone workflow execution was baselined directly
    pub pipeline_execution_id: Option<Uuid>,
    pub created_by: Actor,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Actor,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl BaselineRecord {
    pub fn key(&self) -> TupleKey {
        TupleKey {
            workflow_id: self.workflow_id,
            env_id: self.env_id,
            service_id: self.service_id,
        }
    }
}

/// (workflow, environment, service) triple identifying one comparable
/// deployment target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TupleKey {
    pub workflow_id: Uuid,
    pub env_id: Uuid,
    pub service_id: Uuid,
}

impl std::fmt::Display for TupleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "workflow={} env={} service={}",
            self.workflow_id, self.env_id, self.service_id
        )
    }
}

/// A tuple resolved from an execution, together with the execution ids that
/// would become its baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineTuple {
    pub app_id: Uuid,
    pub workflow_id: Uuid,
    pub env_id: Uuid,
    pub service_id: Uuid,
    pub workflow_execution_id: Uuid,
    pub pipeline_execution_id: Option<Uuid>,
}

impl BaselineTuple {
    pub fn key(&self) -> TupleKey {
        TupleKey {
            workflow_id: self.workflow_id,
            env_id: self.env_id,
            service_id: self.service_id,
        }
    }

    /// Builds a fresh record for this tuple stamped with `actor` at `now`
    pub fn to_record(&self, actor: &Actor, now: chrono::DateTime<chrono::Utc>) -> BaselineRecord {
        BaselineRecord {
            id: Uuid::new_v4(),
            app_id: self.app_id,
            workflow_id: self.workflow_id,
            env_id: self.env_id,
            service_id: self.service_id,
            workflow_execution_id: self.workflow_execution_id,
            pipeline_execution_id: self.pipeline_execution_id,
            created_by: actor.clone(),
            created_at: now,
            updated_by: actor.clone(),
            updated_at: now,
        }
    }
}

/// Filter for baseline queries; `None` fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineFilter {
    pub app_id: Option<Uuid>,
    pub workflow_id: Option<Uuid>,
    pub env_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub workflow_execution_id: Option<Uuid>,
}

impl BaselineFilter {
    pub fn matches(&self, record: &BaselineRecord) -> bool {
        self.app_id.is_none_or(|id| id == record.app_id)
            && self.workflow_id.is_none_or(|id| id == record.workflow_id)
            && self.env_id.is_none_or(|id| id == record.env_id)
            && self.service_id.is_none_or(|id| id == record.service_id)
            && self
                .workflow_execution_id
                .is_none_or(|id| id == record.workflow_execution_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple() -> BaselineTuple {
        BaselineTuple {
            app_id: Uuid::new_v4(),
            workflow_id: Uuid::new_v4(),
            env_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            workflow_execution_id: Uuid::new_v4(),
            pipeline_execution_id: None,
        }
    }

    #[test]
    fn test_to_record_copies_tuple() {
        let tuple = tuple();
        let actor = Actor::new("u-1", "Jane");
        let now = chrono::Utc::now();

        let record = tuple.to_record(&actor, now);

        assert_eq!(record.key(), tuple.key());
        assert_eq!(record.workflow_execution_id, tuple.workflow_execution_id);
        assert_eq!(record.created_by, actor);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn test_filter_matches() {
        let record = tuple().to_record(&Actor::new("u-1", "Jane"), chrono::Utc::now());

        assert!(BaselineFilter::default().matches(&record));
        assert!(
            BaselineFilter {
                workflow_id: Some(record.workflow_id),
                workflow_execution_id: Some(record.workflow_execution_id),
                ..Default::default()
            }
            .matches(&record)
        );
        assert!(
            !BaselineFilter {
                env_id: Some(Uuid::new_v4()),
                ..Default::default()
            }
            .matches(&record)
        );
    }
}
