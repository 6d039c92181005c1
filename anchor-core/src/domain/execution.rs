//! Execution domain types
//!
//! Executions are owned by the workflow engine. Anchor only reads them and
//! flips their `is_baseline` flag.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workflow or pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: Uuid,
    pub app_id: Uuid,
    pub workflow_id: Uuid,
    pub workflow_type: WorkflowType,
    pub env_id: Option<Uuid>,
    pub service_ids: Vec<Uuid>,
    /// Set when this workflow execution ran as a stage of a pipeline
    pub pipeline_execution_id: Option<Uuid>,
    pub is_baseline: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Stage document, only present on pipeline executions that have run
    pub pipeline_execution: Option<PipelineExecution>,
}

/// Kind of execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowType {
    Workflow,
    Pipeline,
}

impl std::fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowType::Workflow => write!(f, "Workflow"),
            WorkflowType::Pipeline => write!(f, "Pipeline"),
        }
    }
}

/// Stage document embedded in a pipeline execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineExecution {
    pub stages: Vec<PipelineStageExecution>,
}

/// One stage of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStageExecution {
    pub name: String,
    pub workflow_executions: Vec<ExecutionSnapshot>,
}

/// Copy of a child workflow execution's fields, taken when the pipeline
/// document was assembled.
///
/// The snapshot is not a reference: its `is_baseline` flag has to be written
/// separately from the flag on the child's own [`Execution`] record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub execution_id: Uuid,
    pub workflow_id: Uuid,
    pub env_id: Option<Uuid>,
    pub service_ids: Vec<Uuid>,
    pub is_baseline: bool,
}

impl PipelineExecution {
    /// Iterates over every child workflow execution, stage by stage
    pub fn child_executions(&self) -> impl Iterator<Item = &ExecutionSnapshot> {
        self.stages
            .iter()
            .flat_map(|stage| stage.workflow_executions.iter())
    }

    pub fn snapshot(&self, execution_id: Uuid) -> Option<&ExecutionSnapshot> {
        self.child_executions()
            .find(|snapshot| snapshot.execution_id == execution_id)
    }

    pub fn snapshot_mut(&mut self, execution_id: Uuid) -> Option<&mut ExecutionSnapshot> {
        self.stages
            .iter_mut()
            .flat_map(|stage| stage.workflow_executions.iter_mut())
            .find(|snapshot| snapshot.execution_id == execution_id)
    }
}

impl Execution {
    /// Snapshot of this execution as it would be embedded in a pipeline
    pub fn snapshot(&self) -> ExecutionSnapshot {
        ExecutionSnapshot {
            execution_id: self.id,
            workflow_id: self.workflow_id,
            env_id: self.env_id,
            service_ids: self.service_ids.clone(),
            is_baseline: self.is_baseline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ExecutionSnapshot {
        ExecutionSnapshot {
            execution_id: Uuid::new_v4(),
            workflow_id: Uuid::new_v4(),
            env_id: Some(Uuid::new_v4()),
            service_ids: vec![Uuid::new_v4()],
            is_baseline: false,
        }
    }

    #[test]
    fn test_child_executions_spans_stages() {
        let pipeline = PipelineExecution {
            stages: vec![
                PipelineStageExecution {
                    name: "qa".to_string(),
                    workflow_executions: vec![snapshot(), snapshot()],
                },
                PipelineStageExecution {
                    name: "approval".to_string(),
                    workflow_executions: vec![],
                },
                PipelineStageExecution {
                    name: "prod".to_string(),
                    workflow_executions: vec![snapshot()],
                },
            ],
        };

        assert_eq!(pipeline.child_executions().count(), 3);
    }

    #[test]
    fn test_snapshot_mut_only_touches_match() {
        let target = snapshot();
        let sibling = snapshot();
        let mut pipeline = PipelineExecution {
            stages: vec![PipelineStageExecution {
                name: "deploy".to_string(),
                workflow_executions: vec![sibling.clone(), target.clone()],
            }],
        };

        pipeline
            .snapshot_mut(target.execution_id)
            .expect("snapshot present")
            .is_baseline = true;

        assert!(pipeline.snapshot(target.execution_id).unwrap().is_baseline);
        assert!(!pipeline.snapshot(sibling.execution_id).unwrap().is_baseline);
        assert!(pipeline.snapshot_mut(Uuid::new_v4()).is_none());
    }
}
