//! Baseline Resolver
//!
//! Expands an execution into the (workflow, environment, service) tuples it
//! would become the baseline for.

use anchor_core::domain::baseline::BaselineTuple;
use anchor_core::domain::execution::{Execution, ExecutionSnapshot, WorkflowType};
use uuid::Uuid;

use crate::service::error::{BaselineError, Result};

/// Resolves the tuples an execution represents
///
/// A workflow execution yields one tuple; its parent pipeline, if any, is
/// carried along so the pipeline's snapshot can be updated too. A pipeline
/// execution yields one tuple per child workflow execution, in stage order.
///
/// Only the first service of an execution is used.
pub fn resolve_tuples(execution: &Execution) -> Result<Vec<BaselineTuple>> {
    match execution.workflow_type {
        WorkflowType::Workflow => {
            let tuple = build_tuple(
                execution.app_id,
                execution.id,
                execution.workflow_id,
                execution.env_id,
                &execution.service_ids,
                execution.pipeline_execution_id,
            )?;
            Ok(vec![tuple])
        }
        WorkflowType::Pipeline => {
            let Some(pipeline) = execution.pipeline_execution.as_ref() else {
                return Ok(Vec::new());
            };

            pipeline
                .child_executions()
                .map(|child| resolve_child(execution, child))
                .collect()
        }
    }
}

fn resolve_child(pipeline: &Execution, child: &ExecutionSnapshot) -> Result<BaselineTuple> {
    build_tuple(
        pipeline.app_id,
        child.execution_id,
        child.workflow_id,
        child.env_id,
        &child.service_ids,
        Some(pipeline.id),
    )
}

fn build_tuple(
    app_id: Uuid,
    execution_id: Uuid,
    workflow_id: Uuid,
    env_id: Option<Uuid>,
    service_ids: &[Uuid],
    pipeline_execution_id: Option<Uuid>,
) -> Result<BaselineTuple> {
    let env_id = env_id.ok_or_else(|| {
        BaselineError::configuration(format!(
            "Execution {} has no environment to baseline.",
            execution_id
        ))
    })?;

    let service_id = service_ids.first().copied().ok_or_else(|| {
        BaselineError::configuration(format!(
            "Execution {} has no service to baseline.",
            execution_id
        ))
    })?;

    Ok(BaselineTuple {
        app_id,
        workflow_id,
        env_id,
        service_id,
        workflow_execution_id: execution_id,
        pipeline_execution_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_core::domain::execution::{PipelineExecution, PipelineStageExecution};

    fn workflow(service_ids: Vec<Uuid>) -> Execution {
        Execution {
            id: Uuid::new_v4(),
            app_id: Uuid::new_v4(),
            workflow_id: Uuid::new_v4(),
            workflow_type: WorkflowType::Workflow,
            env_id: Some(Uuid::new_v4()),
            service_ids,
            pipeline_execution_id: None,
            is_baseline: false,
            created_at: chrono::Utc::now(),
            pipeline_execution: None,
        }
    }

    #[test]
    fn test_workflow_resolves_single_tuple() {
        let execution = workflow(vec![Uuid::new_v4()]);

        let tuples = resolve_tuples(&execution).unwrap();

        assert_eq!(tuples.len(), 1);
        let tuple = tuples[0];
        assert_eq!(tuple.workflow_execution_id, execution.id);
        assert_eq!(tuple.workflow_id, execution.workflow_id);
        assert_eq!(Some(tuple.env_id), execution.env_id);
        assert_eq!(tuple.pipeline_execution_id, None);
    }

    #[test]
    fn test_workflow_inside_pipeline_keeps_parent() {
        let mut execution = workflow(vec![Uuid::new_v4()]);
        let parent = Uuid::new_v4();
        execution.pipeline_execution_id = Some(parent);

        let tuples = resolve_tuples(&execution).unwrap();

        assert_eq!(tuples[0].pipeline_execution_id, Some(parent));
    }

    #[test]
    fn test_only_first_service_is_used() {
        let first = Uuid::new_v4();
        let execution = workflow(vec![first, Uuid::new_v4(), Uuid::new_v4()]);

        let tuples = resolve_tuples(&execution).unwrap();

        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].service_id, first);
    }

    #[test]
    fn test_execution_without_service_is_rejected() {
        let execution = workflow(vec![]);

        let result = resolve_tuples(&execution);

        assert!(matches!(result, Err(BaselineError::Configuration(_))));
    }

    #[test]
    fn test_pipeline_resolves_one_tuple_per_child() {
        let children: Vec<Execution> = (0..4).map(|_| workflow(vec![Uuid::new_v4()])).collect();
        let mut pipeline = workflow(vec![]);
        pipeline.workflow_type = WorkflowType::Pipeline;
        pipeline.env_id = None;
        pipeline.pipeline_execution = Some(PipelineExecution {
            stages: vec![
                PipelineStageExecution {
                    name: "qa".to_string(),
                    workflow_executions: children[..1].iter().map(Execution::snapshot).collect(),
                },
                PipelineStageExecution {
                    name: "prod".to_string(),
                    workflow_executions: children[1..].iter().map(Execution::snapshot).collect(),
                },
            ],
        });

        let tuples = resolve_tuples(&pipeline).unwrap();

        assert_eq!(tuples.len(), 4);
        for (tuple, child) in tuples.iter().zip(&children) {
            assert_eq!(tuple.workflow_execution_id, child.id);
            assert_eq!(tuple.workflow_id, child.workflow_id);
            assert_eq!(tuple.service_id, child.service_ids[0]);
            assert_eq!(tuple.pipeline_execution_id, Some(pipeline.id));
            assert_eq!(tuple.app_id, pipeline.app_id);
        }
    }
}
