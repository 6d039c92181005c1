//! Execution Lookup
//!
//! Loads an execution and checks it can serve as a baseline. Never writes.

use std::sync::Arc;

use anchor_core::domain::execution::{Execution, WorkflowType};
use uuid::Uuid;

use crate::repository::{ExecutionRepository, StateExecutionRepository};
use crate::service::error::{BaselineError, Result};

pub const PIPELINE_NOT_EXECUTED: &str = "Pipeline has not been executed.";

pub const NO_WORKFLOWS_EXECUTED: &str = "No workflows have been executed for this pipeline.";

pub const NO_VERIFICATION_STEPS: &str = "Either there is no workflow execution with verification steps or verification steps haven't been executed for the workflow.";

/// Resolves executions and validates their eligibility
#[derive(Clone)]
pub struct ExecutionLookup {
    executions: Arc<dyn ExecutionRepository>,
    states: Arc<dyn StateExecutionRepository>,
}

impl ExecutionLookup {
    pub fn new(
        executions: Arc<dyn ExecutionRepository>,
        states: Arc<dyn StateExecutionRepository>,
    ) -> Self {
        Self { executions, states }
    }

    /// Returns the execution if it may be marked as baseline
    ///
    /// Workflow executions only have to exist. Pipeline executions must have
    /// run, have child workflow executions, and at least one child must have
    /// executed a verification state.
    pub async fn validate_eligible(&self, app_id: Uuid, execution_id: Uuid) -> Result<Execution> {
        let execution = self
            .executions
            .find_by_id(app_id, execution_id)
            .await?
            .ok_or(BaselineError::NotFound(execution_id))?;

        if execution.workflow_type == WorkflowType::Pipeline {
            self.validate_pipeline(&execution).await?;
        }

        tracing::debug!(
            "Execution {} ({}) is eligible as baseline",
            execution.id,
            execution.workflow_type
        );

        Ok(execution)
    }

    async fn validate_pipeline(&self, execution: &Execution) -> Result<()> {
        let pipeline = execution
            .pipeline_execution
            .as_ref()
            .filter(|pipeline| !pipeline.stages.is_empty())
            .ok_or_else(|| BaselineError::configuration(PIPELINE_NOT_EXECUTED))?;

        let children: Vec<Uuid> = pipeline
            .child_executions()
            .map(|child| child.execution_id)
            .collect();
        if children.is_empty() {
            return Err(BaselineError::configuration(NO_WORKFLOWS_EXECUTED));
        }

        for child in children {
            let states = self
                .states
                .find_by_execution(execution.app_id, child)
                .await?;
            if states.iter().any(|s| s.state_type.is_verification_state()) {
                return Ok(());
            }
        }

        Err(BaselineError::configuration(NO_VERIFICATION_STEPS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::Fixture;
    use anchor_core::domain::execution::PipelineExecution;
    use anchor_core::domain::state::StateType;

    fn assert_configuration(result: Result<Execution>, expected: &str) {
        match result {
            Err(BaselineError::Configuration(message)) => assert_eq!(message, expected),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_execution_is_not_found() {
        let fixture = Fixture::new();
        let missing = Uuid::new_v4();

        let result = fixture.lookup().validate_eligible(fixture.app_id, missing).await;

        assert!(matches!(result, Err(BaselineError::NotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_execution_from_other_app_is_not_found() {
        let fixture = Fixture::new();
        let execution = fixture.workflow_execution(None).await;

        let result = fixture
            .lookup()
            .validate_eligible(Uuid::new_v4(), execution.id)
            .await;

        assert!(matches!(result, Err(BaselineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_workflow_needs_only_to_exist() {
        let fixture = Fixture::new();
        let execution = fixture.workflow_execution(None).await;

        let found = fixture
            .lookup()
            .validate_eligible(fixture.app_id, execution.id)
            .await
            .unwrap();

        assert_eq!(found.id, execution.id);
    }

    #[tokio::test]
    async fn test_pipeline_that_never_ran() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline_execution(None).await;

        let result = fixture.lookup().validate_eligible(fixture.app_id, pipeline.id).await;

        assert_configuration(result, PIPELINE_NOT_EXECUTED);
    }

    #[tokio::test]
    async fn test_pipeline_without_stages() {
        let fixture = Fixture::new();
        let pipeline = fixture
            .pipeline_execution(Some(PipelineExecution::default()))
            .await;

        let result = fixture.lookup().validate_eligible(fixture.app_id, pipeline.id).await;

        assert_configuration(result, PIPELINE_NOT_EXECUTED);
    }

    #[tokio::test]
    async fn test_pipeline_without_workflow_executions() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline_with_children(0, &[]).await;

        let result = fixture.lookup().validate_eligible(fixture.app_id, pipeline.id).await;

        assert_configuration(result, NO_WORKFLOWS_EXECUTED);
    }

    #[tokio::test]
    async fn test_pipeline_without_verification_steps() {
        let fixture = Fixture::new();
        let pipeline = fixture
            .pipeline_with_children(2, &[StateType::Shell, StateType::Approval])
            .await;

        let result = fixture.lookup().validate_eligible(fixture.app_id, pipeline.id).await;

        assert_configuration(result, NO_VERIFICATION_STEPS);
    }

    #[tokio::test]
    async fn test_pipeline_with_verification_step_is_eligible() {
        let fixture = Fixture::new();
        let pipeline = fixture
            .pipeline_with_children(3, &[StateType::Deploy, StateType::Prometheus])
            .await;

        let found = fixture
            .lookup()
            .validate_eligible(fixture.app_id, pipeline.id)
            .await
            .unwrap();

        assert_eq!(found.workflow_type, WorkflowType::Pipeline);
    }
}
