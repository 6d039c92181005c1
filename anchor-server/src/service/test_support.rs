//! Shared fixtures for service tests

use std::collections::HashMap;

use anchor_core::domain::actor::Actor;
use anchor_core::domain::execution::{
    Execution, PipelineExecution, PipelineStageExecution, WorkflowType,
};
use anchor_core::domain::state::{StateExecution, StateType};
use anchor_core::domain::verification::{
    LogAnalysisSummary, MetricAnalysisSummary, TimeSeriesPoint, VerificationKind,
    VerificationRecord,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::repository::{InMemoryStore, Repositories};
use crate::service::{
    BaselineRegistry, BaselineService, ExecutionLookup, FlagPropagator, RetentionExtender,
    RetentionPolicy,
};

pub(crate) fn actor() -> Actor {
    Actor::new("u-1", "Jane")
}

pub(crate) struct Fixture {
    pub app_id: Uuid,
    pub workflow_id: Uuid,
    pub env_id: Uuid,
    pub service_id: Uuid,
    pub repos: Repositories,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            app_id: Uuid::new_v4(),
            workflow_id: Uuid::new_v4(),
            env_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            repos: Repositories::in_memory(InMemoryStore::new()),
        }
    }

    pub fn lookup(&self) -> ExecutionLookup {
        ExecutionLookup::new(self.repos.executions.clone(), self.repos.states.clone())
    }

    pub fn registry(&self) -> BaselineRegistry {
        BaselineRegistry::new(self.repos.baselines.clone())
    }

    pub fn flags(&self) -> FlagPropagator {
        FlagPropagator::new(self.repos.executions.clone())
    }

    pub fn retention(&self) -> RetentionExtender {
        RetentionExtender::new(self.repos.verification.clone(), RetentionPolicy::default())
    }

    pub fn service(&self) -> BaselineService {
        BaselineService::new(self.repos.clone(), RetentionPolicy::default())
    }

    /// Workflow execution of the fixture's workflow, environment and service
    pub async fn workflow_execution(&self, pipeline_execution_id: Option<Uuid>) -> Execution {
        let execution = Execution {
            id: Uuid::new_v4(),
            app_id: self.app_id,
            workflow_id: self.workflow_id,
            workflow_type: WorkflowType::Workflow,
            env_id: Some(self.env_id),
            service_ids: vec![self.service_id],
            pipeline_execution_id,
            is_baseline: false,
            created_at: Utc::now(),
            pipeline_execution: None,
        };
        self.save(&execution).await;
        execution
    }

    pub async fn pipeline_execution(&self, document: Option<PipelineExecution>) -> Execution {
        self.pipeline(Uuid::new_v4(), document).await
    }

    async fn pipeline(&self, id: Uuid, document: Option<PipelineExecution>) -> Execution {
        let execution = Execution {
            id,
            app_id: self.app_id,
            workflow_id: Uuid::new_v4(),
            workflow_type: WorkflowType::Pipeline,
            env_id: None,
            service_ids: Vec::new(),
            pipeline_execution_id: None,
            is_baseline: false,
            created_at: Utc::now(),
            pipeline_execution: document,
        };
        self.save(&execution).await;
        execution
    }

    /// Pipeline with one stage holding `count` child executions, each of a
    /// distinct workflow and each having run `states`
    pub async fn pipeline_with_children(&self, count: usize, states: &[StateType]) -> Execution {
        let pipeline_id = Uuid::new_v4();
        let mut snapshots = Vec::with_capacity(count);

        for _ in 0..count {
            let child = Execution {
                id: Uuid::new_v4(),
                app_id: self.app_id,
                workflow_id: Uuid::new_v4(),
                workflow_type: WorkflowType::Workflow,
                env_id: Some(self.env_id),
                service_ids: vec![self.service_id],
                pipeline_execution_id: Some(pipeline_id),
                is_baseline: false,
                created_at: Utc::now(),
                pipeline_execution: None,
            };
            self.save(&child).await;
            for state_type in states {
                self.state_execution(child.id, *state_type).await;
            }
            snapshots.push(child.snapshot());
        }

        self.pipeline(
            pipeline_id,
            Some(PipelineExecution {
                stages: vec![PipelineStageExecution {
                    name: "deploy".to_string(),
                    workflow_executions: snapshots,
                }],
            }),
        )
        .await
    }

    pub async fn state_execution(&self, execution_id: Uuid, state_type: StateType) -> StateExecution {
        let state = StateExecution {
            id: Uuid::new_v4(),
            app_id: self.app_id,
            execution_id,
            state_type,
            service_id: None,
        };
        self.repos.states.save(&state).await.unwrap();
        state
    }

    pub async fn execution(&self, id: Uuid) -> Execution {
        self.repos
            .executions
            .find_by_id(self.app_id, id)
            .await
            .unwrap()
            .expect("execution exists")
    }

    /// Child execution ids in stage order
    pub fn children(pipeline: &Execution) -> Vec<Uuid> {
        pipeline
            .pipeline_execution
            .as_ref()
            .map(|document| document.child_executions().map(|c| c.execution_id).collect())
            .unwrap_or_default()
    }

    /// One record of each kind with the standard expiry
    pub async fn seed_verification(&self, workflow_execution_id: Uuid) -> Vec<VerificationRecord> {
        let valid_until = Utc::now() + Duration::days(30);
        let account_id = Uuid::new_v4();
        let state_execution_id = Uuid::new_v4();

        let records = vec![
            VerificationRecord::TimeSeries(TimeSeriesPoint {
                id: Uuid::new_v4(),
                account_id,
                workflow_execution_id,
                state_execution_id,
                host: "web-1".to_string(),
                metric_name: "cpu".to_string(),
                recorded_at: Utc::now(),
                values: HashMap::from([("avg".to_string(), 0.42)]),
                valid_until,
            }),
            VerificationRecord::MetricAnalysis(MetricAnalysisSummary {
                id: Uuid::new_v4(),
                account_id,
                workflow_execution_id,
                state_execution_id,
                analysis_minute: 5,
                risk_level: 1,
                transaction_count: 20,
                message: None,
                valid_until,
            }),
            VerificationRecord::LogAnalysis(LogAnalysisSummary {
                id: Uuid::new_v4(),
                account_id,
                workflow_execution_id,
                state_execution_id,
                query: "error".to_string(),
                analysis_minute: 5,
                score: 0.1,
                unknown_cluster_count: 0,
                valid_until,
            }),
        ];

        for record in &records {
            self.repos.verification.save(record).await.unwrap();
        }
        records
    }

    /// Every verification record of the execution
    pub async fn verification(&self, workflow_execution_id: Uuid) -> Vec<VerificationRecord> {
        let mut records = Vec::new();
        for kind in VerificationKind::ALL {
            records.extend(
                self.repos
                    .verification
                    .find_by_workflow_execution(kind, workflow_execution_id)
                    .await
                    .unwrap(),
            );
        }
        records
    }

    async fn save(&self, execution: &Execution) {
        self.repos.executions.save(execution).await.unwrap();
    }
}
