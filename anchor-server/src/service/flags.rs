//! Flag Propagator
//!
//! Keeps the denormalized `is_baseline` flags in line with the registry. A
//! child workflow execution carries the flag twice: on its own record and on
//! its snapshot inside the pipeline document. Both are written here.

use std::sync::Arc;

use uuid::Uuid;

use crate::repository::{ExecutionRepository, RepositoryError};

#[derive(Clone)]
pub struct FlagPropagator {
    executions: Arc<dyn ExecutionRepository>,
}

impl FlagPropagator {
    pub fn new(executions: Arc<dyn ExecutionRepository>) -> Self {
        Self { executions }
    }

    /// Sets `is_baseline = mark` on the execution and, when it ran inside a
    /// pipeline, on the pipeline's snapshot of it
    ///
    /// The snapshot write is attempted even if the record write fails; the
    /// first error is returned.
    pub async fn apply(
        &self,
        execution_id: Uuid,
        pipeline_execution_id: Option<Uuid>,
        mark: bool,
    ) -> Result<(), RepositoryError> {
        let record = self.executions.set_baseline_flag(execution_id, mark).await;
        match &record {
            Ok(false) => tracing::warn!(
                "Execution {} not found while setting baseline flag to {}",
                execution_id,
                mark
            ),
            Ok(true) => tracing::debug!("Execution {} baseline flag set to {}", execution_id, mark),
            Err(_) => {}
        }

        let snapshot = match pipeline_execution_id {
            Some(pipeline_execution_id) => {
                let result = self
                    .executions
                    .set_snapshot_baseline_flag(pipeline_execution_id, execution_id, mark)
                    .await;
                if let Ok(false) = result {
                    tracing::warn!(
                        "Snapshot of execution {} not found in pipeline {}",
                        execution_id,
                        pipeline_execution_id
                    );
                }
                result.map(|_| ())
            }
            None => Ok(()),
        };

        record.map(|_| ()).and(snapshot)
    }
}
