//! Baseline DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to mark or unmark an execution as baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkBaseline {
    pub mark: bool,
}

/// Query for the baseline a running verification state compares against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineDetailsQuery {
    /// Baseline workflow execution being looked up
    pub workflow_execution_id: Uuid,
    pub state_execution_id: Uuid,
    /// Execution whose context supplies environment and service
    pub current_execution_id: Uuid,
}

/// Header carrying the caller's actor id
pub const ACTOR_ID_HEADER: &str = "x-anchor-user-id";

/// Header carrying the caller's display name
pub const ACTOR_NAME_HEADER: &str = "x-anchor-user-name";
