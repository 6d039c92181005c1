//! State execution domain types
//!
//! A state execution is one executed step of a workflow run. Anchor only
//! needs to know which steps produced verification data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An executed workflow state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateExecution {
    pub id: Uuid,
    pub app_id: Uuid,
    pub execution_id: Uuid,
    pub state_type: StateType,
    /// Service of the phase the state ran in, when the state is phase scoped
    pub service_id: Option<Uuid>,
}

/// Type of an executed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateType {
    // APM providers
    AppDynamics,
    NewRelic,
    Prometheus,
    Datadog,
    CloudWatch,
    Dynatrace,
    Stackdriver,
    // Log providers
    Splunk,
    Elk,
    SumoLogic,
    Loggly,
    // Everything else
    Shell,
    Http,
    Approval,
    Deploy,
    Rollback,
    Other,
}

impl StateType {
    /// Whether the state produces analyzable metrics or logs
    pub fn is_verification_state(self) -> bool {
        matches!(
            self,
            StateType::AppDynamics
                | StateType::NewRelic
                | StateType::Prometheus
                | StateType::Datadog
                | StateType::CloudWatch
                | StateType::Dynatrace
                | StateType::Stackdriver
                | StateType::Splunk
                | StateType::Elk
                | StateType::SumoLogic
                | StateType::Loggly
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StateType::AppDynamics => "AppDynamics",
            StateType::NewRelic => "NewRelic",
            StateType::Prometheus => "Prometheus",
            StateType::Datadog => "Datadog",
            StateType::CloudWatch => "CloudWatch",
            StateType::Dynatrace => "Dynatrace",
            StateType::Stackdriver => "Stackdriver",
            StateType::Splunk => "Splunk",
            StateType::Elk => "Elk",
            StateType::SumoLogic => "SumoLogic",
            StateType::Loggly => "Loggly",
            StateType::Shell => "Shell",
            StateType::Http => "Http",
            StateType::Approval => "Approval",
            StateType::Deploy => "Deploy",
            StateType::Rollback => "Rollback",
            StateType::Other => "Other",
        }
    }

    /// Parses a stored state type; unknown names map to [`StateType::Other`]
    pub fn parse(s: &str) -> Self {
        match s {
            "AppDynamics" => StateType::AppDynamics,
            "NewRelic" => StateType::NewRelic,
            "Prometheus" => StateType::Prometheus,
            "Datadog" => StateType::Datadog,
            "CloudWatch" => StateType::CloudWatch,
            "Dynatrace" => StateType::Dynatrace,
            "Stackdriver" => StateType::Stackdriver,
            "Splunk" => StateType::Splunk,
            "Elk" => StateType::Elk,
            "SumoLogic" => StateType::SumoLogic,
            "Loggly" => StateType::Loggly,
            "Shell" => StateType::Shell,
            "Http" => StateType::Http,
            "Approval" => StateType::Approval,
            "Deploy" => StateType::Deploy,
            "Rollback" => StateType::Rollback,
            _ => StateType::Other,
        }
    }
}

impl std::fmt::Display for StateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
