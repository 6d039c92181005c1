//! Verification data domain types
//!
//! Three record kinds are produced by the analysis pipeline. They share no
//! structure beyond the retention fields exposed through [`Retained`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Retention capability shared by every verification record kind
pub trait Retained {
    fn workflow_execution_id(&self) -> Uuid;
    fn valid_until(&self) -> chrono::DateTime<chrono::Utc>;
    fn set_valid_until(&mut self, valid_until: chrono::DateTime<chrono::Utc>);
}

/// Closed set of verification record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationKind {
    TimeSeries,
    MetricAnalysis,
    LogAnalysis,
}

impl VerificationKind {
    pub const ALL: [VerificationKind; 3] = [
        VerificationKind::TimeSeries,
        VerificationKind::MetricAnalysis,
        VerificationKind::LogAnalysis,
    ];
}

impl std::fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationKind::TimeSeries => write!(f, "time-series"),
            VerificationKind::MetricAnalysis => write!(f, "metric-analysis"),
            VerificationKind::LogAnalysis => write!(f, "log-analysis"),
        }
    }
}

/// Raw metric values collected from one host for one minute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub id: Uuid,
    pub account_id: Uuid,
    pub workflow_execution_id: Uuid,
    pub state_execution_id: Uuid,
    pub host: String,
    pub metric_name: String,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    pub values: HashMap<String, f64>,
    pub valid_until: chrono::DateTime<chrono::Utc>,
}

/// ML analysis result for the time series of one analysis minute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAnalysisSummary {
    pub id: Uuid,
    pub account_id: Uuid,
    pub workflow_execution_id: Uuid,
    pub state_execution_id: Uuid,
    pub analysis_minute: i64,
    pub risk_level: i32,
    pub transaction_count: i32,
    pub message: Option<String>,
    pub valid_until: chrono::DateTime<chrono::Utc>,
}

/// Log clustering result for one analysis minute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogAnalysisSummary {
    pub id: Uuid,
    pub account_id: Uuid,
    pub workflow_execution_id: Uuid,
    pub state_execution_id: Uuid,
    pub query: String,
    pub analysis_minute: i64,
    pub score: f64,
    pub unknown_cluster_count: i32,
    pub valid_until: chrono::DateTime<chrono::Utc>,
}

macro_rules! impl_retained {
    ($($ty:ty),*) => {
        $(
            impl Retained for $ty {
                fn workflow_execution_id(&self) -> Uuid {
                    self.workflow_execution_id
                }

                fn valid_until(&self) -> chrono::DateTime<chrono::Utc> {
                    self.valid_until
                }

                fn set_valid_until(&mut self, valid_until: chrono::DateTime<chrono::Utc>) {
                    self.valid_until = valid_until;
                }
            }
        )*
    };
}

impl_retained!(TimeSeriesPoint, MetricAnalysisSummary, LogAnalysisSummary);

/// Any verification record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationRecord {
    TimeSeries(TimeSeriesPoint),
    MetricAnalysis(MetricAnalysisSummary),
    LogAnalysis(LogAnalysisSummary),
}

impl VerificationRecord {
    pub fn id(&self) -> Uuid {
        match self {
            VerificationRecord::TimeSeries(r) => r.id,
            VerificationRecord::MetricAnalysis(r) => r.id,
            VerificationRecord::LogAnalysis(r) => r.id,
        }
    }

    pub fn kind(&self) -> VerificationKind {
        match self {
            VerificationRecord::TimeSeries(_) => VerificationKind::TimeSeries,
            VerificationRecord::MetricAnalysis(_) => VerificationKind::MetricAnalysis,
            VerificationRecord::LogAnalysis(_) => VerificationKind::LogAnalysis,
        }
    }

    fn retained(&self) -> &dyn Retained {
        match self {
            VerificationRecord::TimeSeries(r) => r,
            VerificationRecord::MetricAnalysis(r) => r,
            VerificationRecord::LogAnalysis(r) => r,
        }
    }

    fn retained_mut(&mut self) -> &mut dyn Retained {
        match self {
            VerificationRecord::TimeSeries(r) => r,
            VerificationRecord::MetricAnalysis(r) => r,
            VerificationRecord::LogAnalysis(r) => r,
        }
    }
}

impl Retained for VerificationRecord {
    fn workflow_execution_id(&self) -> Uuid {
        self.retained().workflow_execution_id()
    }

    fn valid_until(&self) -> chrono::DateTime<chrono::Utc> {
        self.retained().valid_until()
    }

    fn set_valid_until(&mut self, valid_until: chrono::DateTime<chrono::Utc>) {
        self.retained_mut().set_valid_until(valid_until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_delegates_retention() {
        let execution_id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let mut record = VerificationRecord::LogAnalysis(LogAnalysisSummary {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            workflow_execution_id: execution_id,
            state_execution_id: Uuid::new_v4(),
            query: "exception".to_string(),
            analysis_minute: 3,
            score: 0.4,
            unknown_cluster_count: 2,
            valid_until: now,
        });

        assert_eq!(record.kind(), VerificationKind::LogAnalysis);
        assert_eq!(record.workflow_execution_id(), execution_id);

        let later = now + chrono::Duration::days(10);
        record.set_valid_until(later);
        assert_eq!(record.valid_until(), later);
    }

    #[test]
    fn test_record_serializes_with_kind_tag() {
        let record = VerificationRecord::MetricAnalysis(MetricAnalysisSummary {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            workflow_execution_id: Uuid::new_v4(),
            state_execution_id: Uuid::new_v4(),
            analysis_minute: 1,
            risk_level: 0,
            transaction_count: 12,
            message: None,
            valid_until: chrono::Utc::now(),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "metric_analysis");
    }
}
