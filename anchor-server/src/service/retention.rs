//! Retention Extender
//!
//! Verification data is garbage collected by an external sweep once
//! `valid_until` passes. Baseline data gets a far-future expiry so it stays
//! available for comparison; releasing a baseline restores the standard
//! horizon of each record kind.

use std::sync::Arc;

use anchor_core::domain::verification::VerificationKind;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::repository::{RepositoryError, VerificationDataRepository};

/// Expiry horizons, measured from the moment a record is touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Horizon while the data belongs to a baseline
    pub baseline: Duration,
    pub time_series: Duration,
    pub metric_analysis: Duration,
    pub log_analysis: Duration,
}

impl RetentionPolicy {
    /// Standard horizon for a record kind
    pub fn standard(&self, kind: VerificationKind) -> Duration {
        match kind {
            VerificationKind::TimeSeries => self.time_series,
            VerificationKind::MetricAnalysis => self.metric_analysis,
            VerificationKind::LogAnalysis => self.log_analysis,
        }
    }

    pub fn valid_until(&self, kind: VerificationKind, mark: bool, now: DateTime<Utc>) -> DateTime<Utc> {
        let horizon = if mark { self.baseline } else { self.standard(kind) };
        now.checked_add_signed(horizon)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// The baseline horizon must outlast every standard horizon
    pub fn validate(&self) -> anyhow::Result<()> {
        for kind in VerificationKind::ALL {
            let standard = self.standard(kind);
            if standard <= Duration::zero() {
                anyhow::bail!("{} retention must be positive", kind);
            }
            if self.baseline <= standard {
                anyhow::bail!(
                    "baseline retention must be longer than {} retention",
                    kind
                );
            }
        }
        Ok(())
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            baseline: Duration::days(365_000),
            time_series: Duration::days(30),
            metric_analysis: Duration::days(30),
            log_analysis: Duration::days(30),
        }
    }
}

#[derive(Clone)]
pub struct RetentionExtender {
    verification: Arc<dyn VerificationDataRepository>,
    policy: RetentionPolicy,
}

impl RetentionExtender {
    pub fn new(verification: Arc<dyn VerificationDataRepository>, policy: RetentionPolicy) -> Self {
        Self {
            verification,
            policy,
        }
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Extends (`mark`) or reverts the expiry of every verification record
    /// belonging to `workflow_execution_ids`
    ///
    /// Every kind is attempted; the first failure is returned after the rest
    /// have been tried. Returns the number of records updated.
    pub async fn extend_retention(
        &self,
        workflow_execution_ids: &[Uuid],
        mark: bool,
    ) -> Result<u64, RepositoryError> {
        if workflow_execution_ids.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut updated = 0;
        let mut first_error = None;

        for kind in VerificationKind::ALL {
            let valid_until = self.policy.valid_until(kind, mark, now);
            match self
                .verification
                .update_valid_until(kind, workflow_execution_ids, valid_until)
                .await
            {
                Ok(count) => {
                    tracing::debug!(
                        "Set valid_until={} on {} {} records",
                        valid_until,
                        count,
                        kind
                    );
                    updated += count;
                }
                Err(e) => {
                    tracing::warn!("Failed to update {} retention: {}", kind, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(updated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::Fixture;
    use anchor_core::domain::verification::Retained;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(RetentionPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_policy_rejects_short_baseline() {
        let policy = RetentionPolicy {
            baseline: Duration::days(7),
            ..RetentionPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_valid_until_saturates() {
        let policy = RetentionPolicy {
            baseline: Duration::MAX,
            ..RetentionPolicy::default()
        };
        let until = policy.valid_until(VerificationKind::TimeSeries, true, Utc::now());
        assert_eq!(until, DateTime::<Utc>::MAX_UTC);
    }

    #[tokio::test]
    async fn test_extend_then_revert() {
        let fixture = Fixture::new();
        let execution = fixture.workflow_execution(None).await;
        let before = fixture.seed_verification(execution.id).await;
        let extender = fixture.retention();

        let updated = extender.extend_retention(&[execution.id], true).await.unwrap();
        assert_eq!(updated, 3);

        let extended = fixture.verification(execution.id).await;
        assert_eq!(extended.len(), 3);
        for record in &extended {
            let original = before.iter().find(|r| r.id() == record.id()).unwrap();
            assert!(record.valid_until() > original.valid_until());
        }

        extender.extend_retention(&[execution.id], false).await.unwrap();

        for record in fixture.verification(execution.id).await {
            let extended = extended.iter().find(|r| r.id() == record.id()).unwrap();
            assert!(record.valid_until() < extended.valid_until());
            assert!(record.valid_until() <= Utc::now() + Duration::days(31));
        }
    }

    #[tokio::test]
    async fn test_other_executions_untouched() {
        let fixture = Fixture::new();
        let baseline = fixture.workflow_execution(None).await;
        let other = fixture.workflow_execution(None).await;
        fixture.seed_verification(baseline.id).await;
        let before = fixture.seed_verification(other.id).await;

        fixture
            .retention()
            .extend_retention(&[baseline.id], true)
            .await
            .unwrap();

        assert_eq!(fixture.verification(other.id).await.len(), before.len());
        for record in fixture.verification(other.id).await {
            let original = before.iter().find(|r| r.id() == record.id()).unwrap();
            assert_eq!(record.valid_until(), original.valid_until());
        }
    }
}
