//! The quota ledger service.

use crate::{QuotaError, QuotaErrorKind, QuotaWindow, interaction_ceiling};
use cadence_core::{PlanTier, UserId};
use cadence_store::{InteractionStore, ProfileStore, with_write_retry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Snapshot of a user's assistant allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    /// Plan the snapshot was computed for.
    pub plan: PlanTier,
    /// Interactions still available in the current window.
    pub available: u32,
    /// Window ceiling for the plan.
    pub total: u32,
    /// Pro plans have no ceiling; `available` and `total` are saturated.
    pub unlimited: bool,
    /// Next window boundary, absent for unlimited plans.
    pub resets_at: Option<DateTime<Utc>>,
}

impl QuotaStatus {
    fn unlimited_for(plan: PlanTier) -> Self {
        Self {
            plan,
            available: u32::MAX,
            total: u32::MAX,
            unlimited: true,
            resets_at: None,
        }
    }
}

/// Computes and enforces the assistant usage allowance.
///
/// Usage is derived from the interaction log on every read; nothing is
/// cached and nothing resets explicitly. Enforcement goes through the
/// store's guarded insert so concurrent consumers cannot exceed the
/// ceiling.
#[derive(Debug, Clone)]
pub struct QuotaLedger<S> {
    store: Arc<S>,
}

impl<S> QuotaLedger<S>
where
    S: ProfileStore + InteractionStore,
{
    /// Create a ledger over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Current allowance for a user.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` if the user has no profile; store failures pass
    /// through as `Store`.
    #[instrument(skip(self))]
    pub async fn status(&self, user: UserId) -> Result<QuotaStatus, QuotaError> {
        let plan = self.plan_for(user).await?;
        self.status_at(plan, user, Utc::now()).await
    }

    /// Allowance computed against an explicit clock.
    pub async fn status_at(
        &self,
        plan: PlanTier,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<QuotaStatus, QuotaError> {
        let (window, total) = match (QuotaWindow::for_plan(plan, now), interaction_ceiling(plan)) {
            (Some(window), Some(total)) => (window, total),
            _ => return Ok(QuotaStatus::unlimited_for(plan)),
        };

        let used = self.store.used_in_window(user, window.starts_at, now).await?;
        Ok(QuotaStatus {
            plan,
            available: total.saturating_sub(used),
            total,
            unlimited: false,
            resets_at: Some(window.resets_at),
        })
    }

    /// Permit one assistant interaction of weight 1 and record it.
    #[instrument(skip(self))]
    pub async fn consume(&self, user: UserId) -> Result<QuotaStatus, QuotaError> {
        self.consume_weighted(user, 1).await
    }

    /// Permit one assistant interaction of the given weight and record it.
    ///
    /// The availability check and the log write are one guarded store
    /// operation.
    ///
    /// # Errors
    ///
    /// `Exhausted` (carrying the next reset time) once the window allowance
    /// is spent; `Unauthenticated` without a profile.
    #[instrument(skip(self))]
    pub async fn consume_weighted(
        &self,
        user: UserId,
        weight: u32,
    ) -> Result<QuotaStatus, QuotaError> {
        let plan = self.plan_for(user).await?;
        self.consume_at(plan, user, weight, Utc::now()).await
    }

    /// Consume against an explicit clock.
    pub async fn consume_at(
        &self,
        plan: PlanTier,
        user: UserId,
        weight: u32,
        now: DateTime<Utc>,
    ) -> Result<QuotaStatus, QuotaError> {
        let (window, total) = match (QuotaWindow::for_plan(plan, now), interaction_ceiling(plan)) {
            (Some(window), Some(total)) => (window, total),
            _ => {
                with_write_retry(|| self.store.record_interaction(user, weight)).await?;
                return Ok(QuotaStatus::unlimited_for(plan));
            }
        };

        let recorded = with_write_retry(|| {
            self.store.record_if_under(user, weight, window.starts_at, total)
        })
        .await?;

        if !recorded {
            return Err(QuotaError::new(QuotaErrorKind::Exhausted {
                resets_at: window.resets_at,
            }));
        }

        self.status_at(plan, user, now).await
    }

    async fn plan_for(&self, user: UserId) -> Result<PlanTier, QuotaError> {
        let profile = self
            .store
            .find_profile(user)
            .await?
            .ok_or_else(|| QuotaError::new(QuotaErrorKind::Unauthenticated))?;
        Ok(profile.plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Profile, TeamId};
    use cadence_store::InMemoryStore;
    use chrono::TimeZone;

    async fn ledger_with_plan(plan: PlanTier) -> (QuotaLedger<InMemoryStore>, UserId) {
        let store = Arc::new(InMemoryStore::new());
        let user = UserId::new();
        store
            .seed_profile(Profile {
                user_id: user,
                team_id: TeamId::new(),
                plan,
            })
            .await;
        (QuotaLedger::new(store), user)
    }

    #[tokio::test]
    async fn test_missing_profile_is_unauthenticated() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = QuotaLedger::new(store);

        let err = ledger.status(UserId::new()).await.unwrap_err();
        assert!(matches!(err.kind(), QuotaErrorKind::Unauthenticated));
    }

    #[tokio::test]
    async fn test_free_plan_reports_weekly_window() {
        let (ledger, user) = ledger_with_plan(PlanTier::Free).await;
        // 2026-03-04 is a Wednesday.
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();

        let status = ledger.status_at(PlanTier::Free, user, now).await.unwrap();
        assert_eq!(status.total, 3);
        assert_eq!(status.available, 3);
        assert!(!status.unlimited);
        assert_eq!(
            status.resets_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_consume_exhausts_and_names_reset() {
        let (ledger, user) = ledger_with_plan(PlanTier::Starter).await;
        // The in-memory store stamps interactions with the real clock, so
        // the window must be the one containing "now".
        let now = Utc::now();
        let expected_reset = crate::QuotaWindow::daily(now).resets_at;

        for _ in 0..5 {
            ledger
                .consume_at(PlanTier::Starter, user, 1, now)
                .await
                .unwrap();
        }

        let err = ledger
            .consume_at(PlanTier::Starter, user, 1, now)
            .await
            .unwrap_err();
        match err.kind() {
            QuotaErrorKind::Exhausted { resets_at } => {
                assert_eq!(*resets_at, expected_reset);
            }
            other => panic!("expected Exhausted, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_pro_plan_is_unlimited() {
        let (ledger, user) = ledger_with_plan(PlanTier::Pro).await;

        for _ in 0..50 {
            let status = ledger.consume(user).await.unwrap();
            assert!(status.unlimited);
            assert_eq!(status.available, u32::MAX);
        }
    }

    #[tokio::test]
    async fn test_weighted_interactions_count_fully() {
        let (ledger, user) = ledger_with_plan(PlanTier::Starter).await;

        ledger
            .consume_at(PlanTier::Starter, user, 3, Utc::now())
            .await
            .unwrap();
        // Re-read with a fresh clock so the just-written row falls inside
        // the queried window.
        let status = ledger
            .status_at(PlanTier::Starter, user, Utc::now())
            .await
            .unwrap();
        assert_eq!(status.available, 2);
    }
}
