//! Window boundary behavior of the quota ledger.

use cadence::{InMemoryStore, PlanTier, Profile, QuotaLedger, TeamId, UserId};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

async fn seeded_ledger(plan: PlanTier) -> (QuotaLedger<InMemoryStore>, Arc<InMemoryStore>, UserId) {
    let store = Arc::new(InMemoryStore::new());
    let user = UserId::new();
    store
        .seed_profile(Profile {
            user_id: user,
            team_id: TeamId::new(),
            plan,
        })
        .await;
    (QuotaLedger::new(store.clone()), store, user)
}

#[tokio::test]
async fn test_weekly_allowance_resets_at_monday_boundary() {
    let (ledger, store, user) = seeded_ledger(PlanTier::Free).await;

    // Three interactions on Wednesday 2026-03-04 exhaust the free plan.
    let wednesday = Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap();
    for offset in 0..3 {
        store
            .seed_interaction_at(user, 1, wednesday + chrono::Duration::minutes(offset))
            .await;
    }

    let exhausted = ledger
        .status_at(PlanTier::Free, user, wednesday + chrono::Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(exhausted.available, 0);
    assert_eq!(exhausted.total, 3);
    assert_eq!(
        exhausted.resets_at,
        Some(Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap())
    );

    // Still exhausted one minute before the boundary.
    let sunday_night = Utc.with_ymd_and_hms(2026, 3, 8, 23, 59, 0).unwrap();
    let still_exhausted = ledger
        .status_at(PlanTier::Free, user, sunday_night)
        .await
        .unwrap();
    assert_eq!(still_exhausted.available, 0);

    // At Monday 00:00 the full allowance is back, regardless of how much
    // was used before the boundary.
    let monday = Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap();
    let fresh = ledger.status_at(PlanTier::Free, user, monday).await.unwrap();
    assert_eq!(fresh.available, 3);
    assert_eq!(
        fresh.resets_at,
        Some(Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_daily_allowance_resets_at_midnight() {
    let (ledger, store, user) = seeded_ledger(PlanTier::Starter).await;

    let afternoon = Utc.with_ymd_and_hms(2026, 3, 4, 16, 0, 0).unwrap();
    for _ in 0..5 {
        store.seed_interaction_at(user, 1, afternoon).await;
    }

    let exhausted = ledger
        .status_at(PlanTier::Starter, user, afternoon)
        .await
        .unwrap();
    assert_eq!(exhausted.available, 0);

    let next_morning = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
    let fresh = ledger
        .status_at(PlanTier::Starter, user, next_morning)
        .await
        .unwrap();
    assert_eq!(fresh.available, 5);
}

#[tokio::test]
async fn test_pro_plan_ignores_logged_usage() {
    let (ledger, store, user) = seeded_ledger(PlanTier::Pro).await;

    let now = Utc::now();
    for _ in 0..100 {
        store.seed_interaction_at(user, 1, now).await;
    }

    let status = ledger.status(user).await.unwrap();
    assert!(status.unlimited);
    assert_eq!(status.available, u32::MAX);
    assert_eq!(status.resets_at, None);

    // Consumption always succeeds.
    let after = ledger.consume(user).await.unwrap();
    assert!(after.unlimited);
}
