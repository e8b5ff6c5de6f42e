//! Quota window computation.

use cadence_core::PlanTier;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// A usage-counting window with its reset boundary.
///
/// Windows are anchored to the calendar, not to account creation: a free
/// plan's window always starts on Monday 00:00, a starter plan's at
/// midnight, regardless of when the user signed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaWindow {
    /// Inclusive start of the counting window.
    pub starts_at: DateTime<Utc>,
    /// Boundary at which usage stops counting against this window.
    pub resets_at: DateTime<Utc>,
}

impl QuotaWindow {
    /// Weekly window containing `now`: Monday 00:00 through the next
    /// Monday 00:00.
    pub fn weekly(now: DateTime<Utc>) -> Self {
        let days_since_monday = now.weekday().num_days_from_monday() as i64;
        let start_day = now.date_naive() - Duration::days(days_since_monday);
        let starts_at = start_day.and_time(NaiveTime::MIN).and_utc();
        Self {
            starts_at,
            resets_at: starts_at + Duration::days(7),
        }
    }

    /// Daily window containing `now`: midnight through the next midnight.
    pub fn daily(now: DateTime<Utc>) -> Self {
        let starts_at = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        Self {
            starts_at,
            resets_at: starts_at + Duration::days(1),
        }
    }

    /// The window a plan counts usage over, `None` for unlimited plans.
    pub fn for_plan(plan: PlanTier, now: DateTime<Utc>) -> Option<Self> {
        match plan {
            PlanTier::Free => Some(Self::weekly(now)),
            PlanTier::Starter => Some(Self::daily(now)),
            PlanTier::Pro => None,
        }
    }
}

/// Interaction ceiling for a plan within its window, `None` for unlimited.
pub fn interaction_ceiling(plan: PlanTier) -> Option<u32> {
    match plan {
        PlanTier::Free => Some(3),
        PlanTier::Starter => Some(5),
        PlanTier::Pro => None,
    }
}

/// Human-readable time remaining until the window resets.
///
/// Display only; never used for control flow.
pub fn time_until_reset(window: &QuotaWindow, now: DateTime<Utc>) -> String {
    let minutes = (window.resets_at - now).num_minutes().max(0);
    let days = minutes / (60 * 24);
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}
