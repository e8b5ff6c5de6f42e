//! Subscription plan tiers.

use serde::{Deserialize, Serialize};

/// Subscription tier attached to a user profile.
///
/// The tier decides the assistant quota window (see `cadence_quota`) and
/// whether team collaboration features are available at all.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlanTier {
    /// No subscription. Weekly assistant window, no collaboration.
    Free,
    /// Entry subscription. Daily assistant window, collaboration included.
    Starter,
    /// Full subscription. Unlimited assistant usage, collaboration included.
    Pro,
}

impl PlanTier {
    /// Whether approval workflows and team features are included in the plan.
    pub fn collaborative(&self) -> bool {
        matches!(self, PlanTier::Starter | PlanTier::Pro)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_trip_through_text() {
        for tier in [PlanTier::Free, PlanTier::Starter, PlanTier::Pro] {
            let text = tier.to_string();
            assert_eq!(PlanTier::from_str(&text).unwrap(), tier);
        }
    }

    #[test]
    fn test_collaboration_gate() {
        assert!(!PlanTier::Free.collaborative());
        assert!(PlanTier::Starter.collaborative());
        assert!(PlanTier::Pro.collaborative());
    }
}
