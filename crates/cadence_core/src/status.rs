//! Lifecycle statuses for tracked posts and approvals.

use serde::{Deserialize, Serialize};

/// Lifecycle of one per-target publishing attempt.
///
/// `Published` and `Failed` are terminal; the external automation system is
/// the only writer that advances a row past `Scheduled`/`Publishing`.
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
pub enum PublishStatus {
    /// Created but not yet handed to any actor.
    Pending,
    /// Queued for a future `scheduled_at`.
    Scheduled,
    /// Handed off for immediate publishing.
    Publishing,
    /// Confirmed live on the platform.
    Published,
    /// Terminally failed; `error_message` explains why.
    Failed,
}

impl PublishStatus {
    /// Whether the row can still be advanced by the automation system.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PublishStatus::Published | PublishStatus::Failed)
    }
}

/// Terminal outcome reported back by the automation system for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PublishOutcome {
    /// The platform accepted the post.
    Published {
        /// Identifier assigned by the platform.
        external_post_id: String,
    },
    /// Publishing failed for good.
    Failed {
        /// Human-readable failure explanation.
        message: String,
    },
}

/// Workflow state of an approval request.
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
pub enum ApprovalStatus {
    /// Awaiting a reviewer decision.
    Pending,
    /// Accepted by a reviewer. Terminal.
    Approved,
    /// Declined by a reviewer. Terminal.
    Rejected,
}

/// The kind of entity an approval request references.
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
pub enum EntityKind {
    /// A social post.
    Post,
    /// A campaign briefing form.
    Briefing,
    /// A branding form.
    Branding,
    /// A planner/calendar entry.
    Planner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(PublishStatus::Published.is_terminal());
        assert!(PublishStatus::Failed.is_terminal());
        assert!(!PublishStatus::Scheduled.is_terminal());
        assert!(!PublishStatus::Publishing.is_terminal());
    }

    #[test]
    fn test_outcome_wire_shape() {
        let outcome = PublishOutcome::Published {
            external_post_id: "1789_442".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "published");
        assert_eq!(json["external_post_id"], "1789_442");
    }
}
