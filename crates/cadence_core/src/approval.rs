//! Approval requests.

use crate::{ApprovalId, ApprovalStatus, EntityKind, TeamId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One reviewable unit moving through the approval workflow.
///
/// Created in `Pending`; the only modeled transitions are
/// `Pending -> Approved` and `Pending -> Rejected`. Never deleted in the
/// normal flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Record identifier.
    pub id: ApprovalId,
    /// Team the request is scoped to.
    pub team_id: TeamId,
    /// Kind of the referenced entity.
    pub entity_kind: EntityKind,
    /// Referenced entity (not owned by this record).
    pub entity_id: Uuid,
    /// Workflow state.
    pub status: ApprovalStatus,
    /// User who submitted the entity for review.
    pub requested_by: UserId,
    /// Reviewer the request was assigned to.
    pub assigned_to: UserId,
    /// Reviewer comment; by UI convention present on rejections.
    pub comment: Option<String>,
    /// Reviewer who decided, once decided.
    pub decided_by: Option<UserId>,
    /// Decision timestamp, once decided.
    pub decided_at: Option<DateTime<Utc>>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ApprovalRequest {
    /// Open a new pending request.
    pub fn pending(
        team_id: TeamId,
        entity_kind: EntityKind,
        entity_id: Uuid,
        requested_by: UserId,
        assigned_to: UserId,
    ) -> Self {
        Self {
            id: ApprovalId::new(),
            team_id,
            entity_kind,
            entity_id,
            status: ApprovalStatus::Pending,
            requested_by,
            assigned_to,
            comment: None,
            decided_by: None,
            decided_at: None,
            created_at: Utc::now(),
        }
    }
}

/// A reviewer's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    /// Accept the entity.
    Approve,
    /// Decline the entity.
    Reject,
}

impl Decision {
    /// The terminal status this decision moves the record to.
    pub fn target_status(&self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}
