//! Team membership.

use crate::{TeamId, UserId};
use serde::{Deserialize, Serialize};

/// Role of a member within a team.
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
pub enum TeamRole {
    /// Full control, can review.
    Administrator,
    /// Can edit and review.
    Editor,
    /// Read-only member.
    Viewer,
}

impl TeamRole {
    /// Whether this role is eligible to review approval requests.
    pub fn can_review(&self) -> bool {
        matches!(self, TeamRole::Administrator | TeamRole::Editor)
    }
}

/// One membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Team.
    pub team_id: TeamId,
    /// Member.
    pub user_id: UserId,
    /// Role within the team.
    pub role: TeamRole,
}
