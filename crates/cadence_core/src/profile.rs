//! User profiles.

use crate::{PlanTier, TeamId, UserId};
use serde::{Deserialize, Serialize};

/// An authenticated user's profile.
///
/// Every component resolves the acting user to a profile before doing
/// anything else; a missing profile is the `Unauthenticated` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owning user.
    pub user_id: UserId,
    /// Team the user belongs to.
    pub team_id: TeamId,
    /// Subscription tier.
    pub plan: PlanTier,
}
