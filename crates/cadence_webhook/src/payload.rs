//! Wire payloads for the automation endpoints.
//!
//! The publish dispatch uses camelCase keys, the event payload snake_case;
//! both shapes are consumed by existing automation flows and must not
//! drift.

use cadence_core::{
    AccountId, ApprovalStatus, EntityKind, PostId, Provider, TargetId, TeamId, TrackingId, UserId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Routing info for one created tracking row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchTarget {
    /// Tracking row id the automation system writes status back to.
    pub id: TrackingId,
    /// Platform of the destination.
    pub provider: Provider,
    /// Platform account that owns the destination.
    pub account_id: AccountId,
    /// Destination identifier.
    pub target_id: TargetId,
}

/// Publish fan-out notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishDispatch {
    /// Owning content item.
    pub post_id: PostId,
    /// Scheduling user.
    pub user_id: UserId,
    /// One entry per tracking row created in the batch.
    pub social_posts: Vec<DispatchTarget>,
}

/// Event kinds sent to the team/approval notification endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AutomationEvent {
    /// An entity was submitted for review.
    ApprovalRequested,
    /// A pending request was approved or rejected.
    ApprovalDecided,
    /// A member was invited to a team.
    MemberInvited,
}

/// Team or approval event notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEvent {
    /// What happened.
    pub event: AutomationEvent,
    /// Kind of the referenced entity.
    pub entity_type: EntityKind,
    /// Referenced entity.
    pub entity_id: Uuid,
    /// Team scope.
    pub team_id: TeamId,
    /// Acting user, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<UserId>,
    /// New approval status for decision events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApprovalStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_dispatch_uses_camel_case() {
        let dispatch = PublishDispatch {
            post_id: PostId::new(),
            user_id: UserId::new(),
            social_posts: vec![DispatchTarget {
                id: TrackingId::new(),
                provider: Provider::Instagram,
                account_id: AccountId::from("page-9"),
                target_id: TargetId::from("ig-9"),
            }],
        };

        let json = serde_json::to_value(&dispatch).unwrap();
        assert!(json.get("postId").is_some());
        assert!(json.get("userId").is_some());
        let posts = json["socialPosts"].as_array().unwrap();
        assert_eq!(posts[0]["provider"], "instagram");
        assert!(posts[0].get("accountId").is_some());
        assert!(posts[0].get("targetId").is_some());
    }

    #[test]
    fn test_team_event_uses_snake_case() {
        let event = TeamEvent {
            event: AutomationEvent::ApprovalRequested,
            entity_type: EntityKind::Briefing,
            entity_id: Uuid::new_v4(),
            team_id: TeamId::new(),
            actor: None,
            status: None,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "approval_requested");
        assert_eq!(json["entity_type"], "briefing");
        assert!(json.get("actor").is_none());
    }
}
