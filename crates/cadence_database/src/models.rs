//! Diesel row models and their conversions to domain types.

use cadence_core::{
    AccountId, ApprovalId, ApprovalRequest, ApprovalStatus, AssistantInteraction, ContentItem,
    EntityKind, NewTrackedPost, PlanTier, PostId, Profile, Provider, PublishStatus, PublishTarget,
    SocialAccount, TargetId, TeamId, TeamMember, TeamRole, TrackedPost, TrackingId, UserId,
};
use cadence_error::{StoreError, StoreErrorKind};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;
use uuid::Uuid;

/// Parse a text column into one of the string-typed domain enums.
fn parse_enum<T: FromStr>(value: &str, column: &str) -> Result<T, StoreError> {
    T::from_str(value).map_err(|_| {
        StoreError::new(StoreErrorKind::Query(format!(
            "invalid {column} value: {value}"
        )))
    })
}

fn pack_text_array(values: &[String]) -> Vec<Option<String>> {
    values.iter().cloned().map(Some).collect()
}

fn unpack_text_array(values: Vec<Option<String>>) -> Vec<String> {
    values.into_iter().flatten().collect()
}

/// Database row for the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    /// Owning user
    pub user_id: Uuid,
    /// Team the user belongs to
    pub team_id: Uuid,
    /// Plan tier as text
    pub plan: String,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            user_id: UserId::from(row.user_id),
            team_id: TeamId::from(row.team_id),
            plan: parse_enum::<PlanTier>(&row.plan, "plan")?,
        })
    }
}

/// Database row for the content_items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::content_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContentItemRow {
    /// Item identifier
    pub id: Uuid,
    /// Composing user
    pub owner_id: Uuid,
    /// Post body text
    pub body: String,
    /// Attached media in display order
    pub media_urls: Vec<Option<String>>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<ContentItemRow> for ContentItem {
    fn from(row: ContentItemRow) -> Self {
        ContentItem {
            id: PostId::from(row.id),
            owner: UserId::from(row.owner_id),
            body: row.body,
            media_urls: unpack_text_array(row.media_urls),
            created_at: row.created_at,
        }
    }
}

/// Database row for the social_accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::social_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SocialAccountRow {
    /// Surrogate key
    pub id: i32,
    /// Connecting user
    pub user_id: Uuid,
    /// Provider as text
    pub provider: String,
    /// Platform-assigned account id
    pub account_id: String,
    /// Display name reported at discovery
    pub display_name: Option<String>,
    /// Current access token
    pub access_token: String,
    /// Token expiry when reported
    pub expires_at: Option<DateTime<Utc>>,
    /// Health flag set by failed token checks
    pub needs_reconnect: bool,
    /// Scopes granted to the token
    pub scopes: Vec<Option<String>>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last upsert timestamp
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SocialAccountRow> for SocialAccount {
    type Error = StoreError;

    fn try_from(row: SocialAccountRow) -> Result<Self, Self::Error> {
        Ok(SocialAccount {
            user_id: UserId::from(row.user_id),
            provider: parse_enum::<Provider>(&row.provider, "provider")?,
            account_id: AccountId::from(row.account_id),
            display_name: row.display_name,
            access_token: row.access_token,
            expires_at: row.expires_at,
            needs_reconnect: row.needs_reconnect,
            scopes: unpack_text_array(row.scopes),
        })
    }
}

/// Insertable struct for the social_accounts table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::social_accounts)]
pub struct NewSocialAccountRow {
    /// Connecting user
    pub user_id: Uuid,
    /// Provider as text
    pub provider: String,
    /// Platform-assigned account id
    pub account_id: String,
    /// Display name reported at discovery
    pub display_name: Option<String>,
    /// Current access token
    pub access_token: String,
    /// Token expiry when reported
    pub expires_at: Option<DateTime<Utc>>,
    /// Health flag
    pub needs_reconnect: bool,
    /// Scopes granted to the token
    pub scopes: Vec<Option<String>>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last upsert timestamp
    pub updated_at: DateTime<Utc>,
}

impl NewSocialAccountRow {
    /// Build an insertable row from a domain account.
    pub fn from_account(account: &SocialAccount, now: DateTime<Utc>) -> Self {
        Self {
            user_id: *account.user_id.as_uuid(),
            provider: account.provider.to_string(),
            account_id: account.account_id.as_str().to_string(),
            display_name: account.display_name.clone(),
            access_token: account.access_token.clone(),
            expires_at: account.expires_at,
            needs_reconnect: account.needs_reconnect,
            scopes: pack_text_array(&account.scopes),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Database row for the social_targets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::social_targets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SocialTargetRow {
    /// Surrogate key
    pub id: i32,
    /// Owning user
    pub user_id: Uuid,
    /// Provider as text
    pub provider: String,
    /// Platform account that owns the destination
    pub account_id: String,
    /// Destination identifier
    pub target_id: String,
    /// Display name
    pub display_name: String,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SocialTargetRow> for PublishTarget {
    type Error = StoreError;

    fn try_from(row: SocialTargetRow) -> Result<Self, Self::Error> {
        Ok(PublishTarget {
            provider: parse_enum::<Provider>(&row.provider, "provider")?,
            account_id: AccountId::from(row.account_id),
            target_id: TargetId::from(row.target_id),
        })
    }
}

/// Insertable struct for the social_targets table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::social_targets)]
pub struct NewSocialTargetRow {
    /// Owning user
    pub user_id: Uuid,
    /// Provider as text
    pub provider: String,
    /// Platform account that owns the destination
    pub account_id: String,
    /// Destination identifier
    pub target_id: String,
    /// Display name
    pub display_name: String,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Database row for the tracked_posts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tracked_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TrackedPostRow {
    /// Row identifier
    pub id: Uuid,
    /// Owning content item
    pub post_id: Uuid,
    /// Provider as text
    pub provider: String,
    /// Platform account that owns the destination
    pub account_id: String,
    /// Destination identifier
    pub target_id: String,
    /// Lifecycle status as text
    pub status: String,
    /// When the post should go live
    pub scheduled_at: DateTime<Utc>,
    /// Body text copied at schedule time
    pub content_text: String,
    /// First media URL, if any
    pub media_url: Option<String>,
    /// Failure explanation
    pub error_message: Option<String>,
    /// Platform-assigned post id
    pub external_post_id: Option<String>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TrackedPostRow> for TrackedPost {
    type Error = StoreError;

    fn try_from(row: TrackedPostRow) -> Result<Self, Self::Error> {
        Ok(TrackedPost {
            id: TrackingId::from(row.id),
            post_id: PostId::from(row.post_id),
            provider: parse_enum::<Provider>(&row.provider, "provider")?,
            account_id: AccountId::from(row.account_id),
            target_id: TargetId::from(row.target_id),
            status: parse_enum::<PublishStatus>(&row.status, "status")?,
            scheduled_at: row.scheduled_at,
            content_text: row.content_text,
            media_url: row.media_url,
            error_message: row.error_message,
            external_post_id: row.external_post_id,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for the tracked_posts table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::tracked_posts)]
pub struct NewTrackedPostRow {
    /// Row identifier, minted by the caller
    pub id: Uuid,
    /// Owning content item
    pub post_id: Uuid,
    /// Provider as text
    pub provider: String,
    /// Platform account that owns the destination
    pub account_id: String,
    /// Destination identifier
    pub target_id: String,
    /// Initial lifecycle status
    pub status: String,
    /// When the post should go live
    pub scheduled_at: DateTime<Utc>,
    /// Body text copied at schedule time
    pub content_text: String,
    /// First media URL, if any
    pub media_url: Option<String>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

impl NewTrackedPostRow {
    /// Build an insertable row from a domain insert, minting the id.
    pub fn from_new(row: &NewTrackedPost, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id: *row.post_id.as_uuid(),
            provider: row.provider.to_string(),
            account_id: row.account_id.as_str().to_string(),
            target_id: row.target_id.as_str().to_string(),
            status: row.status.to_string(),
            scheduled_at: row.scheduled_at,
            content_text: row.content_text.clone(),
            media_url: row.media_url.clone(),
            created_at: now,
        }
    }
}

/// Database row for the approval_requests table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::approval_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApprovalRow {
    /// Record identifier
    pub id: Uuid,
    /// Team scope
    pub team_id: Uuid,
    /// Entity kind as text
    pub entity_kind: String,
    /// Referenced entity
    pub entity_id: Uuid,
    /// Workflow state as text
    pub status: String,
    /// Requesting user
    pub requested_by: Uuid,
    /// Assigned reviewer
    pub assigned_to: Uuid,
    /// Reviewer comment
    pub comment: Option<String>,
    /// Deciding reviewer
    pub decided_by: Option<Uuid>,
    /// Decision timestamp
    pub decided_at: Option<DateTime<Utc>>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ApprovalRow> for ApprovalRequest {
    type Error = StoreError;

    fn try_from(row: ApprovalRow) -> Result<Self, Self::Error> {
        Ok(ApprovalRequest {
            id: ApprovalId::from(row.id),
            team_id: TeamId::from(row.team_id),
            entity_kind: parse_enum::<EntityKind>(&row.entity_kind, "entity_kind")?,
            entity_id: row.entity_id,
            status: parse_enum::<ApprovalStatus>(&row.status, "status")?,
            requested_by: UserId::from(row.requested_by),
            assigned_to: UserId::from(row.assigned_to),
            comment: row.comment,
            decided_by: row.decided_by.map(UserId::from),
            decided_at: row.decided_at,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for the approval_requests table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::approval_requests)]
pub struct NewApprovalRow {
    /// Record identifier
    pub id: Uuid,
    /// Team scope
    pub team_id: Uuid,
    /// Entity kind as text
    pub entity_kind: String,
    /// Referenced entity
    pub entity_id: Uuid,
    /// Workflow state as text
    pub status: String,
    /// Requesting user
    pub requested_by: Uuid,
    /// Assigned reviewer
    pub assigned_to: Uuid,
    /// Reviewer comment
    pub comment: Option<String>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<&ApprovalRequest> for NewApprovalRow {
    fn from(request: &ApprovalRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            team_id: *request.team_id.as_uuid(),
            entity_kind: request.entity_kind.to_string(),
            entity_id: request.entity_id,
            status: request.status.to_string(),
            requested_by: *request.requested_by.as_uuid(),
            assigned_to: *request.assigned_to.as_uuid(),
            comment: request.comment.clone(),
            created_at: request.created_at,
        }
    }
}

/// Database row for the assistant_interactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::assistant_interactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InteractionRow {
    /// Log row identifier
    pub id: Uuid,
    /// User who asked
    pub user_id: Uuid,
    /// Declared interaction weight
    pub credits_used: i32,
    /// When the interaction happened
    pub created_at: DateTime<Utc>,
}

impl From<InteractionRow> for AssistantInteraction {
    fn from(row: InteractionRow) -> Self {
        AssistantInteraction {
            id: row.id,
            user_id: UserId::from(row.user_id),
            credits_used: row.credits_used.max(0) as u32,
            created_at: row.created_at,
        }
    }
}

/// Database row for the team_members table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::team_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamMemberRow {
    /// Surrogate key
    pub id: i32,
    /// Team
    pub team_id: Uuid,
    /// Member
    pub user_id: Uuid,
    /// Role as text
    pub role: String,
}

impl TryFrom<TeamMemberRow> for TeamMember {
    type Error = StoreError;

    fn try_from(row: TeamMemberRow) -> Result<Self, Self::Error> {
        Ok(TeamMember {
            team_id: TeamId::from(row.team_id),
            user_id: UserId::from(row.user_id),
            role: parse_enum::<TeamRole>(&row.role, "role")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enum_rejects_unknown_values() {
        let err = parse_enum::<Provider>("myspace", "provider").unwrap_err();
        assert!(matches!(err.kind(), StoreErrorKind::Query(_)));
    }

    #[test]
    fn test_text_array_round_trip() {
        let scopes = vec!["pages_manage_posts".to_string(), "pages_show_list".to_string()];
        assert_eq!(unpack_text_array(pack_text_array(&scopes)), scopes);
    }
}
