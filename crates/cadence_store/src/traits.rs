//! Repository traits the domain services are generic over.
//!
//! Implementations: [`crate::InMemoryStore`] for tests and `PgStore` in
//! `cadence_database` for production.

use async_trait::async_trait;
use cadence_core::{
    AccountId, ApprovalId, ApprovalRequest, ApprovalStatus, AssistantInteraction, ContentItem,
    NewTrackedPost, PostId, Profile, Provider, PublishOutcome, PublishTarget, SocialAccount,
    TeamId, TeamMember, TrackedPost, TrackingId, UserId,
};
use cadence_error::StoreResult;
use chrono::{DateTime, Utc};

/// Profile reads.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the profile for a user, if one exists.
    async fn find_profile(&self, user: UserId) -> StoreResult<Option<Profile>>;
}

/// Content item reads.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a content item only if `owner` owns it.
    ///
    /// Returns `None` both for a missing item and for an item owned by
    /// someone else, so callers cannot distinguish the two.
    async fn find_owned(&self, post: PostId, owner: UserId) -> StoreResult<Option<ContentItem>>;
}

/// Connected social accounts and publish targets.
#[async_trait]
pub trait SocialAccountStore: Send + Sync {
    /// Accounts of `user` on any of the given providers.
    async fn accounts_for(
        &self,
        user: UserId,
        providers: &[Provider],
    ) -> StoreResult<Vec<SocialAccount>>;

    /// Insert or refresh an account keyed by `(user, provider, account_id)`.
    async fn upsert_account(&self, account: SocialAccount) -> StoreResult<()>;

    /// Insert or refresh a publish target discovered for `user`.
    async fn upsert_target(
        &self,
        user: UserId,
        target: PublishTarget,
        display_name: &str,
    ) -> StoreResult<()>;

    /// All publish targets discovered for `user`.
    async fn targets_for(&self, user: UserId) -> StoreResult<Vec<PublishTarget>>;

    /// Flag an account whose token failed a health check.
    async fn mark_needs_reconnect(
        &self,
        user: UserId,
        provider: Provider,
        account: &AccountId,
    ) -> StoreResult<()>;
}

/// Per-target tracking rows.
#[async_trait]
pub trait TrackedPostStore: Send + Sync {
    /// Insert a batch of tracking rows, returning them in insertion order.
    ///
    /// The batch is written atomically: either every row exists afterwards
    /// or none does.
    async fn insert_batch(&self, rows: Vec<NewTrackedPost>) -> StoreResult<Vec<TrackedPost>>;

    /// Mark the given rows failed with an explanatory message.
    async fn mark_failed(&self, ids: &[TrackingId], message: &str) -> StoreResult<()>;

    /// Advance one row to its terminal state (automation write-back).
    async fn record_outcome(&self, id: TrackingId, outcome: PublishOutcome) -> StoreResult<()>;

    /// All tracking rows for one content item, newest first.
    async fn posts_for(&self, post: PostId) -> StoreResult<Vec<TrackedPost>>;
}

/// Approval request records.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Persist a new request.
    async fn insert_approval(&self, request: ApprovalRequest) -> StoreResult<ApprovalRequest>;

    /// Load a request by id.
    async fn find_approval(&self, id: ApprovalId) -> StoreResult<Option<ApprovalRequest>>;

    /// Apply a decision iff the record is still pending.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record with `id` exists
    /// - `Conflict` if the record exists but is no longer pending
    async fn decide_if_pending(
        &self,
        id: ApprovalId,
        status: ApprovalStatus,
        decided_by: UserId,
        comment: Option<String>,
    ) -> StoreResult<ApprovalRequest>;

    /// Team-scoped requests in the given status, newest first.
    async fn list_by_status(
        &self,
        team: TeamId,
        status: ApprovalStatus,
    ) -> StoreResult<Vec<ApprovalRequest>>;

    /// Pending requests assigned to a reviewer, newest first.
    async fn pending_for_reviewer(&self, reviewer: UserId) -> StoreResult<Vec<ApprovalRequest>>;
}

/// Assistant interaction log.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Sum of interaction weights for `user` with timestamps in `[from, to]`.
    async fn used_in_window(
        &self,
        user: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<u32>;

    /// Record an interaction unconditionally (unlimited plans).
    async fn record_interaction(&self, user: UserId, weight: u32) -> StoreResult<()>;

    /// Record an interaction iff usage since `from` is still under `ceiling`.
    ///
    /// The count and the insert happen in one store operation so concurrent
    /// consumers cannot both slip under the ceiling. Returns whether the
    /// interaction was recorded.
    async fn record_if_under(
        &self,
        user: UserId,
        weight: u32,
        from: DateTime<Utc>,
        ceiling: u32,
    ) -> StoreResult<bool>;

    /// Interactions for `user`, newest first. Diagnostic read.
    async fn interactions_for(&self, user: UserId) -> StoreResult<Vec<AssistantInteraction>>;
}

/// Team membership reads.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// All members of a team.
    async fn team_members(&self, team: TeamId) -> StoreResult<Vec<TeamMember>>;

    /// Members whose role is eligible to review (administrator or editor).
    async fn eligible_reviewers(&self, team: TeamId) -> StoreResult<Vec<TeamMember>> {
        let members = self.team_members(team).await?;
        Ok(members.into_iter().filter(|m| m.role.can_review()).collect())
    }
}

/// Single-use nonces backing the signed OAuth `state` parameter.
#[async_trait]
pub trait OauthStateStore: Send + Sync {
    /// Store a freshly issued nonce.
    async fn issue_nonce(&self, nonce: &str) -> StoreResult<()>;

    /// Consume a nonce. Returns `true` iff it existed and had not been
    /// consumed before; a second call for the same nonce returns `false`.
    async fn consume_nonce(&self, nonce: &str) -> StoreResult<bool>;
}

/// Privileged entitlement check, backed by a server-side function.
#[async_trait]
pub trait EntitlementChecker: Send + Sync {
    /// Whether the user's plan includes team collaboration features.
    async fn collaborating_plan(&self, user: UserId) -> StoreResult<bool>;
}
