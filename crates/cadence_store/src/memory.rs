//! In-memory implementation of the repository traits for testing.
//!
//! A single `RwLock` protects all tables, which also makes the guarded
//! operations (`record_if_under`, `decide_if_pending`, batch inserts)
//! genuinely atomic. All data is lost when the store is dropped.

use crate::{
    ApprovalStore, ContentStore, EntitlementChecker, InteractionStore, OauthStateStore,
    ProfileStore, SocialAccountStore, TeamStore, TrackedPostStore,
};
use async_trait::async_trait;
use cadence_core::{
    AccountId, ApprovalId, ApprovalRequest, ApprovalStatus, AssistantInteraction, ContentItem,
    NewTrackedPost, PostId, Profile, Provider, PublishOutcome, PublishStatus, PublishTarget,
    SocialAccount, TeamId, TeamMember, TrackedPost, TrackingId, UserId,
};
use cadence_error::{StoreError, StoreErrorKind, StoreResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store implementing every repository trait.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    profiles: HashMap<UserId, Profile>,
    content: HashMap<PostId, ContentItem>,
    accounts: Vec<SocialAccount>,
    targets: Vec<StoredTarget>,
    tracked: Vec<TrackedPost>,
    approvals: HashMap<ApprovalId, ApprovalRequest>,
    interactions: Vec<AssistantInteraction>,
    members: Vec<TeamMember>,
    nonces: HashMap<String, bool>,
}

#[derive(Debug, Clone)]
struct StoredTarget {
    user_id: UserId,
    target: PublishTarget,
    display_name: String,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile.
    pub async fn seed_profile(&self, profile: Profile) {
        self.inner
            .write()
            .await
            .profiles
            .insert(profile.user_id, profile);
    }

    /// Seed a content item.
    pub async fn seed_content(&self, item: ContentItem) {
        self.inner.write().await.content.insert(item.id, item);
    }

    /// Seed a team membership row.
    pub async fn seed_team_member(&self, member: TeamMember) {
        self.inner.write().await.members.push(member);
    }

    /// Seed an assistant interaction with an explicit timestamp.
    pub async fn seed_interaction_at(&self, user: UserId, weight: u32, at: DateTime<Utc>) {
        self.inner
            .write()
            .await
            .interactions
            .push(AssistantInteraction {
                id: uuid::Uuid::new_v4(),
                user_id: user,
                credits_used: weight,
                created_at: at,
            });
    }

    /// Number of tracking rows (for testing).
    pub async fn tracked_len(&self) -> usize {
        self.inner.read().await.tracked.len()
    }

    /// Drop all data (for testing).
    pub async fn clear(&self) {
        let mut state = self.inner.write().await;
        *state = State::default();
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn find_profile(&self, user: UserId) -> StoreResult<Option<Profile>> {
        Ok(self.inner.read().await.profiles.get(&user).copied())
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn find_owned(&self, post: PostId, owner: UserId) -> StoreResult<Option<ContentItem>> {
        Ok(self
            .inner
            .read()
            .await
            .content
            .get(&post)
            .filter(|item| item.owner == owner)
            .cloned())
    }
}

#[async_trait]
impl SocialAccountStore for InMemoryStore {
    async fn accounts_for(
        &self,
        user: UserId,
        providers: &[Provider],
    ) -> StoreResult<Vec<SocialAccount>> {
        Ok(self
            .inner
            .read()
            .await
            .accounts
            .iter()
            .filter(|a| a.user_id == user && providers.contains(&a.provider))
            .cloned()
            .collect())
    }

    async fn upsert_account(&self, account: SocialAccount) -> StoreResult<()> {
        let mut state = self.inner.write().await;
        match state.accounts.iter_mut().find(|a| {
            a.user_id == account.user_id
                && a.provider == account.provider
                && a.account_id == account.account_id
        }) {
            Some(existing) => *existing = account,
            None => state.accounts.push(account),
        }
        Ok(())
    }

    async fn upsert_target(
        &self,
        user: UserId,
        target: PublishTarget,
        display_name: &str,
    ) -> StoreResult<()> {
        let mut state = self.inner.write().await;
        match state
            .targets
            .iter_mut()
            .find(|t| t.user_id == user && t.target == target)
        {
            Some(existing) => existing.display_name = display_name.to_string(),
            None => state.targets.push(StoredTarget {
                user_id: user,
                target,
                display_name: display_name.to_string(),
            }),
        }
        Ok(())
    }

    async fn targets_for(&self, user: UserId) -> StoreResult<Vec<PublishTarget>> {
        Ok(self
            .inner
            .read()
            .await
            .targets
            .iter()
            .filter(|t| t.user_id == user)
            .map(|t| t.target.clone())
            .collect())
    }

    async fn mark_needs_reconnect(
        &self,
        user: UserId,
        provider: Provider,
        account: &AccountId,
    ) -> StoreResult<()> {
        let mut state = self.inner.write().await;
        let found = state
            .accounts
            .iter_mut()
            .find(|a| a.user_id == user && a.provider == provider && &a.account_id == account);
        match found {
            Some(existing) => {
                existing.needs_reconnect = true;
                Ok(())
            }
            None => Err(StoreError::new(StoreErrorKind::NotFound(format!(
                "social account {account} for {provider}"
            )))),
        }
    }
}

#[async_trait]
impl TrackedPostStore for InMemoryStore {
    async fn insert_batch(&self, rows: Vec<NewTrackedPost>) -> StoreResult<Vec<TrackedPost>> {
        let mut state = self.inner.write().await;
        let now = Utc::now();
        let created: Vec<TrackedPost> = rows
            .into_iter()
            .map(|row| TrackedPost {
                id: TrackingId::new(),
                post_id: row.post_id,
                provider: row.provider,
                account_id: row.account_id,
                target_id: row.target_id,
                status: row.status,
                scheduled_at: row.scheduled_at,
                content_text: row.content_text,
                media_url: row.media_url,
                error_message: None,
                external_post_id: None,
                created_at: now,
            })
            .collect();
        state.tracked.extend(created.iter().cloned());
        Ok(created)
    }

    async fn mark_failed(&self, ids: &[TrackingId], message: &str) -> StoreResult<()> {
        let mut state = self.inner.write().await;
        for row in state.tracked.iter_mut().filter(|r| ids.contains(&r.id)) {
            row.status = PublishStatus::Failed;
            row.error_message = Some(message.to_string());
        }
        Ok(())
    }

    async fn record_outcome(&self, id: TrackingId, outcome: PublishOutcome) -> StoreResult<()> {
        let mut state = self.inner.write().await;
        let row = state
            .tracked
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| {
                StoreError::new(StoreErrorKind::NotFound(format!("tracking row {id}")))
            })?;
        match outcome {
            PublishOutcome::Published { external_post_id } => {
                row.status = PublishStatus::Published;
                row.external_post_id = Some(external_post_id);
            }
            PublishOutcome::Failed { message } => {
                row.status = PublishStatus::Failed;
                row.error_message = Some(message);
            }
        }
        Ok(())
    }

    async fn posts_for(&self, post: PostId) -> StoreResult<Vec<TrackedPost>> {
        let state = self.inner.read().await;
        let mut rows: Vec<TrackedPost> = state
            .tracked
            .iter()
            .filter(|r| r.post_id == post)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl ApprovalStore for InMemoryStore {
    async fn insert_approval(&self, request: ApprovalRequest) -> StoreResult<ApprovalRequest> {
        self.inner
            .write()
            .await
            .approvals
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_approval(&self, id: ApprovalId) -> StoreResult<Option<ApprovalRequest>> {
        Ok(self.inner.read().await.approvals.get(&id).cloned())
    }

    async fn decide_if_pending(
        &self,
        id: ApprovalId,
        status: ApprovalStatus,
        decided_by: UserId,
        comment: Option<String>,
    ) -> StoreResult<ApprovalRequest> {
        let mut state = self.inner.write().await;
        let record = state.approvals.get_mut(&id).ok_or_else(|| {
            StoreError::new(StoreErrorKind::NotFound(format!("approval {id}")))
        })?;
        if record.status != ApprovalStatus::Pending {
            return Err(StoreError::new(StoreErrorKind::Conflict(format!(
                "approval {id} already {}",
                record.status
            ))));
        }
        record.status = status;
        record.decided_by = Some(decided_by);
        record.decided_at = Some(Utc::now());
        if comment.is_some() {
            record.comment = comment;
        }
        Ok(record.clone())
    }

    async fn list_by_status(
        &self,
        team: TeamId,
        status: ApprovalStatus,
    ) -> StoreResult<Vec<ApprovalRequest>> {
        let state = self.inner.read().await;
        let mut rows: Vec<ApprovalRequest> = state
            .approvals
            .values()
            .filter(|r| r.team_id == team && r.status == status)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn pending_for_reviewer(&self, reviewer: UserId) -> StoreResult<Vec<ApprovalRequest>> {
        let state = self.inner.read().await;
        let mut rows: Vec<ApprovalRequest> = state
            .approvals
            .values()
            .filter(|r| r.assigned_to == reviewer && r.status == ApprovalStatus::Pending)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl InteractionStore for InMemoryStore {
    async fn used_in_window(
        &self,
        user: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<u32> {
        let state = self.inner.read().await;
        Ok(state
            .interactions
            .iter()
            .filter(|i| i.user_id == user && i.created_at >= from && i.created_at <= to)
            .map(|i| i.credits_used)
            .sum())
    }

    async fn record_interaction(&self, user: UserId, weight: u32) -> StoreResult<()> {
        let mut state = self.inner.write().await;
        state.interactions.push(AssistantInteraction {
            id: uuid::Uuid::new_v4(),
            user_id: user,
            credits_used: weight,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn record_if_under(
        &self,
        user: UserId,
        weight: u32,
        from: DateTime<Utc>,
        ceiling: u32,
    ) -> StoreResult<bool> {
        // Count and insert under one write lock.
        let mut state = self.inner.write().await;
        let used: u32 = state
            .interactions
            .iter()
            .filter(|i| i.user_id == user && i.created_at >= from)
            .map(|i| i.credits_used)
            .sum();
        if used >= ceiling {
            return Ok(false);
        }
        state.interactions.push(AssistantInteraction {
            id: uuid::Uuid::new_v4(),
            user_id: user,
            credits_used: weight,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn interactions_for(&self, user: UserId) -> StoreResult<Vec<AssistantInteraction>> {
        let state = self.inner.read().await;
        let mut rows: Vec<AssistantInteraction> = state
            .interactions
            .iter()
            .filter(|i| i.user_id == user)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn team_members(&self, team: TeamId) -> StoreResult<Vec<TeamMember>> {
        Ok(self
            .inner
            .read()
            .await
            .members
            .iter()
            .filter(|m| m.team_id == team)
            .copied()
            .collect())
    }
}

#[async_trait]
impl OauthStateStore for InMemoryStore {
    async fn issue_nonce(&self, nonce: &str) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .nonces
            .insert(nonce.to_string(), false);
        Ok(())
    }

    async fn consume_nonce(&self, nonce: &str) -> StoreResult<bool> {
        let mut state = self.inner.write().await;
        match state.nonces.get_mut(nonce) {
            Some(consumed) if !*consumed => {
                *consumed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl EntitlementChecker for InMemoryStore {
    async fn collaborating_plan(&self, user: UserId) -> StoreResult<bool> {
        Ok(self
            .inner
            .read()
            .await
            .profiles
            .get(&user)
            .map(|p| p.plan.collaborative())
            .unwrap_or(false))
    }
}
