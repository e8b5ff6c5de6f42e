//! `PgStore`: the Postgres-backed repository implementation.

use crate::models::{
    ApprovalRow, ContentItemRow, InteractionRow, NewApprovalRow, NewSocialAccountRow,
    NewSocialTargetRow, NewTrackedPostRow, ProfileRow, SocialAccountRow, SocialTargetRow,
    TeamMemberRow, TrackedPostRow,
};
use crate::schema;
use async_trait::async_trait;
use cadence_core::{
    AccountId, ApprovalId, ApprovalRequest, ApprovalStatus, AssistantInteraction, ContentItem,
    NewTrackedPost, PostId, Profile, Provider, PublishOutcome, PublishStatus, PublishTarget,
    SocialAccount, TeamId, TeamMember, TrackedPost, TrackingId, UserId,
};
use cadence_error::{StoreError, StoreErrorKind, StoreResult};
use cadence_store::{
    ApprovalStore, ContentStore, EntitlementChecker, InteractionStore, OauthStateStore,
    ProfileStore, SocialAccountStore, TeamStore, TrackedPostStore,
};
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use tracing::instrument;

/// Postgres implementation of the Cadence repository traits.
///
/// Queries run synchronously on pooled connections, mirroring the small
/// per-request workloads these components issue. Profiles, content items,
/// and team rows are written elsewhere in the product; this store only
/// reads them.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PgStore {
    /// Create a store over an existing pool.
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Create a store from `DATABASE_URL`.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self::new(crate::create_pool_from_env()?))
    }

    fn conn(&self) -> StoreResult<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool
            .get()
            .map_err(|e| StoreError::new(StoreErrorKind::Connection(e.to_string())))
    }
}

fn query_err(err: diesel::result::Error) -> StoreError {
    use diesel::result::{DatabaseErrorKind, Error};
    match err {
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::new(StoreErrorKind::Conflict(info.message().to_string()))
        }
        Error::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            StoreError::new(StoreErrorKind::Connection(info.message().to_string()))
        }
        other => StoreError::new(StoreErrorKind::Query(other.to_string())),
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    #[instrument(skip(self))]
    async fn find_profile(&self, user: UserId) -> StoreResult<Option<Profile>> {
        let mut conn = self.conn()?;
        let row: Option<ProfileRow> = schema::profiles::table
            .filter(schema::profiles::user_id.eq(user.as_uuid()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(query_err)?;
        row.map(Profile::try_from).transpose()
    }
}

#[async_trait]
impl ContentStore for PgStore {
    #[instrument(skip(self))]
    async fn find_owned(&self, post: PostId, owner: UserId) -> StoreResult<Option<ContentItem>> {
        let mut conn = self.conn()?;
        let row: Option<ContentItemRow> = schema::content_items::table
            .filter(schema::content_items::id.eq(post.as_uuid()))
            .filter(schema::content_items::owner_id.eq(owner.as_uuid()))
            .select(ContentItemRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(query_err)?;
        Ok(row.map(ContentItem::from))
    }
}

#[async_trait]
impl SocialAccountStore for PgStore {
    #[instrument(skip(self))]
    async fn accounts_for(
        &self,
        user: UserId,
        providers: &[Provider],
    ) -> StoreResult<Vec<SocialAccount>> {
        let mut conn = self.conn()?;
        let provider_names: Vec<String> = providers.iter().map(|p| p.to_string()).collect();
        let rows: Vec<SocialAccountRow> = schema::social_accounts::table
            .filter(schema::social_accounts::user_id.eq(user.as_uuid()))
            .filter(schema::social_accounts::provider.eq_any(provider_names))
            .select(SocialAccountRow::as_select())
            .load(&mut conn)
            .map_err(query_err)?;
        rows.into_iter().map(SocialAccount::try_from).collect()
    }

    #[instrument(skip(self, account), fields(provider = %account.provider))]
    async fn upsert_account(&self, account: SocialAccount) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let now = Utc::now();
        let row = NewSocialAccountRow::from_account(&account, now);
        diesel::insert_into(schema::social_accounts::table)
            .values(&row)
            .on_conflict((
                schema::social_accounts::user_id,
                schema::social_accounts::provider,
                schema::social_accounts::account_id,
            ))
            .do_update()
            .set((
                schema::social_accounts::display_name.eq(&row.display_name),
                schema::social_accounts::access_token.eq(&row.access_token),
                schema::social_accounts::expires_at.eq(row.expires_at),
                schema::social_accounts::needs_reconnect.eq(row.needs_reconnect),
                schema::social_accounts::scopes.eq(&row.scopes),
                schema::social_accounts::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .map_err(query_err)?;
        Ok(())
    }

    #[instrument(skip(self, target), fields(provider = %target.provider))]
    async fn upsert_target(
        &self,
        user: UserId,
        target: PublishTarget,
        display_name: &str,
    ) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let row = NewSocialTargetRow {
            user_id: *user.as_uuid(),
            provider: target.provider.to_string(),
            account_id: target.account_id.as_str().to_string(),
            target_id: target.target_id.as_str().to_string(),
            display_name: display_name.to_string(),
            created_at: Utc::now(),
        };
        diesel::insert_into(schema::social_targets::table)
            .values(&row)
            .on_conflict((
                schema::social_targets::user_id,
                schema::social_targets::provider,
                schema::social_targets::account_id,
                schema::social_targets::target_id,
            ))
            .do_update()
            .set(schema::social_targets::display_name.eq(&row.display_name))
            .execute(&mut conn)
            .map_err(query_err)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn targets_for(&self, user: UserId) -> StoreResult<Vec<PublishTarget>> {
        let mut conn = self.conn()?;
        let rows: Vec<SocialTargetRow> = schema::social_targets::table
            .filter(schema::social_targets::user_id.eq(user.as_uuid()))
            .select(SocialTargetRow::as_select())
            .load(&mut conn)
            .map_err(query_err)?;
        rows.into_iter().map(PublishTarget::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn mark_needs_reconnect(
        &self,
        user: UserId,
        provider: Provider,
        account: &AccountId,
    ) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(
            schema::social_accounts::table
                .filter(schema::social_accounts::user_id.eq(user.as_uuid()))
                .filter(schema::social_accounts::provider.eq(provider.to_string()))
                .filter(schema::social_accounts::account_id.eq(account.as_str())),
        )
        .set((
            schema::social_accounts::needs_reconnect.eq(true),
            schema::social_accounts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .map_err(query_err)?;

        if affected == 0 {
            return Err(StoreError::new(StoreErrorKind::NotFound(format!(
                "social account {account} for {provider}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl TrackedPostStore for PgStore {
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_batch(&self, rows: Vec<NewTrackedPost>) -> StoreResult<Vec<TrackedPost>> {
        let mut conn = self.conn()?;
        let now = Utc::now();
        let inserts: Vec<NewTrackedPostRow> = rows
            .iter()
            .map(|row| NewTrackedPostRow::from_new(row, now))
            .collect();
        // One multi-row statement keeps the batch all-or-nothing.
        let created: Vec<TrackedPostRow> = diesel::insert_into(schema::tracked_posts::table)
            .values(&inserts)
            .get_results(&mut conn)
            .map_err(query_err)?;
        created.into_iter().map(TrackedPost::try_from).collect()
    }

    #[instrument(skip(self, ids, message), fields(rows = ids.len()))]
    async fn mark_failed(&self, ids: &[TrackingId], message: &str) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        diesel::update(schema::tracked_posts::table.filter(schema::tracked_posts::id.eq_any(uuids)))
            .set((
                schema::tracked_posts::status.eq(PublishStatus::Failed.to_string()),
                schema::tracked_posts::error_message.eq(message),
            ))
            .execute(&mut conn)
            .map_err(query_err)?;
        Ok(())
    }

    #[instrument(skip(self, outcome))]
    async fn record_outcome(&self, id: TrackingId, outcome: PublishOutcome) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let target = schema::tracked_posts::table.filter(schema::tracked_posts::id.eq(id.as_uuid()));
        let affected = match outcome {
            PublishOutcome::Published { external_post_id } => diesel::update(target)
                .set((
                    schema::tracked_posts::status.eq(PublishStatus::Published.to_string()),
                    schema::tracked_posts::external_post_id.eq(external_post_id),
                ))
                .execute(&mut conn)
                .map_err(query_err)?,
            PublishOutcome::Failed { message } => diesel::update(target)
                .set((
                    schema::tracked_posts::status.eq(PublishStatus::Failed.to_string()),
                    schema::tracked_posts::error_message.eq(message),
                ))
                .execute(&mut conn)
                .map_err(query_err)?,
        };

        if affected == 0 {
            return Err(StoreError::new(StoreErrorKind::NotFound(format!(
                "tracking row {id}"
            ))));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn posts_for(&self, post: PostId) -> StoreResult<Vec<TrackedPost>> {
        let mut conn = self.conn()?;
        let rows: Vec<TrackedPostRow> = schema::tracked_posts::table
            .filter(schema::tracked_posts::post_id.eq(post.as_uuid()))
            .order(schema::tracked_posts::created_at.desc())
            .select(TrackedPostRow::as_select())
            .load(&mut conn)
            .map_err(query_err)?;
        rows.into_iter().map(TrackedPost::try_from).collect()
    }
}

#[async_trait]
impl ApprovalStore for PgStore {
    #[instrument(skip(self, request), fields(id = %request.id))]
    async fn insert_approval(&self, request: ApprovalRequest) -> StoreResult<ApprovalRequest> {
        let mut conn = self.conn()?;
        let row = NewApprovalRow::from(&request);
        let created: ApprovalRow = diesel::insert_into(schema::approval_requests::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(query_err)?;
        ApprovalRequest::try_from(created)
    }

    #[instrument(skip(self))]
    async fn find_approval(&self, id: ApprovalId) -> StoreResult<Option<ApprovalRequest>> {
        let mut conn = self.conn()?;
        let row: Option<ApprovalRow> = schema::approval_requests::table
            .filter(schema::approval_requests::id.eq(id.as_uuid()))
            .select(ApprovalRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(query_err)?;
        row.map(ApprovalRequest::try_from).transpose()
    }

    #[instrument(skip(self, comment))]
    async fn decide_if_pending(
        &self,
        id: ApprovalId,
        status: ApprovalStatus,
        decided_by: UserId,
        comment: Option<String>,
    ) -> StoreResult<ApprovalRequest> {
        let mut conn = self.conn()?;
        // The pending filter is the state guard: a decided row matches
        // nothing and the update is a no-op.
        let target = schema::approval_requests::table
            .filter(schema::approval_requests::id.eq(id.as_uuid()))
            .filter(schema::approval_requests::status.eq(ApprovalStatus::Pending.to_string()));

        let updated: Option<ApprovalRow> = match comment {
            Some(comment) => diesel::update(target)
                .set((
                    schema::approval_requests::status.eq(status.to_string()),
                    schema::approval_requests::decided_by.eq(Some(*decided_by.as_uuid())),
                    schema::approval_requests::decided_at.eq(Some(Utc::now())),
                    schema::approval_requests::comment.eq(Some(comment)),
                ))
                .get_result(&mut conn)
                .optional()
                .map_err(query_err)?,
            None => diesel::update(target)
                .set((
                    schema::approval_requests::status.eq(status.to_string()),
                    schema::approval_requests::decided_by.eq(Some(*decided_by.as_uuid())),
                    schema::approval_requests::decided_at.eq(Some(Utc::now())),
                ))
                .get_result(&mut conn)
                .optional()
                .map_err(query_err)?,
        };

        match updated {
            Some(row) => ApprovalRequest::try_from(row),
            None => {
                let exists: Option<ApprovalRow> = schema::approval_requests::table
                    .filter(schema::approval_requests::id.eq(id.as_uuid()))
                    .select(ApprovalRow::as_select())
                    .first(&mut conn)
                    .optional()
                    .map_err(query_err)?;
                match exists {
                    Some(row) => Err(StoreError::new(StoreErrorKind::Conflict(format!(
                        "approval {id} already {}",
                        row.status
                    )))),
                    None => Err(StoreError::new(StoreErrorKind::NotFound(format!(
                        "approval {id}"
                    )))),
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_by_status(
        &self,
        team: TeamId,
        status: ApprovalStatus,
    ) -> StoreResult<Vec<ApprovalRequest>> {
        let mut conn = self.conn()?;
        let rows: Vec<ApprovalRow> = schema::approval_requests::table
            .filter(schema::approval_requests::team_id.eq(team.as_uuid()))
            .filter(schema::approval_requests::status.eq(status.to_string()))
            .order(schema::approval_requests::created_at.desc())
            .select(ApprovalRow::as_select())
            .load(&mut conn)
            .map_err(query_err)?;
        rows.into_iter().map(ApprovalRequest::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn pending_for_reviewer(&self, reviewer: UserId) -> StoreResult<Vec<ApprovalRequest>> {
        let mut conn = self.conn()?;
        let rows: Vec<ApprovalRow> = schema::approval_requests::table
            .filter(schema::approval_requests::assigned_to.eq(reviewer.as_uuid()))
            .filter(schema::approval_requests::status.eq(ApprovalStatus::Pending.to_string()))
            .order(schema::approval_requests::created_at.desc())
            .select(ApprovalRow::as_select())
            .load(&mut conn)
            .map_err(query_err)?;
        rows.into_iter().map(ApprovalRequest::try_from).collect()
    }
}

#[async_trait]
impl InteractionStore for PgStore {
    #[instrument(skip(self))]
    async fn used_in_window(
        &self,
        user: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<u32> {
        let mut conn = self.conn()?;
        let total: Option<i64> = schema::assistant_interactions::table
            .filter(schema::assistant_interactions::user_id.eq(user.as_uuid()))
            .filter(schema::assistant_interactions::created_at.ge(from))
            .filter(schema::assistant_interactions::created_at.le(to))
            .select(diesel::dsl::sum(schema::assistant_interactions::credits_used))
            .first(&mut conn)
            .map_err(query_err)?;
        Ok(total.unwrap_or(0).max(0) as u32)
    }

    #[instrument(skip(self))]
    async fn record_interaction(&self, user: UserId, weight: u32) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(schema::assistant_interactions::table)
            .values((
                schema::assistant_interactions::id.eq(uuid::Uuid::new_v4()),
                schema::assistant_interactions::user_id.eq(user.as_uuid()),
                schema::assistant_interactions::credits_used.eq(weight as i32),
                schema::assistant_interactions::created_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .map_err(query_err)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_if_under(
        &self,
        user: UserId,
        weight: u32,
        from: DateTime<Utc>,
        ceiling: u32,
    ) -> StoreResult<bool> {
        use diesel::sql_types::{BigInt, Integer, Timestamptz, Uuid as SqlUuid};

        let mut conn = self.conn()?;
        // Guarded insert in one statement: the ceiling check and the log
        // write cannot interleave with a concurrent consumer.
        let affected = diesel::sql_query(
            "INSERT INTO assistant_interactions (id, user_id, credits_used, created_at) \
             SELECT $1, $2, $3, NOW() \
             WHERE (SELECT COALESCE(SUM(credits_used), 0) FROM assistant_interactions \
                    WHERE user_id = $2 AND created_at >= $4) < $5",
        )
        .bind::<SqlUuid, _>(uuid::Uuid::new_v4())
        .bind::<SqlUuid, _>(*user.as_uuid())
        .bind::<Integer, _>(weight as i32)
        .bind::<Timestamptz, _>(from)
        .bind::<BigInt, _>(ceiling as i64)
        .execute(&mut conn)
        .map_err(query_err)?;

        Ok(affected > 0)
    }

    #[instrument(skip(self))]
    async fn interactions_for(&self, user: UserId) -> StoreResult<Vec<AssistantInteraction>> {
        let mut conn = self.conn()?;
        let rows: Vec<InteractionRow> = schema::assistant_interactions::table
            .filter(schema::assistant_interactions::user_id.eq(user.as_uuid()))
            .order(schema::assistant_interactions::created_at.desc())
            .select(InteractionRow::as_select())
            .load(&mut conn)
            .map_err(query_err)?;
        Ok(rows.into_iter().map(AssistantInteraction::from).collect())
    }
}

#[async_trait]
impl TeamStore for PgStore {
    #[instrument(skip(self))]
    async fn team_members(&self, team: TeamId) -> StoreResult<Vec<TeamMember>> {
        let mut conn = self.conn()?;
        let rows: Vec<TeamMemberRow> = schema::team_members::table
            .filter(schema::team_members::team_id.eq(team.as_uuid()))
            .select(TeamMemberRow::as_select())
            .load(&mut conn)
            .map_err(query_err)?;
        rows.into_iter().map(TeamMember::try_from).collect()
    }
}

#[async_trait]
impl OauthStateStore for PgStore {
    #[instrument(skip(self, nonce))]
    async fn issue_nonce(&self, nonce: &str) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(schema::oauth_state_nonces::table)
            .values((
                schema::oauth_state_nonces::nonce.eq(nonce),
                schema::oauth_state_nonces::issued_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .map_err(query_err)?;
        Ok(())
    }

    #[instrument(skip(self, nonce))]
    async fn consume_nonce(&self, nonce: &str) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        // The null filter makes consumption single-use under concurrency.
        let affected = diesel::update(
            schema::oauth_state_nonces::table
                .filter(schema::oauth_state_nonces::nonce.eq(nonce))
                .filter(schema::oauth_state_nonces::consumed_at.is_null()),
        )
        .set(schema::oauth_state_nonces::consumed_at.eq(Some(Utc::now())))
        .execute(&mut conn)
        .map_err(query_err)?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl EntitlementChecker for PgStore {
    #[instrument(skip(self))]
    async fn collaborating_plan(&self, user: UserId) -> StoreResult<bool> {
        Ok(self
            .find_profile(user)
            .await?
            .map(|profile| profile.plan.collaborative())
            .unwrap_or(false))
    }
}
