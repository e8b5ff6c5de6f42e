//! The fan-out scheduler service.

use crate::{PublishError, PublishErrorKind, ScheduleRequest};
use cadence_core::{NewTrackedPost, PostId, Provider, TrackedPost, TrackingId, UserId};
use cadence_store::{
    ContentStore, ProfileStore, SocialAccountStore, TrackedPostStore, with_write_retry,
};
use cadence_webhook::{AutomationNotifier, DispatchTarget, PublishDispatch};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, instrument, warn};

/// Fans one content item out to per-target tracking rows and hands the
/// batch to the automation endpoint.
///
/// Ordering within one invocation: validation, then ownership, then the
/// account-health gate, and only then any write. Across invocations there
/// is no mutual exclusion; two concurrent calls for the same post can both
/// fan out.
#[derive(Debug, Clone)]
pub struct PostScheduler<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> PostScheduler<S, N>
where
    S: ProfileStore + ContentStore + SocialAccountStore + TrackedPostStore,
    N: AutomationNotifier,
{
    /// Create a scheduler over the given store and notifier.
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Execute one fan-out request.
    ///
    /// On success every created row is returned with its initial status.
    /// If the automation dispatch fails after the rows were committed, the
    /// rows are marked `failed` (so no row lingers with no actor
    /// responsible for advancing it) and `DispatchFailed` is surfaced.
    ///
    /// # Errors
    ///
    /// `NoTargetSelected`, `MissingScheduleTime`, `Unauthenticated`,
    /// `PostNotFound`, `NeedsReconnect`, `DispatchFailed`, `Store`.
    #[instrument(skip(self, request), fields(post_id = %request.post_id, targets = request.targets.len(), mode = %request.mode))]
    pub async fn schedule(
        &self,
        actor: UserId,
        request: ScheduleRequest,
    ) -> Result<Vec<TrackedPost>, PublishError> {
        request.validate()?;

        self.store
            .find_profile(actor)
            .await?
            .ok_or_else(|| PublishError::new(PublishErrorKind::Unauthenticated))?;

        // Ownership check fails closed: a foreign post reads as missing.
        let content = self
            .store
            .find_owned(request.post_id, actor)
            .await?
            .ok_or_else(|| PublishError::new(PublishErrorKind::PostNotFound))?;

        // Account-health gate. Completes before any row is written and can
        // reject the whole batch.
        let providers = request.providers();
        let accounts = self.store.accounts_for(actor, &providers).await?;
        let mut stale: Vec<Provider> = accounts
            .iter()
            .filter(|a| a.needs_reconnect)
            .map(|a| a.provider)
            .collect();
        stale.sort();
        stale.dedup();
        if !stale.is_empty() {
            warn!(providers = ?stale, "batch rejected, accounts need reconnect");
            return Err(PublishError::new(PublishErrorKind::NeedsReconnect {
                providers: stale,
            }));
        }

        let scheduled_at = request.scheduled_at.unwrap_or_else(Utc::now);
        let status = request.mode.initial_status();
        // Only the first media asset propagates to the tracking rows.
        let media_url = content.media_urls.first().cloned();
        let rows: Vec<NewTrackedPost> = request
            .targets
            .iter()
            .map(|target| NewTrackedPost {
                post_id: request.post_id,
                provider: target.provider,
                account_id: target.account_id.clone(),
                target_id: target.target_id.clone(),
                status,
                scheduled_at,
                content_text: content.body.clone(),
                media_url: media_url.clone(),
            })
            .collect();

        let created = with_write_retry(|| self.store.insert_batch(rows.clone())).await?;

        let dispatch = PublishDispatch {
            post_id: request.post_id,
            user_id: actor,
            social_posts: created
                .iter()
                .map(|row| DispatchTarget {
                    id: row.id,
                    provider: row.provider,
                    account_id: row.account_id.clone(),
                    target_id: row.target_id.clone(),
                })
                .collect(),
        };

        if let Err(dispatch_err) = self.notifier.dispatch_publish(&dispatch).await {
            let ids: Vec<TrackingId> = created.iter().map(|row| row.id).collect();
            let message = format!("automation dispatch failed: {dispatch_err}");
            if let Err(store_err) = self.store.mark_failed(&ids, &message).await {
                error!(error = %store_err, rows = ids.len(), "failed to compensate dispatched batch");
            }
            return Err(PublishError::new(PublishErrorKind::DispatchFailed {
                rows: ids.len(),
            }));
        }

        Ok(created)
    }

    /// Tracking rows for one content item, newest first.
    ///
    /// Read path the UI polls while the automation system advances
    /// statuses; the same fails-closed ownership rule as `schedule`.
    #[instrument(skip(self))]
    pub async fn posts_for(
        &self,
        actor: UserId,
        post: PostId,
    ) -> Result<Vec<TrackedPost>, PublishError> {
        self.store
            .find_owned(post, actor)
            .await?
            .ok_or_else(|| PublishError::new(PublishErrorKind::PostNotFound))?;
        Ok(self.store.posts_for(post).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PublishMode;
    use async_trait::async_trait;
    use cadence_core::{
        AccountId, ContentItem, PlanTier, Profile, PublishStatus, PublishTarget, SocialAccount,
        TargetId, TeamId,
    };
    use cadence_store::InMemoryStore;
    use cadence_webhook::{TeamEvent, WebhookError, WebhookErrorKind};
    use std::sync::Mutex;

    /// Notifier that records dispatches and optionally fails them.
    #[derive(Default)]
    struct StubNotifier {
        fail: bool,
        dispatches: Mutex<Vec<PublishDispatch>>,
    }

    #[async_trait]
    impl AutomationNotifier for StubNotifier {
        async fn dispatch_publish(&self, dispatch: &PublishDispatch) -> Result<(), WebhookError> {
            self.dispatches.lock().unwrap().push(dispatch.clone());
            if self.fail {
                Err(WebhookError::new(WebhookErrorKind::Status {
                    status: 502,
                    url: "https://automation.test/publish".into(),
                }))
            } else {
                Ok(())
            }
        }

        async fn dispatch_event(&self, _: &TeamEvent) -> Result<(), WebhookError> {
            Ok(())
        }
    }

    struct Fixture {
        scheduler: PostScheduler<InMemoryStore, StubNotifier>,
        store: Arc<InMemoryStore>,
        notifier: Arc<StubNotifier>,
        user: UserId,
        post: PostId,
    }

    async fn fixture(failing_webhook: bool) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(StubNotifier {
            fail: failing_webhook,
            dispatches: Mutex::new(Vec::new()),
        });
        let user = UserId::new();
        let post = PostId::new();

        store
            .seed_profile(Profile {
                user_id: user,
                team_id: TeamId::new(),
                plan: PlanTier::Starter,
            })
            .await;
        store
            .seed_content(ContentItem {
                id: post,
                owner: user,
                body: "spring campaign teaser".to_string(),
                media_urls: vec![
                    "https://cdn.test/a.jpg".to_string(),
                    "https://cdn.test/b.jpg".to_string(),
                ],
                created_at: Utc::now(),
            })
            .await;

        Fixture {
            scheduler: PostScheduler::new(store.clone(), notifier.clone()),
            store,
            notifier,
            user,
            post,
        }
    }

    async fn connect_account(f: &Fixture, provider: Provider, id: &str, needs_reconnect: bool) {
        f.store
            .upsert_account(SocialAccount {
                user_id: f.user,
                provider,
                account_id: AccountId::from(id),
                display_name: None,
                access_token: "tok".to_string(),
                expires_at: None,
                needs_reconnect,
                scopes: vec![],
            })
            .await
            .unwrap();
    }

    fn target(provider: Provider, id: &str) -> PublishTarget {
        PublishTarget {
            provider,
            account_id: AccountId::from(id),
            target_id: TargetId::from(id),
        }
    }

    #[tokio::test]
    async fn test_batch_completeness() {
        let f = fixture(false).await;
        connect_account(&f, Provider::Facebook, "page-1", false).await;
        connect_account(&f, Provider::Facebook, "page-2", false).await;
        connect_account(&f, Provider::Instagram, "ig-1", false).await;

        let when = Utc::now() + chrono::Duration::hours(4);
        let created = f
            .scheduler
            .schedule(
                f.user,
                ScheduleRequest {
                    post_id: f.post,
                    targets: vec![
                        target(Provider::Facebook, "page-1"),
                        target(Provider::Facebook, "page-2"),
                        target(Provider::Instagram, "ig-1"),
                    ],
                    scheduled_at: Some(when),
                    mode: PublishMode::Schedule,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 3);
        for row in &created {
            assert_eq!(row.post_id, f.post);
            assert_eq!(row.scheduled_at, when);
            assert_eq!(row.status, PublishStatus::Scheduled);
            assert_eq!(row.content_text, "spring campaign teaser");
            // Only the first media asset propagates.
            assert_eq!(row.media_url.as_deref(), Some("https://cdn.test/a.jpg"));
        }
        let mut pairs: Vec<(Provider, &str)> = created
            .iter()
            .map(|row| (row.provider, row.target_id.as_str()))
            .collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), 3);

        assert_eq!(f.notifier.dispatches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_health_gate_rejects_whole_batch() {
        let f = fixture(false).await;
        connect_account(&f, Provider::Facebook, "page-1", true).await;
        connect_account(&f, Provider::Instagram, "ig-1", false).await;

        let err = f
            .scheduler
            .schedule(
                f.user,
                ScheduleRequest {
                    post_id: f.post,
                    targets: vec![
                        target(Provider::Facebook, "page-1"),
                        target(Provider::Instagram, "ig-1"),
                    ],
                    scheduled_at: None,
                    mode: PublishMode::PublishNow,
                },
            )
            .await
            .unwrap_err();

        match err.kind() {
            PublishErrorKind::NeedsReconnect { providers } => {
                assert_eq!(providers, &vec![Provider::Facebook]);
            }
            other => panic!("expected NeedsReconnect, got {other}"),
        }
        // No rows for either provider.
        assert_eq!(f.store.tracked_len().await, 0);
        // The webhook was never reached.
        assert!(f.notifier.dispatches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_failure_marks_all_rows_failed() {
        let f = fixture(true).await;
        connect_account(&f, Provider::Facebook, "page-1", false).await;
        connect_account(&f, Provider::Facebook, "page-2", false).await;

        let err = f
            .scheduler
            .schedule(
                f.user,
                ScheduleRequest {
                    post_id: f.post,
                    targets: vec![
                        target(Provider::Facebook, "page-1"),
                        target(Provider::Facebook, "page-2"),
                    ],
                    scheduled_at: None,
                    mode: PublishMode::PublishNow,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            PublishErrorKind::DispatchFailed { rows: 2 }
        ));

        let rows = f.store.posts_for(f.post).await.unwrap();
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(row.status, PublishStatus::Failed);
            let message = row.error_message.expect("failure message");
            assert!(!message.is_empty());
        }
    }

    #[tokio::test]
    async fn test_publish_now_rows_start_publishing() {
        let f = fixture(false).await;
        connect_account(&f, Provider::Facebook, "page-1", false).await;

        let created = f
            .scheduler
            .schedule(
                f.user,
                ScheduleRequest {
                    post_id: f.post,
                    targets: vec![target(Provider::Facebook, "page-1")],
                    scheduled_at: None,
                    mode: PublishMode::PublishNow,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].status, PublishStatus::Publishing);
    }

    #[tokio::test]
    async fn test_foreign_post_reads_as_missing() {
        let f = fixture(false).await;
        connect_account(&f, Provider::Facebook, "page-1", false).await;
        let stranger = UserId::new();
        f.store
            .seed_profile(Profile {
                user_id: stranger,
                team_id: TeamId::new(),
                plan: PlanTier::Pro,
            })
            .await;

        let err = f
            .scheduler
            .schedule(
                stranger,
                ScheduleRequest {
                    post_id: f.post,
                    targets: vec![target(Provider::Facebook, "page-1")],
                    scheduled_at: None,
                    mode: PublishMode::PublishNow,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), PublishErrorKind::PostNotFound));
    }

    #[tokio::test]
    async fn test_validation_creates_no_rows() {
        let f = fixture(false).await;

        let err = f
            .scheduler
            .schedule(
                f.user,
                ScheduleRequest {
                    post_id: f.post,
                    targets: vec![],
                    scheduled_at: None,
                    mode: PublishMode::PublishNow,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), PublishErrorKind::NoTargetSelected));
        assert_eq!(f.store.tracked_len().await, 0);

        let err = f
            .scheduler
            .schedule(
                f.user,
                ScheduleRequest {
                    post_id: f.post,
                    targets: vec![target(Provider::Facebook, "page-1")],
                    scheduled_at: None,
                    mode: PublishMode::Schedule,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), PublishErrorKind::MissingScheduleTime));
        assert_eq!(f.store.tracked_len().await, 0);
    }
}
