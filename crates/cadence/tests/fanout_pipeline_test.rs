//! Connect, fan out, and advance: the publishing pipeline end to end.

use async_trait::async_trait;
use cadence::{
    AccountId, AutomationNotifier, ContentItem, GraphToken, InMemoryStore, InstagramAccount,
    MetaGraph, OauthCallback, OauthError, PageInfo, PlanTier, PostId, PostScheduler, Profile,
    Provider, PublishDispatch, PublishMode, PublishOutcome, PublishStatus, ScheduleRequest,
    SocialAccountStore, StateCodec, TeamEvent, TeamId, TrackedPostStore, UserId, WebhookError,
};
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};

/// Notifier recording publish dispatches.
#[derive(Default)]
struct RecordingNotifier {
    dispatches: Mutex<Vec<PublishDispatch>>,
}

#[async_trait]
impl AutomationNotifier for RecordingNotifier {
    async fn dispatch_publish(&self, dispatch: &PublishDispatch) -> Result<(), WebhookError> {
        self.dispatches.lock().unwrap().push(dispatch.clone());
        Ok(())
    }

    async fn dispatch_event(&self, _: &TeamEvent) -> Result<(), WebhookError> {
        Ok(())
    }
}

/// Graph fake: one page with a linked Instagram business account.
struct LinkedGraph;

#[async_trait]
impl MetaGraph for LinkedGraph {
    async fn exchange_code(&self, _: &str) -> Result<GraphToken, OauthError> {
        Ok(GraphToken {
            access_token: "short".into(),
            expires_in: Some(3600),
        })
    }

    async fn extend_token(&self, _: &str) -> Result<GraphToken, OauthError> {
        Ok(GraphToken {
            access_token: "long".into(),
            expires_in: Some(60 * 60 * 24 * 60),
        })
    }

    async fn pages(&self, _: &str) -> Result<Vec<PageInfo>, OauthError> {
        Ok(vec![PageInfo {
            id: "page-77".into(),
            name: "Studio Page".into(),
            access_token: "page-token".into(),
        }])
    }

    async fn instagram_account(&self, _: &PageInfo) -> Result<Option<InstagramAccount>, OauthError> {
        Ok(Some(InstagramAccount {
            id: "ig-77".into(),
            username: Some("studio.official".into()),
        }))
    }
}

#[tokio::test]
async fn test_connect_schedule_and_advance() {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let user = UserId::new();
    let post = PostId::new();

    store
        .seed_profile(Profile {
            user_id: user,
            team_id: TeamId::new(),
            plan: PlanTier::Pro,
        })
        .await;
    store
        .seed_content(ContentItem {
            id: post,
            owner: user,
            body: "product drop friday".into(),
            media_urls: vec!["https://cdn.test/drop.jpg".into()],
            created_at: Utc::now(),
        })
        .await;

    // Connect: discovers the page and its linked Instagram account.
    let callback = OauthCallback::new(
        store.clone(),
        Arc::new(LinkedGraph),
        StateCodec::new(b"integration-secret", Duration::minutes(10)),
    );
    let state = callback.begin(user, Provider::Facebook).await.unwrap();
    let outcome = callback.complete("code", &state).await.unwrap();
    assert_eq!(outcome.connected.len(), 2);

    // Fan out to every discovered target.
    let targets = store.targets_for(user).await.unwrap();
    assert_eq!(targets.len(), 2);

    let scheduler = PostScheduler::new(store.clone(), notifier.clone());
    let created = scheduler
        .schedule(
            user,
            ScheduleRequest {
                post_id: post,
                targets,
                scheduled_at: None,
                mode: PublishMode::PublishNow,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|r| r.status == PublishStatus::Publishing));

    // The dispatch carried every created row id.
    let dispatches = notifier.dispatches.lock().unwrap();
    assert_eq!(dispatches.len(), 1);
    assert_eq!(dispatches[0].social_posts.len(), 2);
    drop(dispatches);

    // The automation system reports one success and one failure.
    let facebook_row = created
        .iter()
        .find(|r| r.provider == Provider::Facebook)
        .unwrap();
    let instagram_row = created
        .iter()
        .find(|r| r.provider == Provider::Instagram)
        .unwrap();
    store
        .record_outcome(
            facebook_row.id,
            PublishOutcome::Published {
                external_post_id: "fb_1001".into(),
            },
        )
        .await
        .unwrap();
    store
        .record_outcome(
            instagram_row.id,
            PublishOutcome::Failed {
                message: "media rejected by platform".into(),
            },
        )
        .await
        .unwrap();

    let rows = scheduler.posts_for(user, post).await.unwrap();
    assert_eq!(rows.len(), 2);
    let published = rows
        .iter()
        .find(|r| r.provider == Provider::Facebook)
        .unwrap();
    assert_eq!(published.status, PublishStatus::Published);
    assert_eq!(published.external_post_id.as_deref(), Some("fb_1001"));
    let failed = rows
        .iter()
        .find(|r| r.provider == Provider::Instagram)
        .unwrap();
    assert_eq!(failed.status, PublishStatus::Failed);
    assert!(failed.error_message.is_some());
}

#[tokio::test]
async fn test_reconnect_flag_blocks_until_reconnected() {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
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
            body: "weekly recap".into(),
            media_urls: vec![],
            created_at: Utc::now(),
        })
        .await;

    // Connect, then a token health check marks the account stale.
    let callback = OauthCallback::new(
        store.clone(),
        Arc::new(LinkedGraph),
        StateCodec::new(b"integration-secret", Duration::minutes(10)),
    );
    let state = callback.begin(user, Provider::Facebook).await.unwrap();
    callback.complete("code", &state).await.unwrap();
    store
        .mark_needs_reconnect(user, Provider::Facebook, &AccountId::from("page-77"))
        .await
        .unwrap();

    let scheduler = PostScheduler::new(store.clone(), notifier);
    let request = ScheduleRequest {
        post_id: post,
        targets: store
            .targets_for(user)
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.provider == Provider::Facebook)
            .collect(),
        scheduled_at: None,
        mode: PublishMode::PublishNow,
    };
    let err = scheduler.schedule(user, request.clone()).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        cadence::PublishErrorKind::NeedsReconnect { .. }
    ));

    // A fresh OAuth round-trip clears the flag and unblocks scheduling.
    let state = callback.begin(user, Provider::Facebook).await.unwrap();
    callback.complete("code", &state).await.unwrap();
    let created = scheduler.schedule(user, request).await.unwrap();
    assert_eq!(created.len(), 1);
}
