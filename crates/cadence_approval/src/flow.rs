//! The approval workflow service.

use crate::{ApprovalError, ApprovalErrorKind};
use cadence_core::{
    ApprovalId, ApprovalRequest, ApprovalStatus, Decision, EntityKind, Profile, UserId,
};
use cadence_error::StoreErrorKind;
use cadence_store::{
    ApprovalStore, EntitlementChecker, ProfileStore, TeamStore, with_write_retry,
};
use cadence_webhook::{AutomationEvent, AutomationNotifier, TeamEvent};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Coordinates the review workflow for content entities.
///
/// Both `request` and `decide` are plan-gated via the privileged
/// entitlement check. Notifications to the automation endpoint are
/// best-effort; a dispatch failure never rolls back a committed record.
#[derive(Debug, Clone)]
pub struct ApprovalFlow<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> ApprovalFlow<S, N>
where
    S: ProfileStore + ApprovalStore + TeamStore + EntitlementChecker,
    N: AutomationNotifier,
{
    /// Create a workflow over the given store and notifier.
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Submit an entity for review, creating a pending record.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` without a profile
    /// - `FeatureNotAvailable` when the plan lacks approval workflows
    /// - `NoReviewerAvailable` when the team has no administrator or editor
    #[instrument(skip(self), fields(%actor, %entity_kind))]
    pub async fn request(
        &self,
        actor: UserId,
        entity_kind: EntityKind,
        entity_id: Uuid,
        assigned_to: UserId,
    ) -> Result<ApprovalRequest, ApprovalError> {
        let profile = self.gated_profile(actor).await?;

        let reviewers = self.store.eligible_reviewers(profile.team_id).await?;
        if reviewers.is_empty() {
            return Err(ApprovalError::new(ApprovalErrorKind::NoReviewerAvailable));
        }

        let record =
            ApprovalRequest::pending(profile.team_id, entity_kind, entity_id, actor, assigned_to);
        let created = with_write_retry(|| self.store.insert_approval(record.clone())).await?;

        self.notify(TeamEvent {
            event: AutomationEvent::ApprovalRequested,
            entity_type: entity_kind,
            entity_id,
            team_id: profile.team_id,
            actor: Some(actor),
            status: None,
        })
        .await;

        Ok(created)
    }

    /// Decide a pending request, stamping the reviewer and decision time.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown record
    /// - `InvalidStateTransition` when the record is no longer pending
    /// - plan and session gates as for [`ApprovalFlow::request`]
    #[instrument(skip(self, comment), fields(%actor, %id, %decision))]
    pub async fn decide(
        &self,
        actor: UserId,
        id: ApprovalId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<ApprovalRequest, ApprovalError> {
        let profile = self.gated_profile(actor).await?;

        let existing = self
            .store
            .find_approval(id)
            .await?
            .ok_or_else(|| ApprovalError::new(ApprovalErrorKind::NotFound))?;
        if existing.status != ApprovalStatus::Pending {
            return Err(ApprovalError::new(ApprovalErrorKind::InvalidStateTransition {
                from: existing.status,
            }));
        }

        let target = decision.target_status();
        let decided = match self
            .store
            .decide_if_pending(id, target, actor, comment)
            .await
        {
            Ok(updated) => updated,
            // Lost a race with another reviewer between the read and the
            // guarded update.
            Err(e) if matches!(e.kind(), StoreErrorKind::Conflict(_)) => {
                let from = self
                    .store
                    .find_approval(id)
                    .await?
                    .map(|r| r.status)
                    .unwrap_or(existing.status);
                return Err(ApprovalError::new(
                    ApprovalErrorKind::InvalidStateTransition { from },
                ));
            }
            Err(e) if matches!(e.kind(), StoreErrorKind::NotFound(_)) => {
                return Err(ApprovalError::new(ApprovalErrorKind::NotFound));
            }
            Err(e) => return Err(e.into()),
        };

        self.notify(TeamEvent {
            event: AutomationEvent::ApprovalDecided,
            entity_type: decided.entity_kind,
            entity_id: decided.entity_id,
            team_id: profile.team_id,
            actor: Some(actor),
            status: Some(decided.status),
        })
        .await;

        Ok(decided)
    }

    /// Team-scoped requests in the given status, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_status(
        &self,
        actor: UserId,
        status: ApprovalStatus,
    ) -> Result<Vec<ApprovalRequest>, ApprovalError> {
        let profile = self.profile(actor).await?;
        Ok(self.store.list_by_status(profile.team_id, status).await?)
    }

    /// Pending requests assigned to the acting reviewer, newest first.
    #[instrument(skip(self))]
    pub async fn inbox(&self, reviewer: UserId) -> Result<Vec<ApprovalRequest>, ApprovalError> {
        self.profile(reviewer).await?;
        Ok(self.store.pending_for_reviewer(reviewer).await?)
    }

    async fn profile(&self, actor: UserId) -> Result<Profile, ApprovalError> {
        self.store
            .find_profile(actor)
            .await?
            .ok_or_else(|| ApprovalError::new(ApprovalErrorKind::Unauthenticated))
    }

    async fn gated_profile(&self, actor: UserId) -> Result<Profile, ApprovalError> {
        let profile = self.profile(actor).await?;
        if !self.store.collaborating_plan(actor).await? {
            return Err(ApprovalError::new(ApprovalErrorKind::FeatureNotAvailable));
        }
        Ok(profile)
    }

    async fn notify(&self, event: TeamEvent) {
        if let Err(e) = self.notifier.dispatch_event(&event).await {
            warn!(error = %e, event = %event.event, "automation notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cadence_core::{PlanTier, TeamId, TeamMember, TeamRole};
    use cadence_store::InMemoryStore;
    use cadence_webhook::{PublishDispatch, WebhookError, WebhookErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Notifier that counts deliveries and optionally fails them.
    #[derive(Default)]
    struct StubNotifier {
        fail: bool,
        events: AtomicUsize,
    }

    #[async_trait]
    impl AutomationNotifier for StubNotifier {
        async fn dispatch_publish(&self, _: &PublishDispatch) -> Result<(), WebhookError> {
            Ok(())
        }

        async fn dispatch_event(&self, _: &TeamEvent) -> Result<(), WebhookError> {
            self.events.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(WebhookError::new(WebhookErrorKind::Dispatch(
                    "connection refused".into(),
                )))
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        flow: ApprovalFlow<InMemoryStore, StubNotifier>,
        store: Arc<InMemoryStore>,
        notifier: Arc<StubNotifier>,
        requester: UserId,
        reviewer: UserId,
        team: TeamId,
    }

    async fn fixture(plan: PlanTier, with_reviewer: bool) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(StubNotifier::default());
        let team = TeamId::new();
        let requester = UserId::new();
        let reviewer = UserId::new();

        store
            .seed_profile(Profile {
                user_id: requester,
                team_id: team,
                plan,
            })
            .await;
        store
            .seed_profile(Profile {
                user_id: reviewer,
                team_id: team,
                plan,
            })
            .await;
        if with_reviewer {
            store
                .seed_team_member(TeamMember {
                    team_id: team,
                    user_id: reviewer,
                    role: TeamRole::Editor,
                })
                .await;
        }

        Fixture {
            flow: ApprovalFlow::new(store.clone(), notifier.clone()),
            store,
            notifier,
            requester,
            reviewer,
            team,
        }
    }

    #[tokio::test]
    async fn test_request_creates_pending_record() {
        let f = fixture(PlanTier::Starter, true).await;

        let created = f
            .flow
            .request(f.requester, EntityKind::Post, Uuid::new_v4(), f.reviewer)
            .await
            .unwrap();

        assert_eq!(created.status, ApprovalStatus::Pending);
        assert_eq!(created.team_id, f.team);
        assert_eq!(f.notifier.events.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_free_plan_is_rejected() {
        let f = fixture(PlanTier::Free, true).await;

        let err = f
            .flow
            .request(f.requester, EntityKind::Post, Uuid::new_v4(), f.reviewer)
            .await
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ApprovalErrorKind::FeatureNotAvailable
        ));
    }

    #[tokio::test]
    async fn test_empty_reviewer_pool_is_rejected() {
        let f = fixture(PlanTier::Starter, false).await;

        let err = f
            .flow
            .request(f.requester, EntityKind::Briefing, Uuid::new_v4(), f.reviewer)
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), ApprovalErrorKind::NoReviewerAvailable));
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_record() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(StubNotifier {
            fail: true,
            events: AtomicUsize::new(0),
        });
        let team = TeamId::new();
        let requester = UserId::new();
        store
            .seed_profile(Profile {
                user_id: requester,
                team_id: team,
                plan: PlanTier::Pro,
            })
            .await;
        store
            .seed_team_member(TeamMember {
                team_id: team,
                user_id: requester,
                role: TeamRole::Administrator,
            })
            .await;
        let flow = ApprovalFlow::new(store.clone(), notifier);

        let created = flow
            .request(requester, EntityKind::Planner, Uuid::new_v4(), requester)
            .await
            .unwrap();

        // The record survived the failed webhook.
        assert!(store.find_approval(created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_decide_is_terminal() {
        let f = fixture(PlanTier::Starter, true).await;
        let created = f
            .flow
            .request(f.requester, EntityKind::Post, Uuid::new_v4(), f.reviewer)
            .await
            .unwrap();

        let approved = f
            .flow
            .decide(f.reviewer, created.id, Decision::Approve, None)
            .await
            .unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert_eq!(approved.decided_by, Some(f.reviewer));
        assert!(approved.decided_at.is_some());

        let err = f
            .flow
            .decide(
                f.reviewer,
                created.id,
                Decision::Reject,
                Some("changed my mind".to_string()),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ApprovalErrorKind::InvalidStateTransition {
                from: ApprovalStatus::Approved
            }
        ));
    }

    #[tokio::test]
    async fn test_decide_unknown_record() {
        let f = fixture(PlanTier::Starter, true).await;

        let err = f
            .flow
            .decide(f.reviewer, ApprovalId::new(), Decision::Approve, None)
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), ApprovalErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_listing_is_status_scoped() {
        let f = fixture(PlanTier::Starter, true).await;
        let first = f
            .flow
            .request(f.requester, EntityKind::Post, Uuid::new_v4(), f.reviewer)
            .await
            .unwrap();
        f.flow
            .request(f.requester, EntityKind::Branding, Uuid::new_v4(), f.reviewer)
            .await
            .unwrap();

        f.flow
            .decide(f.reviewer, first.id, Decision::Reject, Some("off brand".into()))
            .await
            .unwrap();

        let pending = f
            .flow
            .list_by_status(f.requester, ApprovalStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let rejected = f
            .flow
            .list_by_status(f.requester, ApprovalStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].comment.as_deref(), Some("off brand"));

        let inbox = f.flow.inbox(f.reviewer).await.unwrap();
        assert_eq!(inbox.len(), 1);
    }
}
