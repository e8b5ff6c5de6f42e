//! Cadence: the coordination core of a marketing-ops product.
//!
//! Four request-scoped services over shared store seams:
//!
//! - [`QuotaLedger`] — assistant usage allowance over plan-dependent
//!   rolling windows
//! - [`ApprovalFlow`] — tri-state review workflow with plan and reviewer
//!   gating
//! - [`PostScheduler`] — per-target fan-out of one content item with an
//!   account-health gate and automation handoff
//! - [`OauthCallback`] — token acquisition and publish-target discovery
//!
//! None of these own threads or timers; asynchronous publishing progress
//! happens in an external automation system reached through
//! [`AutomationClient`] and written back via the store.
//!
//! # Example
//!
//! ```no_run
//! use cadence::{InMemoryStore, QuotaLedger, UserId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     cadence::init_tracing();
//!     let store = Arc::new(InMemoryStore::new());
//!     let ledger = QuotaLedger::new(store);
//!     let _ = ledger.status(UserId::new()).await;
//! }
//! ```

#![warn(missing_docs)]

mod observability;

pub use observability::init_tracing;

pub use cadence_approval::{ApprovalError, ApprovalErrorKind, ApprovalFlow};
pub use cadence_core::{
    AccountId, ApprovalId, ApprovalRequest, ApprovalStatus, AssistantInteraction, ContentItem,
    Decision, EntityKind, NewTrackedPost, PlanTier, PostId, Profile, Provider, PublishOutcome,
    PublishStatus, PublishTarget, SocialAccount, TargetId, TeamId, TeamMember, TeamRole,
    TrackedPost, TrackingId, UserId,
};
pub use cadence_database::{PgStore, create_pool, create_pool_from_env, establish_connection};
pub use cadence_error::{ConfigError, StoreError, StoreErrorKind, StoreResult};
pub use cadence_oauth::{
    ConnectedTarget, GraphConfig, GraphToken, InstagramAccount, IssuedState, MetaGraph,
    MetaGraphClient, OauthCallback, OauthError, OauthErrorKind, OauthOutcome, PageInfo,
    StateCodec, VerifiedState, completion_redirect,
};
pub use cadence_publish::{
    PostScheduler, PublishError, PublishErrorKind, PublishMode, ScheduleRequest,
};
pub use cadence_quota::{
    QuotaError, QuotaErrorKind, QuotaLedger, QuotaStatus, QuotaWindow, interaction_ceiling,
    time_until_reset,
};
pub use cadence_store::{
    ApprovalStore, ContentStore, EntitlementChecker, InMemoryStore, InteractionStore,
    OauthStateStore, ProfileStore, SocialAccountStore, TeamStore, TrackedPostStore,
    with_write_retry,
};
pub use cadence_webhook::{
    AutomationClient, AutomationEvent, AutomationNotifier, DispatchTarget, PublishDispatch,
    TeamEvent, WebhookConfig, WebhookError, WebhookErrorKind,
};
