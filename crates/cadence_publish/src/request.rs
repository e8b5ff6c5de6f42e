//! Schedule request shape and validation.

use crate::{PublishError, PublishErrorKind};
use cadence_core::{PostId, Provider, PublishStatus, PublishTarget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a fan-out request should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PublishMode {
    /// Queue for a future `scheduled_at`.
    Schedule,
    /// Hand off for immediate publishing.
    PublishNow,
}

impl PublishMode {
    /// Initial tracking-row status this mode produces.
    pub fn initial_status(&self) -> PublishStatus {
        match self {
            PublishMode::Schedule => PublishStatus::Scheduled,
            PublishMode::PublishNow => PublishStatus::Publishing,
        }
    }
}

/// One fan-out request: a content item and the destinations it goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Content item to publish.
    pub post_id: PostId,
    /// Destinations, one tracking row each.
    pub targets: Vec<PublishTarget>,
    /// When to publish; required in `Schedule` mode, defaults to now in
    /// `PublishNow` mode.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Execution mode.
    pub mode: PublishMode,
}

impl ScheduleRequest {
    /// Validate the request shape. Runs before any I/O.
    ///
    /// # Errors
    ///
    /// `NoTargetSelected` for an empty target list; `MissingScheduleTime`
    /// for schedule mode without a time.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.targets.is_empty() {
            return Err(PublishError::new(PublishErrorKind::NoTargetSelected));
        }
        if self.mode == PublishMode::Schedule && self.scheduled_at.is_none() {
            return Err(PublishError::new(PublishErrorKind::MissingScheduleTime));
        }
        Ok(())
    }

    /// Distinct providers referenced by the targets, in first-seen order.
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers = Vec::new();
        for target in &self.targets {
            if !providers.contains(&target.provider) {
                providers.push(target.provider);
            }
        }
        providers
    }
}
