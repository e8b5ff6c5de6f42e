//! Per-target publishing records.

use crate::{AccountId, PostId, Provider, PublishStatus, TargetId, TrackingId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A (provider, account, destination) triple a post can be published to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublishTarget {
    /// Platform of the destination.
    pub provider: Provider,
    /// Platform account that owns the destination.
    pub account_id: AccountId,
    /// Destination identifier (page id, business account id).
    pub target_id: TargetId,
}

/// One (content item × destination) publishing attempt with its own
/// lifecycle status.
///
/// All rows sharing a `post_id` were created atomically as one batch and
/// carry the same `scheduled_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPost {
    /// Row identifier.
    pub id: TrackingId,
    /// Owning content item, shared by all rows of one batch.
    pub post_id: PostId,
    /// Platform of the destination.
    pub provider: Provider,
    /// Platform account that owns the destination.
    pub account_id: AccountId,
    /// Destination identifier.
    pub target_id: TargetId,
    /// Current lifecycle status.
    pub status: PublishStatus,
    /// When the post should go (or went) live.
    pub scheduled_at: DateTime<Utc>,
    /// Body text copied from the content item at schedule time.
    pub content_text: String,
    /// First media URL of the content item, if any.
    pub media_url: Option<String>,
    /// Failure explanation once the row is `Failed`.
    pub error_message: Option<String>,
    /// Platform-assigned post id once the row is `Published`.
    pub external_post_id: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insertable form of a tracking row; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrackedPost {
    /// Owning content item.
    pub post_id: PostId,
    /// Platform of the destination.
    pub provider: Provider,
    /// Platform account that owns the destination.
    pub account_id: AccountId,
    /// Destination identifier.
    pub target_id: TargetId,
    /// Initial status: `Publishing` for publish-now, `Scheduled` otherwise.
    pub status: PublishStatus,
    /// When the post should go live.
    pub scheduled_at: DateTime<Utc>,
    /// Body text copied from the content item.
    pub content_text: String,
    /// First media URL of the content item, if any.
    pub media_url: Option<String>,
}
