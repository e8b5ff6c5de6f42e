//! Content items referenced by the publishing pipeline.

use crate::{PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content item composed in the planner.
///
/// The fan-out component only reads content it can prove the acting user
/// owns; the item itself is owned and mutated elsewhere in the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Identifier shared by every tracking row fanned out from this item.
    pub id: PostId,
    /// Composing user.
    pub owner: UserId,
    /// Post body text.
    pub body: String,
    /// Attached media, in display order.
    pub media_urls: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
