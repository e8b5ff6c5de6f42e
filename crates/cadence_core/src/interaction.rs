//! Logged assistant interactions.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged AI-assistant interaction.
///
/// The quota ledger derives window usage by summing `credits_used` over the
/// log; there is no separate counter to reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantInteraction {
    /// Log row identifier.
    pub id: Uuid,
    /// User who asked.
    pub user_id: UserId,
    /// Declared weight of the interaction; defaults to 1.
    pub credits_used: u32,
    /// When the interaction happened.
    pub created_at: DateTime<Utc>,
}
