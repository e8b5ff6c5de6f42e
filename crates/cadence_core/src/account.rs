//! Connected social accounts.

use crate::{AccountId, Provider, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A social account connected by a user via the OAuth flow.
///
/// Exclusively owned by the connecting user. The fan-out component reads
/// these to gate scheduling: a `needs_reconnect` account blocks the whole
/// batch for its provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialAccount {
    /// Connecting user.
    pub user_id: UserId,
    /// Platform the account lives on.
    pub provider: Provider,
    /// Platform-assigned account identifier.
    pub account_id: AccountId,
    /// Display name reported by the platform at discovery time.
    pub display_name: Option<String>,
    /// Current access token.
    pub access_token: String,
    /// Token expiry, when the platform reported one.
    pub expires_at: Option<DateTime<Utc>>,
    /// Set when a token health check failed; cleared by a fresh OAuth flow.
    pub needs_reconnect: bool,
    /// Scopes granted to the token.
    pub scopes: Vec<String>,
}
