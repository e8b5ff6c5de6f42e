//! Seam over the Meta Graph API.

use crate::OauthError;
use async_trait::async_trait;

/// Token returned by a code or extension exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphToken {
    /// The bearer token.
    pub access_token: String,
    /// Seconds until expiry, when the platform reported one.
    pub expires_in: Option<i64>,
}

/// A page reachable by a connected token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Page id.
    pub id: String,
    /// Page display name.
    pub name: String,
    /// Page-scoped access token used for publishing.
    pub access_token: String,
}

/// Instagram business account linked to a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstagramAccount {
    /// Business account id.
    pub id: String,
    /// Account username, when exposed.
    pub username: Option<String>,
}

/// The Graph API operations the callback flow needs.
///
/// `MetaGraphClient` implements this over HTTP; tests substitute a fake.
#[async_trait]
pub trait MetaGraph: Send + Sync {
    /// Exchange an authorization code for a short-lived token.
    async fn exchange_code(&self, code: &str) -> Result<GraphToken, OauthError>;

    /// Exchange a short-lived token for a long-lived one.
    async fn extend_token(&self, token: &str) -> Result<GraphToken, OauthError>;

    /// List the pages reachable by a token.
    async fn pages(&self, token: &str) -> Result<Vec<PageInfo>, OauthError>;

    /// Look up the Instagram business account linked to a page, if any.
    async fn instagram_account(
        &self,
        page: &PageInfo,
    ) -> Result<Option<InstagramAccount>, OauthError>;
}
