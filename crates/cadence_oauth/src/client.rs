//! `reqwest` implementation of the Graph API seam.

use crate::{GraphToken, InstagramAccount, MetaGraph, OauthError, OauthErrorKind, PageInfo};
use async_trait::async_trait;
use cadence_error::ConfigError;
use derive_getters::Getters;
use serde::Deserialize;
use tracing::instrument;

/// Connection settings for the Graph API.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GraphConfig {
    /// Base URL, injectable so tests can point at a fake server.
    base_url: String,
    /// App client id.
    client_id: String,
    /// App client secret.
    client_secret: String,
    /// Redirect URI registered with the app.
    redirect_uri: String,
}

impl GraphConfig {
    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `META_GRAPH_BASE_URL` (default: "https://graph.facebook.com/v19.0")
    /// - `META_CLIENT_ID` (required)
    /// - `META_CLIENT_SECRET` (required)
    /// - `META_REDIRECT_URI` (required)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("META_GRAPH_BASE_URL")
            .unwrap_or_else(|_| "https://graph.facebook.com/v19.0".to_string());
        let client_id =
            std::env::var("META_CLIENT_ID").map_err(|_| ConfigError::missing_var("META_CLIENT_ID"))?;
        let client_secret = std::env::var("META_CLIENT_SECRET")
            .map_err(|_| ConfigError::missing_var("META_CLIENT_SECRET"))?;
        let redirect_uri = std::env::var("META_REDIRECT_URI")
            .map_err(|_| ConfigError::missing_var("META_REDIRECT_URI"))?;

        GraphConfigBuilder::default()
            .base_url(base_url)
            .client_id(client_id)
            .client_secret(client_secret)
            .redirect_uri(redirect_uri)
            .build()
            .map_err(|e| ConfigError::new(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PageList {
    data: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    id: String,
    name: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PageIgLinkage {
    instagram_business_account: Option<IgEntry>,
}

#[derive(Debug, Deserialize)]
struct IgEntry {
    id: String,
    username: Option<String>,
}

/// HTTP client for the Meta Graph API.
#[derive(Debug, Clone)]
pub struct MetaGraphClient {
    config: GraphConfig,
    client: reqwest::Client,
}

impl MetaGraphClient {
    /// Create a client for the configured app.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        kind: fn(String) -> OauthErrorKind,
    ) -> Result<T, OauthError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| OauthError::new(kind(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OauthError::new(kind(format!(
                "{url} answered {status}"
            ))));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| OauthError::new(kind(format!("malformed response: {e}"))))
    }
}

#[async_trait]
impl MetaGraph for MetaGraphClient {
    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<GraphToken, OauthError> {
        let url = format!("{}/oauth/access_token", self.config.base_url());
        let token: TokenResponse = self
            .get_json(
                &url,
                &[
                    ("client_id", self.config.client_id().as_str()),
                    ("client_secret", self.config.client_secret().as_str()),
                    ("redirect_uri", self.config.redirect_uri().as_str()),
                    ("code", code),
                ],
                OauthErrorKind::Exchange,
            )
            .await?;
        Ok(GraphToken {
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }

    #[instrument(skip_all)]
    async fn extend_token(&self, token: &str) -> Result<GraphToken, OauthError> {
        let url = format!("{}/oauth/access_token", self.config.base_url());
        let token: TokenResponse = self
            .get_json(
                &url,
                &[
                    ("grant_type", "fb_exchange_token"),
                    ("client_id", self.config.client_id().as_str()),
                    ("client_secret", self.config.client_secret().as_str()),
                    ("fb_exchange_token", token),
                ],
                OauthErrorKind::Exchange,
            )
            .await?;
        Ok(GraphToken {
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }

    #[instrument(skip_all)]
    async fn pages(&self, token: &str) -> Result<Vec<PageInfo>, OauthError> {
        let url = format!("{}/me/accounts", self.config.base_url());
        let list: PageList = self
            .get_json(&url, &[("access_token", token)], OauthErrorKind::Discovery)
            .await?;
        Ok(list
            .data
            .into_iter()
            .map(|page| PageInfo {
                id: page.id,
                name: page.name,
                access_token: page.access_token,
            })
            .collect())
    }

    #[instrument(skip_all, fields(page = %page.id))]
    async fn instagram_account(
        &self,
        page: &PageInfo,
    ) -> Result<Option<InstagramAccount>, OauthError> {
        let url = format!("{}/{}", self.config.base_url(), page.id);
        let linkage: PageIgLinkage = self
            .get_json(
                &url,
                &[
                    ("fields", "instagram_business_account{id,username}"),
                    ("access_token", page.access_token.as_str()),
                ],
                OauthErrorKind::Discovery,
            )
            .await?;
        Ok(linkage.instagram_business_account.map(|ig| InstagramAccount {
            id: ig.id,
            username: ig.username,
        }))
    }
}
