//! The OAuth callback service.

use crate::{MetaGraph, OauthError, OauthErrorKind, StateCodec};
use cadence_core::{AccountId, Provider, PublishTarget, SocialAccount, TargetId, UserId};
use cadence_store::{OauthStateStore, SocialAccountStore};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// One account discovered and stored during a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedTarget {
    /// Platform of the discovered account.
    pub provider: Provider,
    /// Platform-assigned account id.
    pub account_id: AccountId,
    /// Display name reported by the platform.
    pub display_name: String,
}

/// Result of a completed callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OauthOutcome {
    /// User the accounts were linked to.
    pub user: UserId,
    /// Provider the flow was started for.
    pub provider: Provider,
    /// Every account stored, Facebook pages and linked Instagram accounts.
    pub connected: Vec<ConnectedTarget>,
}

/// Completes the provider redirect: state validation, token exchange, and
/// target discovery.
pub struct OauthCallback<S, G> {
    store: Arc<S>,
    graph: Arc<G>,
    codec: StateCodec,
}

impl<S, G> OauthCallback<S, G>
where
    S: SocialAccountStore + OauthStateStore,
    G: MetaGraph,
{
    /// Create a callback service over the given store and graph client.
    pub fn new(store: Arc<S>, graph: Arc<G>, codec: StateCodec) -> Self {
        Self { store, graph, codec }
    }

    /// Begin a connect flow: sign a state token and store its nonce.
    ///
    /// The returned token goes into the provider redirect URL verbatim.
    #[instrument(skip(self))]
    pub async fn begin(&self, user: UserId, provider: Provider) -> Result<String, OauthError> {
        let issued = self.codec.issue(user, provider)?;
        self.store.issue_nonce(&issued.nonce).await?;
        Ok(issued.token)
    }

    /// Complete a callback with the provider's `code` and our `state`.
    ///
    /// Upserts are keyed by `(user, provider, account_id)`, so running the
    /// flow twice against the same reachable accounts stores each account
    /// once. A page without a linked Instagram business account yields no
    /// Instagram records, silently.
    ///
    /// # Errors
    ///
    /// `InvalidState` for a forged or expired state, `StateReplayed` for a
    /// consumed nonce, `Exchange`/`Discovery` for provider failures.
    #[instrument(skip_all)]
    pub async fn complete(&self, code: &str, state: &str) -> Result<OauthOutcome, OauthError> {
        let verified = self.codec.verify(state)?;
        if !self.store.consume_nonce(&verified.nonce).await? {
            return Err(OauthError::new(OauthErrorKind::StateReplayed));
        }

        let short = self.graph.exchange_code(code).await?;
        // The platform may reject the long-lived exchange while the
        // short-lived token stays usable; fall back rather than fail.
        let token = match self.graph.extend_token(&short.access_token).await {
            Ok(long) => long,
            Err(e) => {
                warn!(error = %e, "long-lived exchange failed, keeping short-lived token");
                short
            }
        };
        let expires_at = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));

        let pages = self.graph.pages(&token.access_token).await?;
        debug!(pages = pages.len(), "discovered pages");

        let mut connected = Vec::new();
        for page in &pages {
            self.store
                .upsert_account(SocialAccount {
                    user_id: verified.user,
                    provider: Provider::Facebook,
                    account_id: AccountId::from(page.id.clone()),
                    display_name: Some(page.name.clone()),
                    access_token: page.access_token.clone(),
                    expires_at,
                    needs_reconnect: false,
                    scopes: Vec::new(),
                })
                .await?;
            self.store
                .upsert_target(
                    verified.user,
                    PublishTarget {
                        provider: Provider::Facebook,
                        account_id: AccountId::from(page.id.clone()),
                        target_id: TargetId::from(page.id.clone()),
                    },
                    &page.name,
                )
                .await?;
            connected.push(ConnectedTarget {
                provider: Provider::Facebook,
                account_id: AccountId::from(page.id.clone()),
                display_name: page.name.clone(),
            });

            let Some(instagram) = self.graph.instagram_account(page).await? else {
                continue;
            };
            let display_name = instagram.username.clone().unwrap_or_else(|| page.name.clone());
            self.store
                .upsert_account(SocialAccount {
                    user_id: verified.user,
                    provider: Provider::Instagram,
                    account_id: AccountId::from(instagram.id.clone()),
                    display_name: Some(display_name.clone()),
                    // Instagram publishing rides on the page token.
                    access_token: page.access_token.clone(),
                    expires_at,
                    needs_reconnect: false,
                    scopes: Vec::new(),
                })
                .await?;
            self.store
                .upsert_target(
                    verified.user,
                    PublishTarget {
                        provider: Provider::Instagram,
                        account_id: AccountId::from(instagram.id.clone()),
                        target_id: TargetId::from(instagram.id.clone()),
                    },
                    &display_name,
                )
                .await?;
            connected.push(ConnectedTarget {
                provider: Provider::Instagram,
                account_id: AccountId::from(instagram.id),
                display_name,
            });
        }

        Ok(OauthOutcome {
            user: verified.user,
            provider: verified.provider,
            connected,
        })
    }
}

/// Where to send the browser after a callback, success or failure.
///
/// The integrations surface refreshes its account list on a success
/// indicator and shows a reconnect prompt on an error indicator.
pub fn completion_redirect(base: &str, result: &Result<OauthOutcome, OauthError>) -> String {
    match result {
        Ok(outcome) => format!("{base}?connected={}", outcome.connected.len()),
        Err(err) => format!("{base}?error={}", err.kind().indicator()),
    }
}
