//! Error types for the OAuth flow.

use cadence_error::StoreError;

/// Error kinds for OAuth operations.
#[derive(Debug, Clone, derive_more::Display)]
pub enum OauthErrorKind {
    /// The `state` parameter failed signature or expiry validation.
    #[display("Invalid state token: {_0}")]
    InvalidState(String),
    /// The `state` nonce was already consumed (replay or double callback).
    #[display("State token already used")]
    StateReplayed,
    /// A token exchange round-trip failed.
    #[display("Token exchange failed: {_0}")]
    Exchange(String),
    /// Account discovery against the graph API failed.
    #[display("Account discovery failed: {_0}")]
    Discovery(String),
    /// Underlying store failure.
    #[display("Store failure: {_0}")]
    Store(StoreError),
}

impl OauthErrorKind {
    /// Short indicator used in the post-callback redirect.
    pub fn indicator(&self) -> &'static str {
        match self {
            OauthErrorKind::InvalidState(_) => "invalid_state",
            OauthErrorKind::StateReplayed => "state_replayed",
            OauthErrorKind::Exchange(_) => "exchange_failed",
            OauthErrorKind::Discovery(_) => "discovery_failed",
            OauthErrorKind::Store(_) => "store_failure",
        }
    }
}

impl From<StoreError> for OauthErrorKind {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<jsonwebtoken::errors::Error> for OauthErrorKind {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidState(err.to_string())
    }
}

/// OAuth error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("OAuth Error: {} at line {} in {}", kind, line, file)]
pub struct OauthError {
    kind: OauthErrorKind,
    line: u32,
    file: &'static str,
}

impl OauthError {
    /// Create a new OAuth error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: OauthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &OauthErrorKind {
        &self.kind
    }
}

impl<T> From<T> for OauthError
where
    T: Into<OauthErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}
