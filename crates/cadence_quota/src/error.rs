//! Error types for the quota ledger.

use cadence_error::StoreError;
use chrono::{DateTime, Utc};

/// Error kinds for quota operations.
#[derive(Debug, Clone, derive_more::Display)]
pub enum QuotaErrorKind {
    /// No profile for the acting user.
    #[display("Not authenticated")]
    Unauthenticated,
    /// The window allowance is spent. An expected, user-facing condition.
    #[display("Assistant quota exhausted, next reset at {resets_at}")]
    Exhausted {
        /// When a fresh allowance opens.
        resets_at: DateTime<Utc>,
    },
    /// Underlying store failure.
    #[display("Store failure: {_0}")]
    Store(StoreError),
}

impl From<StoreError> for QuotaErrorKind {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Quota error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Quota Error: {} at line {} in {}", kind, line, file)]
pub struct QuotaError {
    kind: QuotaErrorKind,
    line: u32,
    file: &'static str,
}

impl QuotaError {
    /// Create a new quota error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: QuotaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &QuotaErrorKind {
        &self.kind
    }
}

impl<T> From<T> for QuotaError
where
    T: Into<QuotaErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}
