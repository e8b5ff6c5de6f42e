//! Error types for the publishing pipeline.

use cadence_core::Provider;
use cadence_error::StoreError;

/// Error kinds for scheduling operations.
#[derive(Debug, Clone, derive_more::Display)]
pub enum PublishErrorKind {
    /// No profile for the acting user.
    #[display("Not authenticated")]
    Unauthenticated,
    /// The request carried no targets.
    #[display("No publish target selected")]
    NoTargetSelected,
    /// Schedule mode without a schedule time.
    #[display("Schedule time is required when scheduling")]
    MissingScheduleTime,
    /// One or more accounts need a fresh OAuth connection. The whole batch
    /// was rejected; no rows were written.
    #[display("Account reconnect required for {providers:?}")]
    NeedsReconnect {
        /// Providers whose accounts failed the health gate.
        providers: Vec<Provider>,
    },
    /// The content item does not exist or is not owned by the caller.
    /// Deliberately indistinguishable to avoid leaking existence.
    #[display("Post not found")]
    PostNotFound,
    /// The automation webhook failed after rows were committed. The rows
    /// were marked failed; nothing was rolled back.
    #[display("Automation dispatch failed, {rows} tracking rows marked failed")]
    DispatchFailed {
        /// Number of rows the compensation pass covered.
        rows: usize,
    },
    /// Underlying store failure.
    #[display("Store failure: {_0}")]
    Store(StoreError),
}

impl From<StoreError> for PublishErrorKind {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Publishing error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Publish Error: {} at line {} in {}", kind, line, file)]
pub struct PublishError {
    kind: PublishErrorKind,
    line: u32,
    file: &'static str,
}

impl PublishError {
    /// Create a new publishing error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PublishErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PublishErrorKind {
        &self.kind
    }
}

impl<T> From<T> for PublishError
where
    T: Into<PublishErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}
