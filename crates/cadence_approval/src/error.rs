//! Error types for the approval workflow.

use cadence_core::ApprovalStatus;
use cadence_error::StoreError;

/// Error kinds for approval operations.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ApprovalErrorKind {
    /// No profile for the acting user.
    #[display("Not authenticated")]
    Unauthenticated,
    /// The acting user's plan does not include approval workflows.
    #[display("Approval workflows are not available on the current plan")]
    FeatureNotAvailable,
    /// The team has no member eligible to review.
    #[display("No eligible reviewer in the team")]
    NoReviewerAvailable,
    /// The approval record does not exist (or is not visible to the caller).
    #[display("Approval request not found")]
    NotFound,
    /// The record has already left the pending state.
    #[display("Approval already decided ({from}), no further transition allowed")]
    InvalidStateTransition {
        /// Status the record is currently in.
        from: ApprovalStatus,
    },
    /// Underlying store failure.
    #[display("Store failure: {_0}")]
    Store(StoreError),
}

impl From<StoreError> for ApprovalErrorKind {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Approval error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Approval Error: {} at line {} in {}", kind, line, file)]
pub struct ApprovalError {
    kind: ApprovalErrorKind,
    line: u32,
    file: &'static str,
}

impl ApprovalError {
    /// Create a new approval error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ApprovalErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ApprovalErrorKind {
        &self.kind
    }
}

impl<T> From<T> for ApprovalError
where
    T: Into<ApprovalErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}
