//! Error types for webhook dispatch.

/// Error kinds for webhook dispatch.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum WebhookErrorKind {
    /// The request never completed (DNS, connect, timeout).
    #[display("Dispatch failed: {_0}")]
    Dispatch(String),
    /// The endpoint answered with a non-success status.
    #[display("Endpoint {url} answered {status}")]
    Status {
        /// HTTP status code returned.
        status: u16,
        /// Endpoint that answered.
        url: String,
    },
}

/// Webhook dispatch error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Webhook Error: {} at line {} in {}", kind, line, file)]
pub struct WebhookError {
    kind: WebhookErrorKind,
    line: u32,
    file: &'static str,
}

impl WebhookError {
    /// Create a new webhook error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WebhookErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WebhookErrorKind {
        &self.kind
    }
}

impl<T> From<T> for WebhookError
where
    T: Into<WebhookErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}
