//! Data store error types.

/// Error kinds for data store operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum StoreErrorKind {
    /// Connection or pool failure. Safe to retry.
    #[display("Connection error: {_0}")]
    Connection(String),
    /// Query construction or execution failure.
    #[display("Query error: {_0}")]
    Query(String),
    /// Referenced row does not exist.
    #[display("Not found: {_0}")]
    NotFound(String),
    /// State or uniqueness conflict, e.g. a guarded update whose guard failed.
    #[display("Conflict: {_0}")]
    Conflict(String),
}

/// Data store error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    kind: StoreErrorKind,
    line: u32,
    file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoreErrorKind {
        &self.kind
    }

    /// Whether retrying the failed operation may succeed.
    ///
    /// Only connection-level failures qualify; query, not-found, and
    /// conflict errors are deterministic and retrying cannot change them.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, StoreErrorKind::Connection(_))
    }
}

impl<T> From<T> for StoreError
where
    T: Into<StoreErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Convenience alias for store operation results.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let conn = StoreError::new(StoreErrorKind::Connection("pool exhausted".into()));
        assert!(conn.is_transient());

        let missing = StoreError::new(StoreErrorKind::NotFound("row 7".into()));
        assert!(!missing.is_transient());

        let conflict = StoreError::new(StoreErrorKind::Conflict("already decided".into()));
        assert!(!conflict.is_transient());
    }

    #[test]
    fn test_display_includes_location() {
        let err = StoreError::new(StoreErrorKind::Query("bad cast".into()));
        let rendered = err.to_string();
        assert!(rendered.contains("Query error: bad cast"));
        assert!(rendered.contains("store.rs"));
    }
}
