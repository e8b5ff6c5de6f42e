//! Configuration error types.

/// Configuration error raised while assembling component configs.
///
/// Components never read the process environment ad hoc; they are handed an
/// explicit config object whose `from_env` constructor is the only place a
/// missing variable can surface, as this error.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a missing environment variable.
    #[track_caller]
    pub fn missing_var(name: &str) -> Self {
        Self::new(format!("{name} not set"))
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Configuration Error: {} at line {} in {}",
            self.message, self.line, self.file
        )
    }
}

impl std::error::Error for ConfigError {}
