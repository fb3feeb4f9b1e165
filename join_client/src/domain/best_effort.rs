use std::fmt::Display;
use tracing::warn;

/// Outcome of an operation whose failure must not stop the calling flow.
///
/// It has no conversion into a `Result`; callers inspect it or `acknowledge`
/// it, which logs a failure and moves on.
#[must_use = "best-effort outcomes must be acknowledged"]
#[derive(Debug, PartialEq, Eq)]
pub struct BestEffort {
    operation: &'static str,
    failure: Option<String>,
}

impl BestEffort {
    pub fn succeeded(operation: &'static str) -> Self {
        Self {
            operation,
            failure: None,
        }
    }

    pub fn failed(operation: &'static str, err: impl Display) -> Self {
        Self {
            operation,
            failure: Some(err.to_string()),
        }
    }

    pub fn from_result<T, E: Display>(operation: &'static str, result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::succeeded(operation),
            Err(err) => Self::failed(operation, err),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Logs a failure and reports whether the operation succeeded.
    pub fn acknowledge(self) -> bool {
        match self.failure {
            None => true,
            Some(error) => {
                warn!(operation = self.operation, %error, "best-effort operation failed");
                false
            }
        }
    }
}
