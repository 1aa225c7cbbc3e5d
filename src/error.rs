//! Error types for benchmark runs.

use std::sync::Arc;

/// Errors produced while initializing or running a benchmark.
///
/// Collaborator failures arrive as `anyhow::Error` and are wrapped in
/// [`BenchError::Submission`]. The error is `Clone` so that a [`RunResult`]
/// can be copied into records and reports.
///
/// [`RunResult`]: crate::RunResult
#[derive(Debug, Clone, thiserror::Error)]
pub enum BenchError {
    /// Invalid host list, unknown agent-controls mode, unreachable store, or a
    /// runner used out of order. Raised before any work starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The collaborator rejected a submission.
    ///
    /// Halts the runner's loop but is not fatal to the process; the caller
    /// decides whether other agents keep going.
    #[error("problem with iteration #{iteration}: {cause}")]
    Submission {
        /// Zero-based index of the failing iteration.
        iteration: usize,
        /// The collaborator's error.
        cause: Arc<anyhow::Error>,
    },

    /// The cancellation signal fired between iterations.
    #[error("benchmark cancelled")]
    Cancelled,

    /// Writing a generated dataset failed.
    #[error("i/o error: {0}")]
    Io(Arc<std::io::Error>),
}

impl BenchError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        BenchError::Configuration(message.into())
    }

    pub(crate) fn submission(iteration: usize, cause: anyhow::Error) -> Self {
        BenchError::Submission {
            iteration,
            cause: Arc::new(cause),
        }
    }

    /// Returns `true` for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, BenchError::Configuration(_))
    }

    /// Returns `true` if the run was cancelled rather than failed.
    ///
    /// Cancellations should not be reported as benchmark failures.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BenchError::Cancelled)
    }

    /// Returns the failing iteration for submission errors.
    pub fn iteration(&self) -> Option<usize> {
        match self {
            BenchError::Submission { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::Io(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_display_includes_iteration() {
        let err = BenchError::submission(3, anyhow::anyhow!("connection reset"));
        assert_eq!(err.iteration(), Some(3));
        assert!(err.to_string().contains("#3"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_cancelled_is_distinguishable() {
        assert!(BenchError::Cancelled.is_cancelled());
        assert!(!BenchError::Cancelled.is_configuration());
        let err = BenchError::submission(0, anyhow::anyhow!("boom"));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: BenchError = io.into();
        assert!(matches!(err, BenchError::Io(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
