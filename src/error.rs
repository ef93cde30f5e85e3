//! Error types for a validation run.

use std::io;

/// Fatal failures of a validation run.
///
/// Findings reported by the checker are never errors; they travel in the
/// report and only affect the exit code through the checker's own status.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("No files to check.")]
    NoFiles,

    #[error("Java is missing: {0}")]
    RuntimeUnavailable(#[source] io::Error),

    #[error("Java is missing: `{program} -version` exited with {status}")]
    RuntimeFailed { program: String, status: String },

    #[error("Something went wrong. Java output is null.")]
    ProbeOutputMissing,

    #[error("Something went wrong. Java version not found.")]
    VersionNotFound,

    #[error("Something went wrong. Can't determine installed Java version from \"{0}\".")]
    VersionUnparsable(String),

    #[error("Unsupported Java version used: {0}. Java 8 environment or up is required.")]
    UnsupportedVersion(String),

    #[error("Failed to launch the validator: {0}")]
    Launch(#[source] io::Error),

    #[error("Validator output exceeded {limit} bytes.")]
    OutputLimit { limit: usize },

    #[error("Validator output is not a valid JSON report: {0}")]
    ReportParse(#[from] serde_json::Error),
}

impl RunError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type alias for validation runs
pub type Result<T> = std::result::Result<T, RunError>;
