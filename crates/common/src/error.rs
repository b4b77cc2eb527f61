//! Error types shared across draftcut crates.

use std::path::PathBuf;

/// Top-level error type for draft editing operations.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// An unresolved draft, track, segment, material, or catalog name.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Out-of-range offsets, malformed materials, bad template shape.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Document content this engine cannot read (e.g. an encrypted draft).
    #[error("Unsupported document: {message}")]
    Unsupported { message: String },

    /// A multi-segment operation that applied to some segments only.
    #[error("Partial failure: {message} ({} applied, {} failed)", affected.len(), failed.len())]
    PartialFailure {
        message: String,
        /// Segment ids the operation was applied to.
        affected: Vec<String>,
        /// `(segment id, reason)` for every segment that was skipped.
        failed: Vec<(String, String)>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DraftError.
pub type DraftResult<T> = Result<T, DraftError>;

impl DraftError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            message: msg.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Stable machine-readable code, used by callers that report errors
    /// over a wire (HTTP status mapping, batch reports).
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Unsupported { .. } => "UNSUPPORTED",
            Self::PartialFailure { .. } => "PARTIAL_FAILURE",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "PARSE_ERROR",
            Self::Other(_) => "INTERNAL",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::FileNotFound { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
