//! Error types for fueltrack.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into four categories:
//! - **Configuration**: Config file parsing, validation, or missing values
//! - **Source**: The fill data source is missing, unreadable, or malformed
//! - **Usage**: Invalid command-line arguments
//! - **Internal**: I/O failures, serialization, or unclassified issues
//!
//! The statistics engine and the fill store never produce errors: every
//! variant here originates in a collaborator (config loading, the fetch
//! source, the CLI).
//!
//! Each error has a stable error code (e.g., `FT-C001`) for programmatic handling.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration issues (parse errors, invalid values).
    Configuration,
    /// Fill data source issues (missing file, malformed data, fetch failure).
    Source,
    /// Invalid arguments supplied by the caller.
    Usage,
    /// Internal errors (I/O, serialization, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Source => "Data source error",
            Self::Usage => "Usage error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Configuration => "C",
            Self::Source => "S",
            Self::Usage => "U",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Fill data file not found
    NotFound = 2,
    /// Parse/format errors, invalid configuration or arguments
    ParseError = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

/// Main error type for fueltrack operations.
#[derive(Error, Debug)]
pub enum FuelError {
    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error parsing configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid {
        key: String,
        value: String,
        message: String,
    },

    // ==========================================================================
    // Source errors (Category: Source)
    // ==========================================================================
    /// Fill data file does not exist.
    #[error("fill data not found: {path}")]
    SourceNotFound { path: String },

    /// Fill data could not be decoded.
    #[error("malformed fill data in {path}: {message}")]
    SourceParse { path: String, message: String },

    /// The fetch collaborator failed for another reason.
    #[error("failed to fetch fills: {reason}")]
    FetchFailed { reason: String },

    // ==========================================================================
    // Usage errors (Category: Usage)
    // ==========================================================================
    /// Invalid command-line argument.
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    // ==========================================================================
    // I/O errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FuelError {
    /// Map error to a process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::SourceNotFound { .. } => ExitCode::NotFound,

            Self::Config(_)
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::SourceParse { .. }
            | Self::InvalidArgument { .. } => ExitCode::ParseError,

            Self::FetchFailed { .. } | Self::Io(_) | Self::Json(_) | Self::Other(_) => {
                ExitCode::GeneralError
            }
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                ErrorCategory::Configuration
            }
            Self::SourceNotFound { .. } | Self::SourceParse { .. } | Self::FetchFailed { .. } => {
                ErrorCategory::Source
            }
            Self::InvalidArgument { .. } => ErrorCategory::Usage,
            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Stable error code, e.g. `FT-S001`.
    #[must_use]
    pub fn code(&self) -> String {
        let number = match self {
            Self::Config(_)
            | Self::SourceNotFound { .. }
            | Self::InvalidArgument { .. }
            | Self::Io(_) => 1,
            Self::ConfigParse { .. } | Self::SourceParse { .. } | Self::Json(_) => 2,
            Self::ConfigInvalid { .. } | Self::FetchFailed { .. } => 3,
            Self::Other(_) => 99,
        };
        format!("FT-{}{number:03}", self.category().code_prefix())
    }

    /// Whether retrying the same operation could succeed.
    ///
    /// Only transient source failures qualify; the refresh loop uses this to
    /// decide between a warning and an error log line.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::Io(_))
    }
}

/// Result type alias for fueltrack operations.
pub type Result<T> = std::result::Result<T, FuelError>;
