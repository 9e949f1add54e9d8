use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all depgather operations.
#[derive(Debug, Error, Diagnostic)]
pub enum GatherError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A version string could not be parsed.
    #[error("Invalid version: '{input}'")]
    #[diagnostic(help("Versions have 1 to 4 numeric parts, e.g. 1.2.3 or 1.2.3-beta.1+build"))]
    InvalidVersion { input: String },

    /// A version range expression could not be parsed.
    #[error("Invalid version range: '{input}'")]
    #[diagnostic(help("Use a version (1.0.0), a float (1.*) or an interval ([1.0, 2.0))"))]
    InvalidRange { input: String },

    /// The operation was cancelled through its cancellation token.
    #[error("Operation was cancelled")]
    Cancelled,

    /// A package source failed to answer a query.
    #[error("Package source query for '{id}' failed: {message}")]
    SourceQuery { id: String, message: String },

    /// A local package feed is missing or malformed.
    #[error("Feed error: {message}")]
    #[diagnostic(help("Check the feed file for TOML syntax errors"))]
    Feed { message: String },

    /// The configuration file is malformed.
    #[error("Config error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

impl GatherError {
    pub fn invalid_version(input: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
        }
    }

    pub fn invalid_range(input: impl Into<String>) -> Self {
        Self::InvalidRange {
            input: input.into(),
        }
    }

    pub fn source_query(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceQuery {
            id: id.into(),
            message: message.into(),
        }
    }

    /// `true` if this error is a cancellation rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Convenience alias for results carrying a [`GatherError`].
pub type GatherResult<T> = Result<T, GatherError>;
