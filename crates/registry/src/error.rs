//! Error types for registry operations.
//!
//! Errors are categorized so callers can tell throttling apart from a
//! missing plugin or a broken network.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of registry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient, retryable).
    Network,
    /// The remote is throttling requests.
    RateLimit,
    /// Plugin, release or asset not found.
    NotFound,
    /// Malformed registry or asset data.
    Format,
    /// Local filesystem error.
    Io,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::RateLimit)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::RateLimit => "Rate limit exceeded",
            Self::NotFound => "Plugin or release not found",
            Self::Format => "Invalid registry data",
            Self::Io => "Filesystem error",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::RateLimit => "Wait a while before trying again",
            Self::NotFound => "Verify the plugin id and version are correct",
            Self::Format => "The registry response may be corrupted, try again",
            Self::Io => "Check directory permissions and free space",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The remote answered 403/429.
    #[error("API rate limit exceeded (HTTP {status}), try again later")]
    RateLimited {
        /// HTTP status code.
        status: u16,
    },

    /// Plugin id is not in the community registry.
    #[error("plugin not found in registry: {0}")]
    PluginNotFound(String),

    /// A release asset does not exist.
    #[error("{file} not found in release {version} of {repo}")]
    AssetNotFound {
        /// Repository `owner/name`.
        repo: String,
        /// Release version or `latest`.
        version: String,
        /// Asset file name.
        file: String,
    },

    /// Reading an asset body failed.
    #[error("download failed for {repo}: {message}")]
    DownloadFailed {
        /// Repository `owner/name`.
        repo: String,
        /// Error message.
        message: String,
    },

    /// IO error during cache operations.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Invalid response body.
    #[error("invalid registry response: {0}")]
    InvalidResponse(String),

    /// An earlier registry fetch in this run failed.
    #[error("registry unavailable: {message}")]
    RegistryUnavailable {
        /// Category of the original failure.
        category: ErrorCategory,
        /// Message of the original failure.
        message: String,
    },

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an error from an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            403 | 429 => Self::RateLimited { status },
            _ => Self::HttpError {
                message: format!("HTTP {status}"),
                status: Some(status),
            },
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::HttpError { .. } | Error::DownloadFailed { .. } => ErrorCategory::Network,
            Error::RateLimited { .. } => ErrorCategory::RateLimit,
            Error::PluginNotFound(_) | Error::AssetNotFound { .. } => ErrorCategory::NotFound,
            Error::Io { .. } => ErrorCategory::Io,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::RegistryUnavailable { category, .. } => *category,
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Rebuild an equivalent error for a memoized failure.
    ///
    /// Variants that carry plain data are copied as-is; the rest keep their
    /// category and message.
    #[must_use]
    pub fn replay(&self) -> Self {
        match self {
            Error::RateLimited { status } => Error::RateLimited { status: *status },
            Error::HttpError { message, status } => Error::HttpError {
                message: message.clone(),
                status: *status,
            },
            Error::InvalidResponse(message) => Error::InvalidResponse(message.clone()),
            Error::RegistryUnavailable { category, message } => Error::RegistryUnavailable {
                category: *category,
                message: message.clone(),
            },
            other => Error::RegistryUnavailable {
                category: other.category(),
                message: other.to_string(),
            },
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::from_status(code),
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
