//! Typed error handling for dexcount.
//!
//! Resolution failures abort a count before any work is dispatched.
//! Counting failures are attributed to a single dependency and never stop
//! the rest of the closure from being counted.

use std::path::PathBuf;
use thiserror::Error;

use crate::dependency::Dependency;

/// Main error type for dexcount operations.
#[derive(Error, Debug)]
pub enum DexcountError {
    /// Malformed dependency string or resolver report line
    #[error("Format error: {message}")]
    Format { message: String },

    /// The resolver could not produce a dependency tree
    #[error("Resolution error: {message}")]
    Resolution { message: String },

    /// A single dependency could not be counted
    #[error("Error checking {dependency}: {message}")]
    Counting {
        dependency: Dependency,
        message: String,
        #[source]
        source: Option<Box<DexcountError>>,
    },

    /// The resolved artifact has a format the counter does not handle
    #[error("Unknown dependency format for {dependency}: {location}")]
    UnsupportedFormat {
        dependency: Dependency,
        location: String,
    },

    /// An external tool (gradle, dx) failed or produced unusable output
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Missing or invalid configuration (dx path, gradle directory)
    #[error("Config error: {message}")]
    Config { message: String },
}

impl DexcountError {
    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a resolution error.
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }

    /// Create a counting error for a dependency without an underlying cause.
    pub fn counting(dependency: &Dependency, message: impl Into<String>) -> Self {
        Self::Counting {
            dependency: dependency.clone(),
            message: message.into(),
            source: None,
        }
    }

    /// Attribute an underlying failure to the dependency being counted.
    pub fn counting_caused_by(dependency: &Dependency, cause: DexcountError) -> Self {
        Self::Counting {
            dependency: dependency.clone(),
            message: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create an unsupported-format error.
    pub fn unsupported_format(dependency: &Dependency, location: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            dependency: dependency.clone(),
            location: location.into(),
        }
    }

    /// Create a tool error.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error aborts a whole count (as opposed to one node).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Format { .. } | Self::Resolution { .. } | Self::Config { .. }
        )
    }

    /// Get the dependency this error is attributed to, if any.
    pub fn dependency(&self) -> Option<&Dependency> {
        match self {
            Self::Counting { dependency, .. } => Some(dependency),
            Self::UnsupportedFormat { dependency, .. } => Some(dependency),
            _ => None,
        }
    }
}

/// Convenience type alias for dexcount results.
pub type DexcountResult<T> = Result<T, DexcountError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DexcountResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DexcountResult<T> {
        self.map_err(|e| DexcountError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn okhttp() -> Dependency {
        Dependency::new("com.squareup.okhttp3", "okhttp", "4.12.0")
    }

    #[test]
    fn test_io_error() {
        let err = DexcountError::io(
            PathBuf::from("/cache/aars/a-b-1.jar"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(matches!(err, DexcountError::Io { .. }));
        assert!(err.to_string().contains("/cache/aars/a-b-1.jar"));
    }

    #[test]
    fn test_counting_error_names_dependency() {
        let err = DexcountError::counting(&okhttp(), "No Path");
        assert_eq!(err.dependency(), Some(&okhttp()));
        assert_eq!(
            err.to_string(),
            "Error checking com.squareup.okhttp3:okhttp:4.12.0: No Path"
        );
    }

    #[test]
    fn test_counting_caused_by_keeps_source() {
        let err = DexcountError::counting_caused_by(&okhttp(), DexcountError::tool("dx", "boom"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("dx failed: boom"));
    }

    #[test]
    fn test_is_fatal() {
        assert!(DexcountError::format("bad").is_fatal());
        assert!(DexcountError::resolution("gradle exited 1").is_fatal());
        assert!(!DexcountError::counting(&okhttp(), "x").is_fatal());
        assert!(!DexcountError::unsupported_format(&okhttp(), "lib.so").is_fatal());
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let converted = result.with_path("/missing/classes.jar");
        assert!(matches!(converted, Err(DexcountError::Io { .. })));
    }
}
