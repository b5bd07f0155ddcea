//! Error types for the fallible edges of the editor.
//!
//! The document core itself never fails. Errors only come from the
//! markdown converter (always recovered), the export collaborator and the
//! secondary display adapter.

use std::path::PathBuf;

use thiserror::Error;

/// The markdown converter could not produce HTML for some input.
///
/// Never escapes the render pipeline: it is logged and replaced by a
/// literal rendering of the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("markdown converter panicked: {0}")]
    ConverterPanicked(String),
}

/// Writing the document to its destination failed.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export cancelled")]
    Cancelled,

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Write failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Classify an I/O error raised while writing `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether the user backed out rather than the write failing.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A secondary display switch could not be completed.
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("No secondary display available")]
    Unsupported,

    #[error("Secondary display {} unavailable: {source}", path.display())]
    Device {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_classified() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = ExportError::from_io("/root/out.md", io_err);
        assert!(matches!(err, ExportError::PermissionDenied { .. }));
        assert_eq!(err.to_string(), "Permission denied: /root/out.md");
    }

    #[test]
    fn test_other_io_errors_keep_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = ExportError::from_io("out.md", io_err);
        assert!(matches!(err, ExportError::Io { .. }));
        assert!(err.to_string().contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ExportError::Cancelled.to_string(), "Export cancelled");
        assert!(ExportError::Cancelled.is_cancelled());

        let err = ExportError::InvalidDestination("empty file name".to_string());
        assert_eq!(err.to_string(), "Invalid destination: empty file name");

        assert_eq!(
            DisplayError::Unsupported.to_string(),
            "No secondary display available"
        );
        assert_eq!(
            RenderError::ConverterPanicked("boom".to_string()).to_string(),
            "markdown converter panicked: boom"
        );
    }
}
