//! Error taxonomy for the page store, renderer and asset builder.
//!
//! | Error            | Fatal? | Surfaced as                          |
//! |------------------|--------|--------------------------------------|
//! | [`AddressError`] | yes    | rejected request                     |
//! | [`StorageError`] | yes    | failed request (no automatic retry)  |
//! | [`ToolFailure`]  | no     | mapped to a [`RenderWarning`]        |
//! | [`RenderWarning`]| no     | inline warning block + warning list  |

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub use crate::address::AddressError;
use crate::address::PageAddress;

/// Filesystem failures while mutating or reading the page tree.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{op} `{}` failed", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("page {0} already exists")]
    Conflict(PageAddress),

    #[error("cannot move {from} under itself ({to})")]
    IntoDescendant { from: PageAddress, to: PageAddress },

    #[error("the wiki root cannot be moved or removed")]
    RootImmutable,
}

impl StorageError {
    /// Wrap an io error with the operation and path that caused it.
    pub fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { op, path, source }
    }
}

/// External toolchain failures. Never fatal to a render.
#[derive(Debug, Clone, Error)]
pub enum ToolFailure {
    #[error("failed to start `{program}`: {reason}")]
    Spawn { program: String, reason: String },

    #[error("`{program}` exited with {status}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("`{program}` timed out after {}s", after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("expected output `{}` was not produced", .0.display())]
    MissingOutput(PathBuf),

    #[error("source rejected: {0}")]
    Rejected(String),

    #[error("post-processing failed: {0}")]
    PostProcess(String),
}

/// Category of a non-fatal render problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A figure/animation could not be built.
    Asset,
    /// A referenced image file does not exist.
    MissingImage,
    /// Directive content could not be parsed.
    Directive,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asset => "asset",
            Self::MissingImage => "image",
            Self::Directive => "directive",
        })
    }
}

/// A problem that degraded, but did not abort, a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl RenderWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Errors of the page CRUD surface.
#[derive(Debug, Error)]
pub enum WikiError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("page {0} does not exist")]
    NotFound(PageAddress),

    #[error("pdf build failed: {0}")]
    Pdf(#[source] ToolFailure),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::io("rename", "/tmp/wiki/a")(Error::new(
            ErrorKind::PermissionDenied,
            "denied",
        ));
        let display = err.to_string();
        assert!(display.contains("rename"));
        assert!(display.contains("/tmp/wiki/a"));
    }

    #[test]
    fn test_tool_failure_display() {
        let err = ToolFailure::Timeout {
            program: "pdflatex".into(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "`pdflatex` timed out after 30s");
    }

    #[test]
    fn test_warning_display() {
        let w = RenderWarning::new(WarningKind::MissingImage, "Missing image : cat.png");
        assert_eq!(w.to_string(), "[image] Missing image : cat.png");
    }
}
