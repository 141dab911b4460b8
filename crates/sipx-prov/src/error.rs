use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type PremisResult<T> = Result<T, PremisError>;

/// Errors that can occur while reading, updating or writing a PREMIS file.
#[derive(Debug, Error)]
pub enum PremisError {
    #[error("no root premis element found")]
    NoRoot,

    #[error("malformed PREMIS document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("truncated PREMIS document: <{0}> is never closed")]
    Truncated(String),

    #[error("element not found: object with originalName {0:?}")]
    ElementNotFound(String),

    #[error("event has no target objects")]
    NoEventTargets,

    #[error("failed to list content files: {0}")]
    Scan(#[from] sipx_manifest::ManifestError),

    #[error("format identification failed for {}: {message}", .path.display())]
    Identify { path: PathBuf, message: String },

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl PremisError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
