use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ManifestResult<T> = Result<T, ManifestError>;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("malformed manifest XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("truncated manifest: <{0}> is never closed")]
    Truncated(String),

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("unsupported checksum algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("unknown package type: {0:?}")]
    UnknownPackageType(String),
}

impl ManifestError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
