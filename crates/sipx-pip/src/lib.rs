//! Identifier projection for the restructured preservation package.
//!
//! Files keep the identifiers their manifest assigned, but move to new
//! locations when a package is restructured. [`project_identifiers`] maps
//! each declared path to its new location and [`write_sidecar`] stores the
//! result as JSON.

mod project;
mod sidecar;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use project::{project_identifiers, project_path, Identifier, IdentifierRecord, LOCAL_TYPE};
pub use sidecar::{to_json, write_sidecar};

#[derive(Debug, Error)]
pub enum PipError {
    #[error("no files in manifest")]
    EmptyManifest,

    #[error("failed to serialize identifiers: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}
