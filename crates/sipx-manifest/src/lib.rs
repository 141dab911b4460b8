//! Manifest parsing and on-disk reconciliation for archival packages.
//!
//! A package's manifest (the `inhaltsverzeichnis` of an eCH-0160 `metadata.xml`)
//! declares every file the package should contain, with a checksum per file.
//! This crate provides:
//! - [`parse_manifest`]: stream the manifest into a path → entry mapping
//! - [`scan_package`]: list the files actually present on disk
//! - [`verify`]: reconcile the two, including checksum recomputation
//!
//! ## Usage
//!
//! ```no_run
//! use sipx_manifest::{verify_package, Package};
//!
//! let package = Package::open("/transfers/SIP_20240101_Vecteur", None).unwrap();
//! let result = verify_package(&package).unwrap();
//! if result.failed() {
//!     for line in result.missing_files.iter().chain(&result.unexpected_files) {
//!         eprintln!("{line}");
//!     }
//! }
//! ```

mod error;
mod package;
mod parser;
mod scan;
mod verify;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub use error::{ManifestError, ManifestResult};
pub use package::{Package, PackageType};
pub use parser::{parse_manifest, parse_manifest_file};
pub use scan::{list_files, scan_package};
pub use verify::{verify, verify_package, ChecksumSource, DiskChecksums, VerificationResult};

/// Declared checksum of a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checksum {
    /// Algorithm name as written in the manifest (e.g. "MD5")
    pub algorithm: String,
    /// Hex digest as written in the manifest
    pub hash: String,
}

/// A file declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Value of the file element's `id` attribute
    pub id: String,
    pub checksum: Checksum,
}

/// Declared files keyed by POSIX-style relative path.
pub type Manifest = BTreeMap<String, ManifestEntry>;

/// Relative paths of the files present on disk.
pub type FileSet = BTreeSet<String>;
