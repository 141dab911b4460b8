//! Reconciliation of declared manifest entries against the files on disk.

use crate::error::{ManifestError, ManifestResult};
use crate::package::Package;
use crate::parser::parse_manifest_file;
use crate::scan::scan_package;
use crate::{FileSet, Manifest};
use serde::Serialize;
use sipx_hash::HashError;
use std::path::PathBuf;
use tracing::{info, warn};

/// Outcome of a manifest verification.
///
/// Findings are data, not errors: a package with problems still produces a
/// result, with [`VerificationResult::failed`] returning true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Declared in the manifest but absent on disk, sorted
    pub missing_files: Vec<String>,
    /// Present on disk but not declared, sorted
    pub unexpected_files: Vec<String>,
    /// One diagnostic per differing digest, sorted by path
    pub checksum_mismatches: Vec<String>,
}

impl VerificationResult {
    pub fn failed(&self) -> bool {
        !self.missing_files.is_empty()
            || !self.unexpected_files.is_empty()
            || !self.checksum_mismatches.is_empty()
    }
}

/// Computes the digest of a package file.
pub trait ChecksumSource {
    /// Digest `path` (relative to the scan root) with the named algorithm.
    fn checksum(&self, path: &str, algorithm: &str) -> ManifestResult<String>;
}

/// Reads files below a root directory and digests them with `sipx-hash`.
#[derive(Debug, Clone)]
pub struct DiskChecksums {
    root: PathBuf,
}

impl DiskChecksums {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ChecksumSource for DiskChecksums {
    fn checksum(&self, path: &str, algorithm: &str) -> ManifestResult<String> {
        let full = self.root.join(path);
        sipx_hash::digest_file_named(algorithm, &full).map_err(|err| match err {
            HashError::UnsupportedAlgorithm(name) => ManifestError::UnsupportedAlgorithm(name),
            HashError::Io(source) => ManifestError::io("checksum", full, source),
        })
    }
}

/// Reconcile a manifest against a file set.
///
/// Missing and unexpected files are plain set differences on paths. Digests
/// are only recomputed for paths present on both sides.
pub fn verify<C: ChecksumSource + ?Sized>(
    manifest: &Manifest,
    files: &FileSet,
    checksums: &C,
) -> ManifestResult<VerificationResult> {
    let missing_files = manifest
        .keys()
        .filter(|path| !files.contains(*path))
        .cloned()
        .collect();
    let unexpected_files = files
        .iter()
        .filter(|path| !manifest.contains_key(*path))
        .cloned()
        .collect();

    let mut checksum_mismatches = Vec::new();
    for (path, entry) in manifest.iter().filter(|(path, _)| files.contains(*path)) {
        let computed = checksums.checksum(path, &entry.checksum.algorithm)?;
        if computed != entry.checksum.hash {
            checksum_mismatches.push(format!(
                "Checksum mismatch for {path:?} (expected: {:?}, got: {computed:?})",
                entry.checksum.hash
            ));
        }
    }

    // BTreeMap/BTreeSet iteration already yields sorted paths.
    Ok(VerificationResult {
        missing_files,
        unexpected_files,
        checksum_mismatches,
    })
}

/// Parse, scan and verify a package in one call.
pub fn verify_package(package: &Package) -> ManifestResult<VerificationResult> {
    let manifest = parse_manifest_file(package.manifest_path())?;
    let files = scan_package(&package.path, package.package_type)?;
    let result = verify(&manifest, &files, &DiskChecksums::new(package.scan_root()))?;

    if result.failed() {
        warn!(
            package = %package.path.display(),
            missing = result.missing_files.len(),
            unexpected = result.unexpected_files.len(),
            mismatched = result.checksum_mismatches.len(),
            "manifest verification failed"
        );
    } else {
        info!(
            package = %package.path.display(),
            files = manifest.len(),
            "manifest verified"
        );
    }
    Ok(result)
}
