//! On-disk file listing for a package.

use crate::error::{ManifestError, ManifestResult};
use crate::package::PackageType;
use crate::FileSet;
use std::fs;
use std::path::{Component, Path};
use tracing::debug;

/// List the files of the package at `root` as POSIX-style paths relative to
/// the type's scan root.
///
/// Directories are not listed and symbolic links are not followed. The
/// type's excluded path, if any, is dropped from the result.
pub fn scan_package<P: AsRef<Path>>(root: P, package_type: PackageType) -> ManifestResult<FileSet> {
    let root = root.as_ref();
    let scan_root = match package_type.scan_root() {
        Some(dir) => root.join(dir),
        None => root.to_path_buf(),
    };

    let mut files = list_files(&scan_root)?;
    if let Some(excluded) = package_type.excluded_path() {
        files.remove(excluded);
    }
    debug!(root = %scan_root.display(), files = files.len(), "scanned package");
    Ok(files)
}

/// List the regular files below `root` as sorted POSIX-style relative paths.
///
/// Symbolic links are not followed.
pub fn list_files<P: AsRef<Path>>(root: P) -> ManifestResult<FileSet> {
    let root = root.as_ref();
    let mut files = FileSet::new();
    collect_files(root, root, &mut files)?;
    Ok(files)
}

fn collect_files(base: &Path, dir: &Path, out: &mut FileSet) -> ManifestResult<()> {
    let entries = fs::read_dir(dir).map_err(|err| ManifestError::io("read directory", dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| ManifestError::io("read directory", dir, err))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|err| ManifestError::io("stat", &path, err))?;

        if file_type.is_dir() {
            collect_files(base, &path, out)?;
        } else if file_type.is_file() {
            if let Ok(rel) = path.strip_prefix(base) {
                out.insert(to_posix(rel));
            }
        }
    }
    Ok(())
}

fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
