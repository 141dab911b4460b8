use crate::PipError;
use serde::{Deserialize, Serialize};
use sipx_manifest::{Manifest, PackageType};
use std::borrow::Cow;
use tracing::debug;

/// Identifier type of every projected identifier.
pub const LOCAL_TYPE: &str = "local";

const CONTENT_SEGMENT: &str = "content";
const PROVENANCE_SUFFIX: &str = "_PREMIS.xml";
const UPDATED_METADATA: &str = "UpdatedAreldaMetadata.xml";
const METADATA: &str = "metadata.xml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub identifier: String,
    pub identifier_type: String,
}

/// A file in the restructured package and the identifiers it keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierRecord {
    pub file: String,
    pub identifiers: Vec<Identifier>,
}

/// New location of a manifest path, or `None` when the file is not carried
/// into the restructured package.
///
/// Manifest paths are relative to the package type's scan root; a digitized
/// AIP's paths are re-rooted under `content/` first. Rules are tried in
/// order; the first match wins.
pub fn project_path(path: &str, package_type: PackageType, package_name: &str) -> Option<String> {
    let rooted: Cow<'_, str> = match package_type.scan_root() {
        Some(root) => Cow::Owned(format!("{root}/{path}")),
        None => Cow::Borrowed(path),
    };
    let path: &str = &rooted;
    let basename = path.rsplit('/').next().unwrap_or(path);

    if basename.ends_with(PROVENANCE_SUFFIX) || basename == UPDATED_METADATA {
        return Some(format!("metadata/{basename}"));
    }
    if basename == METADATA {
        return Some(format!("objects/{package_name}/header/metadata.xml"));
    }
    if path.split('/').next() == Some(CONTENT_SEGMENT) {
        return Some(format!("objects/{package_name}/{path}"));
    }
    None
}

/// Project every manifest entry to its restructured location.
///
/// Records are sorted by output path. Entries whose path has no new location
/// (schema files, for instance) are left out.
pub fn project_identifiers(
    manifest: &Manifest,
    package_type: PackageType,
    package_name: &str,
) -> Result<Vec<IdentifierRecord>, PipError> {
    if manifest.is_empty() {
        return Err(PipError::EmptyManifest);
    }

    let mut records: Vec<IdentifierRecord> = manifest
        .iter()
        .filter_map(|(path, entry)| {
            let file = project_path(path, package_type, package_name);
            if file.is_none() {
                debug!(path = %path, "dropping file without restructured location");
            }
            file.map(|file| IdentifierRecord {
                file,
                identifiers: vec![Identifier {
                    identifier: entry.id.clone(),
                    identifier_type: LOCAL_TYPE.to_string(),
                }],
            })
        })
        .collect();
    records.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(records)
}
