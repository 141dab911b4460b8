use crate::project::IdentifierRecord;
use crate::PipError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::Path;
use tracing::info;

/// Serialize records as a JSON array indented by four spaces, with a
/// trailing newline.
pub fn to_json(records: &[IdentifierRecord]) -> Result<String, PipError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    out.push(b'\n');
    // serde_json only emits UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write the identifier sidecar, creating parent directories as needed.
pub fn write_sidecar(path: &Path, records: &[IdentifierRecord]) -> Result<(), PipError> {
    let json = to_json(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipError::Io {
            op: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| PipError::Io {
        op: "write identifiers",
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), records = records.len(), "wrote identifier sidecar");
    Ok(())
}
