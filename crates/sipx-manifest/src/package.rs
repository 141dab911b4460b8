//! Package types and their fixed on-disk layout.

use crate::error::{ManifestError, ManifestResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the directory holding the payload of every package type.
pub(crate) const CONTENT_DIR: &str = "content";

const SIP_METADATA: &str = "header/metadata.xml";
const AIP_MANIFEST: &str = "additional/UpdatedAreldaMetadata.xml";
const AIP_METADATA: &str = "header/old/SIP/metadata.xml";
const DIGITIZATION_PREMIS_SUFFIX: &str = "_PREMIS.xml";
const DIGITIZED_NAME_PREFIX: &str = "Vecteur_";

/// The kinds of package accepted for ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    BornDigitalSip,
    DigitizedSip,
    BornDigitalAip,
    DigitizedAip,
}

impl PackageType {
    pub const ALL: [PackageType; 4] = [
        PackageType::BornDigitalSip,
        PackageType::DigitizedSip,
        PackageType::BornDigitalAip,
        PackageType::DigitizedAip,
    ];

    pub fn is_aip(self) -> bool {
        matches!(self, PackageType::BornDigitalAip | PackageType::DigitizedAip)
    }

    pub fn is_digitized(self) -> bool {
        matches!(self, PackageType::DigitizedSip | PackageType::DigitizedAip)
    }

    /// Manifest location relative to the package root.
    pub fn manifest_path(self) -> &'static str {
        if self.is_aip() {
            AIP_MANIFEST
        } else {
            SIP_METADATA
        }
    }

    /// The eCH-0160 metadata file relative to the package root.
    pub fn metadata_path(self) -> &'static str {
        if self.is_aip() {
            AIP_METADATA
        } else {
            SIP_METADATA
        }
    }

    /// Directory, relative to the package root, that manifest paths are
    /// declared against. `None` means the package root itself.
    pub fn scan_root(self) -> Option<&'static str> {
        match self {
            PackageType::DigitizedAip => Some(CONTENT_DIR),
            _ => None,
        }
    }

    /// Path, relative to the scan root, that exists on disk but is never
    /// listed in the manifest.
    pub fn excluded_path(self) -> Option<&'static str> {
        if self.is_aip() {
            None
        } else {
            Some(SIP_METADATA)
        }
    }

    /// Guess the package type from the directory contents.
    ///
    /// An updated inventory under `additional/` marks an AIP. A digitization
    /// PREMIS file, or a `Vecteur_` directory name, marks a digitized package.
    pub fn detect<P: AsRef<Path>>(dir: P) -> ManifestResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ManifestError::io(
                "open package",
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let is_aip = dir.join(AIP_MANIFEST).is_file();
        let metadata_dir = if is_aip { "additional" } else { "header" };
        let named_digitized = dir
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(DIGITIZED_NAME_PREFIX));
        let is_digitized = named_digitized || has_digitization_premis(&dir.join(metadata_dir))?;

        Ok(match (is_aip, is_digitized) {
            (false, false) => PackageType::BornDigitalSip,
            (false, true) => PackageType::DigitizedSip,
            (true, false) => PackageType::BornDigitalAip,
            (true, true) => PackageType::DigitizedAip,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            PackageType::BornDigitalSip => "born-digital-sip",
            PackageType::DigitizedSip => "digitized-sip",
            PackageType::BornDigitalAip => "born-digital-aip",
            PackageType::DigitizedAip => "digitized-aip",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ManifestError::UnknownPackageType(s.to_string()))
    }
}

fn has_digitization_premis(dir: &Path) -> ManifestResult<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let entries = fs::read_dir(dir).map_err(|err| ManifestError::io("read directory", dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| ManifestError::io("read directory", dir, err))?;
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(DIGITIZATION_PREMIS_SUFFIX))
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A package directory together with its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub path: PathBuf,
    pub package_type: PackageType,
}

impl Package {
    /// Open a package, detecting its type unless one is given.
    pub fn open<P: AsRef<Path>>(path: P, package_type: Option<PackageType>) -> ManifestResult<Self> {
        let path = path.as_ref().to_path_buf();
        let package_type = match package_type {
            Some(ty) => ty,
            None => PackageType::detect(&path)?,
        };
        Ok(Self { path, package_type })
    }

    /// Directory name of the package, used to name the restructured output.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(self.package_type.manifest_path())
    }

    pub fn scan_root(&self) -> PathBuf {
        match self.package_type.scan_root() {
            Some(dir) => self.path.join(dir),
            None => self.path.clone(),
        }
    }
}
