//! Named checksum algorithms for archival package verification.
//!
//! Manifests declare a checksum per file together with the name of the
//! algorithm that produced it. This crate maps those names onto digest
//! implementations and computes lowercase hex digests over byte streams.
//!
//! ```
//! use sipx_hash::{digest_bytes, Algorithm};
//!
//! let algorithm: Algorithm = "MD5".parse().unwrap();
//! assert_eq!(
//!     digest_bytes(algorithm, b"abc"),
//!     "900150983cd24fb0d6963f7d28e17f72"
//! );
//! ```

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("unsupported checksum algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Checksum algorithms accepted in manifests.
///
/// Names are matched exactly and case-sensitively against the canonical
/// spelling returned by [`Algorithm::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha256,
        Algorithm::Sha512,
    ];

    /// Resolve a manifest algorithm name.
    pub fn from_name(name: &str) -> Result<Self, HashError> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == name)
            .ok_or_else(|| HashError::UnsupportedAlgorithm(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha1 => "SHA-1",
            Algorithm::Sha256 => "SHA-256",
            Algorithm::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Digest an in-memory buffer.
pub fn digest_bytes(algorithm: Algorithm, bytes: &[u8]) -> String {
    match algorithm {
        Algorithm::Md5 => hex::encode(Md5::digest(bytes)),
        Algorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
        Algorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        Algorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
    }
}

/// Digest everything `reader` yields, in fixed-size chunks.
pub fn digest_reader<R: Read>(algorithm: Algorithm, reader: R) -> Result<String, HashError> {
    let digest = match algorithm {
        Algorithm::Md5 => stream::<Md5, R>(reader)?,
        Algorithm::Sha1 => stream::<Sha1, R>(reader)?,
        Algorithm::Sha256 => stream::<Sha256, R>(reader)?,
        Algorithm::Sha512 => stream::<Sha512, R>(reader)?,
    };
    Ok(digest)
}

/// Digest the contents of the file at `path`.
pub fn digest_file<P: AsRef<Path>>(algorithm: Algorithm, path: P) -> Result<String, HashError> {
    let file = File::open(path.as_ref())?;
    digest_reader(algorithm, file)
}

/// Digest a file using an algorithm given by name.
pub fn digest_file_named<P: AsRef<Path>>(name: &str, path: P) -> Result<String, HashError> {
    digest_file(Algorithm::from_name(name)?, path)
}

fn stream<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
