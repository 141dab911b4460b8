//! Package fixtures shared by the cross-crate tests.

use sipx_hash::{digest_bytes, Algorithm};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A file to place in a fixture package.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    /// Path relative to the manifest root
    pub path: String,
    pub id: String,
    pub contents: Vec<u8>,
    pub algorithm: Algorithm,
}

impl FixtureFile {
    pub fn new(path: &str, id: &str, contents: &[u8]) -> Self {
        Self {
            path: path.to_string(),
            id: id.to_string(),
            contents: contents.to_vec(),
            algorithm: Algorithm::Md5,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Builds packages on disk together with a matching arelda manifest.
#[derive(Debug)]
pub struct PackageBuilder {
    name: String,
    files: Vec<FixtureFile>,
}

impl PackageBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Vec::new(),
        }
    }

    pub fn file(mut self, file: FixtureFile) -> Self {
        self.files.push(file);
        self
    }

    /// The manifest document declaring every fixture file with its digest.
    pub fn manifest_xml(&self) -> String {
        let mut root = Folder::default();
        for file in &self.files {
            root.insert(file);
        }
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <paket xmlns=\"http://bar.admin.ch/arelda/v4\">\n\
             <inhaltsverzeichnis>\n",
        );
        root.write_children(&mut xml);
        xml.push_str("</inhaltsverzeichnis>\n</paket>\n");
        xml
    }

    /// Write a born-digital SIP: files below the package root, manifest at
    /// `header/metadata.xml`.
    pub fn write_sip(&self, dir: &TempDir) -> io::Result<PathBuf> {
        let root = dir.path().join(&self.name);
        for file in &self.files {
            write(&root.join(&file.path), &file.contents)?;
        }
        write(&root.join("header/metadata.xml"), self.manifest_xml().as_bytes())?;
        Ok(root)
    }

    /// Write a digitized AIP: files below `content/`, manifest at
    /// `additional/UpdatedAreldaMetadata.xml`, plus a digitization PREMIS file.
    pub fn write_digitized_aip(&self, dir: &TempDir) -> io::Result<PathBuf> {
        let root = dir.path().join(&self.name);
        for file in &self.files {
            write(&root.join("content").join(&file.path), &file.contents)?;
        }
        write(
            &root.join("additional/UpdatedAreldaMetadata.xml"),
            self.manifest_xml().as_bytes(),
        )?;
        write(
            &root.join(format!("additional/{}_PREMIS.xml", self.name)),
            b"<premis/>",
        )?;
        Ok(root)
    }
}

fn write(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

#[derive(Default)]
struct Folder<'a> {
    folders: Vec<(String, Folder<'a>)>,
    files: Vec<&'a FixtureFile>,
}

impl<'a> Folder<'a> {
    fn insert(&mut self, file: &'a FixtureFile) {
        let mut folder = self;
        let mut segments: Vec<&str> = file.path.split('/').collect();
        segments.pop();
        for segment in segments {
            let index = match folder.folders.iter().position(|(name, _)| name == segment) {
                Some(index) => index,
                None => {
                    folder.folders.push((segment.to_string(), Folder::default()));
                    folder.folders.len() - 1
                }
            };
            folder = &mut folder.folders[index].1;
        }
        folder.files.push(file);
    }

    fn write_children(&self, xml: &mut String) {
        for (name, folder) in &self.folders {
            xml.push_str(&format!("<ordner>\n<name>{name}</name>\n"));
            folder.write_children(xml);
            xml.push_str("</ordner>\n");
        }
        for file in &self.files {
            let basename = file.path.rsplit('/').next().unwrap_or(&file.path);
            xml.push_str(&format!(
                "<datei id=\"{}\">\n<name>{basename}</name>\n\
                 <pruefalgorithmus>{}</pruefalgorithmus>\n\
                 <pruefsumme>{}</pruefsumme>\n</datei>\n",
                file.id,
                file.algorithm,
                digest_bytes(file.algorithm, &file.contents),
            ));
        }
    }
}
