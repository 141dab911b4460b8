//! Streaming parser for the manifest inventory.
//!
//! The inventory is a recursive tree of folders and files. Paths are rebuilt by
//! joining folder names in document order and terminating with the file name.
//! Elements outside the whitelist are skipped together with their subtree, and
//! parsing stops as soon as the inventory element closes.

use crate::error::{ManifestError, ManifestResult};
use crate::{Checksum, Manifest, ManifestEntry};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Parse a manifest document into a path → entry mapping.
///
/// A document without an inventory, or with an empty one, yields an empty
/// mapping.
pub fn parse_manifest<R: BufRead>(source: R) -> ManifestResult<Manifest> {
    ManifestParser::new(source).parse()
}

/// Open and parse the manifest at `path`.
pub fn parse_manifest_file<P: AsRef<Path>>(path: P) -> ManifestResult<Manifest> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| ManifestError::io("open manifest", path, err))?;
    let manifest = parse_manifest(BufReader::new(file))?;
    debug!(path = %path.display(), files = manifest.len(), "parsed manifest");
    Ok(manifest)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Package,
    Inventory,
    Folder,
    File,
    Name,
    Algorithm,
    Hash,
}

impl Element {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"paket" => Some(Element::Package),
            b"inhaltsverzeichnis" => Some(Element::Inventory),
            b"ordner" => Some(Element::Folder),
            b"datei" => Some(Element::File),
            b"name" => Some(Element::Name),
            b"pruefalgorithmus" => Some(Element::Algorithm),
            b"pruefsumme" => Some(Element::Hash),
            _ => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Element::Package => "paket",
            Element::Inventory => "inhaltsverzeichnis",
            Element::Folder => "ordner",
            Element::File => "datei",
            Element::Name => "name",
            Element::Algorithm => "pruefalgorithmus",
            Element::Hash => "pruefsumme",
        }
    }
}

/// An open element and the path depth at the moment it was opened.
struct Frame {
    element: Element,
    path_len: usize,
}

#[derive(Default)]
struct PendingFile {
    id: String,
    algorithm: String,
    hash: String,
}

struct ManifestParser<R> {
    reader: Reader<R>,
    stack: Vec<Frame>,
    path: Vec<String>,
    pending: Option<PendingFile>,
    name_started: bool,
    manifest: Manifest,
}

impl<R: BufRead> ManifestParser<R> {
    fn new(source: R) -> Self {
        let reader = Reader::from_reader(source);
        Self {
            reader,
            stack: Vec::new(),
            path: Vec::new(),
            pending: None,
            name_started: false,
            manifest: Manifest::new(),
        }
    }

    fn parse(mut self) -> ManifestResult<Manifest> {
        let mut buf = Vec::new();
        let mut skip_buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(start) => match Element::from_local_name(start.local_name().as_ref())
                {
                    Some(element) => self.open(element, &start)?,
                    None => {
                        skip_buf.clear();
                        self.reader.read_to_end_into(start.name(), &mut skip_buf)?;
                    }
                },
                Event::Empty(start) => {
                    if let Some(element) = Element::from_local_name(start.local_name().as_ref()) {
                        self.open(element, &start)?;
                        if self.close() {
                            return Ok(self.manifest);
                        }
                    }
                }
                Event::End(_) => {
                    if self.close() {
                        return Ok(self.manifest);
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    self.text(&text);
                }
                Event::CData(data) => {
                    let raw = data.into_inner();
                    self.text(&String::from_utf8_lossy(&raw));
                }
                Event::Eof => {
                    return match self.stack.last() {
                        Some(frame) => Err(ManifestError::Truncated(frame.element.tag().into())),
                        None => Ok(self.manifest),
                    };
                }
                _ => {}
            }
            buf.clear();
        }
    }

    fn open(&mut self, element: Element, start: &BytesStart<'_>) -> ManifestResult<()> {
        match element {
            Element::File => {
                self.pending = Some(PendingFile {
                    id: file_id(start)?,
                    ..PendingFile::default()
                });
            }
            Element::Name => self.name_started = false,
            _ => {}
        }
        self.stack.push(Frame {
            element,
            path_len: self.path.len(),
        });
        Ok(())
    }

    /// Pop the innermost element. Returns true once the inventory is closed.
    fn close(&mut self) -> bool {
        // End tag names are checked by the reader, so the top frame is the
        // element being closed.
        let Some(frame) = self.stack.pop() else {
            return false;
        };
        match frame.element {
            Element::File => {
                if let Some(file) = self.pending.take() {
                    if self.path.len() > frame.path_len {
                        self.commit(file);
                    }
                }
                self.path.truncate(frame.path_len);
            }
            Element::Folder => self.path.truncate(frame.path_len),
            Element::Name => self.name_started = false,
            Element::Inventory => return true,
            _ => {}
        }
        false
    }

    fn commit(&mut self, file: PendingFile) {
        let path = self.path.join("/");
        debug!(%path, id = %file.id, "manifest entry");
        self.manifest.insert(
            path,
            ManifestEntry {
                id: file.id,
                checksum: Checksum {
                    algorithm: file.algorithm.trim().to_string(),
                    hash: file.hash.trim().to_string(),
                },
            },
        );
    }

    /// Name text is kept exactly; algorithm and hash are trimmed on commit.
    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let depth = self.stack.len();
        let Some(top) = self.stack.last().map(|frame| frame.element) else {
            return;
        };
        let parent = depth
            .checked_sub(2)
            .map(|index| self.stack[index].element);

        match (top, parent) {
            (Element::Name, Some(Element::Folder | Element::File)) => {
                if self.name_started {
                    if let Some(segment) = self.path.last_mut() {
                        segment.push_str(text);
                    }
                } else {
                    self.path.push(text.to_string());
                    self.name_started = true;
                }
            }
            (Element::Algorithm, Some(Element::File)) => {
                if let Some(file) = self.pending.as_mut() {
                    file.algorithm.push_str(text);
                }
            }
            (Element::Hash, Some(Element::File)) => {
                if let Some(file) = self.pending.as_mut() {
                    file.hash.push_str(text);
                }
            }
            _ => {}
        }
    }
}

fn file_id(start: &BytesStart<'_>) -> ManifestResult<String> {
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == b"id" {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIP_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<paket xmlns="http://bar.admin.ch/arelda/v4" schemaVersion="4.1">
  <paketTyp>SIP</paketTyp>
  <inhaltsverzeichnis>
    <ordner>
      <name>header</name>
      <ordner>
        <name>xsd</name>
        <datei id="_xsd1">
          <name>arelda.xsd</name>
          <originalName>arelda.xsd</originalName>
          <pruefalgorithmus>MD5</pruefalgorithmus>
          <pruefsumme>f8454ff6ba9f1d1e4e0e4b1d5f5b1a6c</pruefsumme>
        </datei>
      </ordner>
    </ordner>
    <ordner>
      <name>content</name>
      <ordner>
        <name>d_0000001</name>
        <datei id="_f1">
          <name>00000001.jp2</name>
          <pruefalgorithmus>MD5</pruefalgorithmus>
          <pruefsumme>aaaa</pruefsumme>
        </datei>
        <datei id="_f2">
          <name>00000002.PDF</name>
          <pruefalgorithmus>SHA-256</pruefalgorithmus>
          <pruefsumme>bbbb</pruefsumme>
        </datei>
      </ordner>
    </ordner>
  </inhaltsverzeichnis>
  <ablieferung>
    <ablieferungstyp>FILES</ablieferungstyp>
  </ablieferung>
</paket>
"#;

    fn parse_str(source: &str) -> ManifestResult<Manifest> {
        parse_manifest(source.as_bytes())
    }

    #[test]
    fn reconstructs_nested_paths() {
        let manifest = parse_str(SIP_MANIFEST).unwrap();
        let paths: Vec<&str> = manifest.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec![
                "content/d_0000001/00000001.jp2",
                "content/d_0000001/00000002.PDF",
                "header/xsd/arelda.xsd",
            ]
        );

        let entry = &manifest["content/d_0000001/00000002.PDF"];
        assert_eq!(entry.id, "_f2");
        assert_eq!(entry.checksum.algorithm, "SHA-256");
        assert_eq!(entry.checksum.hash, "bbbb");
    }

    #[test]
    fn unknown_subtrees_do_not_contribute_segments() {
        let source = r#"<paket><inhaltsverzeichnis>
            <ordner>
              <name>content</name>
              <extension><name>ignored</name><datei id="x"><name>ghost</name></datei></extension>
              <datei id="a"><name>a.txt</name><pruefalgorithmus>MD5</pruefalgorithmus><pruefsumme>1</pruefsumme></datei>
            </ordner>
        </inhaltsverzeichnis></paket>"#;

        let manifest = parse_str(source).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest["content/a.txt"].id, "a");
    }

    #[test]
    fn stops_at_inventory_close() {
        // The tail after the inventory is not well formed.
        let source = r#"<paket><inhaltsverzeichnis>
            <datei id="a"><name>a.txt</name></datei>
        </inhaltsverzeichnis><broken></paket>"#;

        let manifest = parse_str(source).unwrap();
        assert!(manifest.contains_key("a.txt"));
    }

    #[test]
    fn namespace_prefixes_are_ignored() {
        let source = r#"<arelda:paket xmlns:arelda="http://bar.admin.ch/arelda/v4">
            <arelda:inhaltsverzeichnis>
              <arelda:ordner><arelda:name>content</arelda:name>
                <arelda:datei id="p1"><arelda:name>b.pdf</arelda:name></arelda:datei>
              </arelda:ordner>
            </arelda:inhaltsverzeichnis>
        </arelda:paket>"#;

        let manifest = parse_str(source).unwrap();
        assert_eq!(manifest["content/b.pdf"].id, "p1");
    }

    #[test]
    fn escaped_names_are_unescaped() {
        let source = r#"<paket><inhaltsverzeichnis>
            <datei id="a"><name>R&amp;D.txt</name></datei>
        </inhaltsverzeichnis></paket>"#;

        let manifest = parse_str(source).unwrap();
        assert!(manifest.contains_key("R&D.txt"));
    }

    #[test]
    fn name_whitespace_is_significant() {
        let source = r#"<paket><inhaltsverzeichnis>
            <ordner>
              <name> content</name>
              <datei id="a">
                <name>a.txt </name>
                <pruefalgorithmus>
                  MD5
                </pruefalgorithmus>
                <pruefsumme> 900150983cd24fb0d6963f7d28e17f72 </pruefsumme>
              </datei>
              <datei id="b"><name>a.txt</name></datei>
            </ordner>
        </inhaltsverzeichnis></paket>"#;

        let manifest = parse_str(source).unwrap();
        assert_eq!(manifest.len(), 2);
        let entry = &manifest[" content/a.txt "];
        assert_eq!(entry.id, "a");
        assert_eq!(entry.checksum.algorithm, "MD5");
        assert_eq!(entry.checksum.hash, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(manifest[" content/a.txt"].id, "b");
    }

    #[test]
    fn sibling_folders_do_not_leak_segments() {
        let source = r#"<paket><inhaltsverzeichnis>
            <ordner><name>one</name><datei id="1"><name>x</name></datei></ordner>
            <ordner><name>two</name><datei id="2"><name>y</name></datei></ordner>
            <datei id="3"><name>z</name></datei>
        </inhaltsverzeichnis></paket>"#;

        let manifest = parse_str(source).unwrap();
        let paths: Vec<&str> = manifest.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["one/x", "two/y", "z"]);
    }

    #[test]
    fn empty_and_absent_inventory_yield_empty_mapping() {
        assert!(parse_str("<paket><inhaltsverzeichnis/></paket>")
            .unwrap()
            .is_empty());
        assert!(parse_str("<paket><inhaltsverzeichnis></inhaltsverzeichnis></paket>")
            .unwrap()
            .is_empty());
        assert!(parse_str("<paket><paketTyp>SIP</paketTyp></paket>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn truncated_document_is_an_error() {
        let source = r#"<paket><inhaltsverzeichnis><ordner><name>content</name>"#;
        match parse_str(source) {
            Err(ManifestError::Truncated(tag)) => assert_eq!(tag, "ordner"),
            Err(ManifestError::Xml(_)) => {}
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        let source = r#"<paket><inhaltsverzeichnis><ordner></datei></inhaltsverzeichnis></paket>"#;
        assert!(matches!(parse_str(source), Err(ManifestError::Xml(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = parse_manifest_file(dir.path().join("metadata.xml"));
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }
}
