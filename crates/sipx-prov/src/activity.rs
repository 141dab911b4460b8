//! Complete read-modify-write operations on a PREMIS file.
//!
//! Each function loads the document (or starts a new one), applies one
//! change and writes the whole file back. Object and agent additions are
//! idempotent; event additions are not.

use crate::context::EventContext;
use crate::document::{EventTargets, PremisDocument};
use crate::error::{PremisError, PremisResult};
use crate::types::{EventSummary, Identifier, PremisAgent, UUID_IDENTIFIER_TYPE};
use sipx_manifest::list_files;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Prefix of every object's original name.
pub const OBJECTS_PREFIX: &str = "data/objects";

/// Original name of an object, keyed to its format code.
pub type FormatMap = BTreeMap<String, String>;

/// Identifies the format of a file (e.g. a PRONOM PUID such as "fmt/354").
pub trait FormatIdentifier {
    fn identify(&self, path: &Path) -> anyhow::Result<String>;
}

/// A validation tool: who it is and which formats it can judge.
pub trait Validator {
    fn agent(&self) -> PremisAgent;
    fn covers(&self, format: &str) -> bool;
}

/// A validator described by a fixed agent record and format list.
#[derive(Debug, Clone)]
pub struct StaticValidator {
    pub agent: PremisAgent,
    pub formats: BTreeSet<String>,
}

impl StaticValidator {
    pub fn new<I, S>(agent: PremisAgent, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            agent,
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for StaticValidator {
    fn agent(&self) -> PremisAgent {
        self.agent.clone()
    }

    fn covers(&self, format: &str) -> bool {
        self.formats.contains(format)
    }
}

/// Record an object for every file below `content_dir`.
///
/// Original names are `data/objects/<relative path>`. Files already recorded
/// keep their existing identifier. Returns the number of objects added.
pub fn add_premis_objects(
    premis_path: &Path,
    content_dir: &Path,
    ctx: &EventContext,
) -> PremisResult<usize> {
    let mut doc = PremisDocument::parse_or_initialize(premis_path)?;
    let mut added = 0;
    for relative in list_files(content_dir)? {
        let original_name = original_name(&relative);
        if doc.append_object(&original_name, UUID_IDENTIFIER_TYPE, &ctx.next_id()) {
            added += 1;
        }
    }
    doc.save(premis_path)?;

    info!(
        premis = %premis_path.display(),
        added,
        total = doc.objects().len(),
        "recorded PREMIS objects"
    );
    Ok(added)
}

/// Record `agent` unless it is already present. Returns whether it was added.
pub fn add_premis_agent(premis_path: &Path, agent: &PremisAgent) -> PremisResult<bool> {
    let mut doc = PremisDocument::parse_or_initialize(premis_path)?;
    let added = doc.append_agent(agent);
    doc.save(premis_path)?;
    Ok(added)
}

/// Record an event concerning every object, together with its agent.
pub fn add_premis_event(
    premis_path: &Path,
    summary: &EventSummary,
    agent: &PremisAgent,
    ctx: &EventContext,
) -> PremisResult<Identifier> {
    let mut doc = PremisDocument::parse_or_initialize(premis_path)?;
    doc.append_agent(agent);
    let id = doc.append_event(summary, agent, EventTargets::AllObjects, ctx)?;
    doc.save(premis_path)?;

    info!(
        premis = %premis_path.display(),
        event = %id.value,
        event_type = %summary.event_type,
        "recorded PREMIS event"
    );
    Ok(id)
}

/// Identify the format of every file below `content_dir`.
pub fn identify_formats(
    content_dir: &Path,
    identifier: &dyn FormatIdentifier,
) -> PremisResult<FormatMap> {
    let mut formats = FormatMap::new();
    for relative in list_files(content_dir)? {
        let path = content_dir.join(&relative);
        let format = identifier
            .identify(&path)
            .map_err(|err| PremisError::Identify {
                path: path.clone(),
                message: format!("{err:#}"),
            })?;
        debug!(file = %relative, format = %format, "identified format");
        formats.insert(original_name(&relative), format);
    }
    Ok(formats)
}

/// Record a validation event for the objects whose format `validator` covers.
///
/// Returns `None`, leaving the file untouched, when the validator covers none
/// of the identified formats. Every covered object must already be recorded.
pub fn add_validation_event(
    premis_path: &Path,
    summary: &EventSummary,
    validator: &dyn Validator,
    formats: &FormatMap,
    ctx: &EventContext,
) -> PremisResult<Option<Identifier>> {
    let targets: Vec<String> = formats
        .iter()
        .filter(|(_, format)| validator.covers(format))
        .map(|(name, _)| name.clone())
        .collect();
    if targets.is_empty() {
        debug!(premis = %premis_path.display(), "no files covered by validator");
        return Ok(None);
    }

    let agent = validator.agent();
    let mut doc = PremisDocument::parse_or_initialize(premis_path)?;
    let id = doc.append_event(summary, &agent, EventTargets::Named(&targets), ctx)?;
    doc.append_agent(&agent);
    doc.save(premis_path)?;

    info!(
        premis = %premis_path.display(),
        event = %id.value,
        objects = targets.len(),
        outcome = %summary.outcome,
        "recorded validation event"
    );
    Ok(Some(id))
}

fn original_name(relative: &str) -> String {
    format!("{OBJECTS_PREFIX}/{relative}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FixedClock, SequentialIds};
    use crate::types::EventOutcome;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    struct ByExtension;

    impl FormatIdentifier for ByExtension {
        fn identify(&self, path: &Path) -> anyhow::Result<String> {
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("pdf") => Ok("fmt/354".to_string()),
                Some("txt") => Ok("x-fmt/111".to_string()),
                _ => anyhow::bail!("unknown format"),
            }
        }
    }

    fn ctx() -> EventContext {
        let start = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        EventContext::new(FixedClock::new(start), SequentialIds::new("id"))
    }

    fn content(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, file.as_bytes()).unwrap();
        }
        dir
    }

    fn pdf_validator() -> StaticValidator {
        StaticValidator::new(PremisAgent::software("veraPDF", "1.24.1"), ["fmt/354"])
    }

    #[test]
    fn objects_are_recorded_once() {
        let content = content(&["a.pdf", "sub/b.txt"]);
        let out = TempDir::new().unwrap();
        let premis = out.path().join("premis.xml");
        let ctx = ctx();

        assert_eq!(add_premis_objects(&premis, content.path(), &ctx).unwrap(), 2);
        assert_eq!(add_premis_objects(&premis, content.path(), &ctx).unwrap(), 0);

        let doc = PremisDocument::parse_or_initialize(&premis).unwrap();
        let objects = doc.objects();
        let names: Vec<_> = objects.iter().map(|o| o.original_name.as_str()).collect();
        assert_eq!(names, vec!["data/objects/a.pdf", "data/objects/sub/b.txt"]);
        assert_eq!(objects[0].identifier, Identifier::uuid("id-1"));
    }

    #[test]
    fn whitespace_edged_names_are_recorded_once() {
        let content = content(&[" lead.txt", "report "]);
        let out = TempDir::new().unwrap();
        let premis = out.path().join("premis.xml");
        let ctx = ctx();

        assert_eq!(add_premis_objects(&premis, content.path(), &ctx).unwrap(), 2);
        assert_eq!(add_premis_objects(&premis, content.path(), &ctx).unwrap(), 0);

        let doc = PremisDocument::parse_or_initialize(&premis).unwrap();
        assert_eq!(doc.objects().len(), 2);
        assert!(doc.object("data/objects/report ").is_some());
        assert!(doc.object("data/objects/ lead.txt").is_some());
    }

    #[test]
    fn agent_is_added_once() {
        let out = TempDir::new().unwrap();
        let premis = out.path().join("premis.xml");
        let agent = PremisAgent::new("url", "https://example.org", "Enduro", "organization");

        assert!(add_premis_agent(&premis, &agent).unwrap());
        assert!(!add_premis_agent(&premis, &agent).unwrap());
        let doc = PremisDocument::parse_or_initialize(&premis).unwrap();
        assert_eq!(doc.agents(), vec![agent]);
    }

    #[test]
    fn broadcast_event_records_agent() {
        let content = content(&["a.pdf"]);
        let out = TempDir::new().unwrap();
        let premis = out.path().join("premis.xml");
        let ctx = ctx();
        add_premis_objects(&premis, content.path(), &ctx).unwrap();

        let agent = PremisAgent::software("sipx", "0.1.0");
        let summary = EventSummary::new("ingestion", "", "success", "");
        let id = add_premis_event(&premis, &summary, &agent, &ctx).unwrap();

        let doc = PremisDocument::parse_or_initialize(&premis).unwrap();
        assert_eq!(doc.objects()[0].linked_events, vec![id]);
        assert!(doc.agent(&agent.identifier).is_some());
    }

    #[test]
    fn validation_event_targets_covered_formats() {
        let content = content(&["a.pdf", "b.txt"]);
        let out = TempDir::new().unwrap();
        let premis = out.path().join("premis.xml");
        let ctx = ctx();
        add_premis_objects(&premis, content.path(), &ctx).unwrap();

        let formats = identify_formats(content.path(), &ByExtension).unwrap();
        assert_eq!(formats["data/objects/a.pdf"], "fmt/354");

        let summary = EventSummary::validation("Validated PDF/A", &[]);
        let id = add_validation_event(&premis, &summary, &pdf_validator(), &formats, &ctx)
            .unwrap()
            .unwrap();

        let doc = PremisDocument::parse_or_initialize(&premis).unwrap();
        assert_eq!(doc.object("data/objects/a.pdf").unwrap().linked_events, vec![id]);
        assert!(doc.object("data/objects/b.txt").unwrap().linked_events.is_empty());
        assert_eq!(doc.events()[0].outcome, EventOutcome::Valid.as_str());
        assert_eq!(doc.agents(), vec![pdf_validator().agent]);
    }

    #[test]
    fn uncovered_formats_leave_file_untouched() {
        let out = TempDir::new().unwrap();
        let premis = out.path().join("premis.xml");
        let formats = FormatMap::from([(
            "data/objects/b.txt".to_string(),
            "x-fmt/111".to_string(),
        )]);

        let summary = EventSummary::validation("Validated PDF/A", &[]);
        let result =
            add_validation_event(&premis, &summary, &pdf_validator(), &formats, &ctx()).unwrap();
        assert!(result.is_none());
        assert!(!premis.exists());
    }

    #[test]
    fn validation_event_requires_recorded_objects() {
        let out = TempDir::new().unwrap();
        let premis = out.path().join("premis.xml");
        let formats = FormatMap::from([(
            "data/objects/a.pdf".to_string(),
            "fmt/354".to_string(),
        )]);

        let summary = EventSummary::validation("Validated PDF/A", &[]);
        let result = add_validation_event(&premis, &summary, &pdf_validator(), &formats, &ctx());
        assert!(matches!(result, Err(PremisError::ElementNotFound(_))));
        assert!(!premis.exists());
    }

    #[test]
    fn identification_failure_names_the_file() {
        let content = content(&["a.bin"]);
        let err = identify_formats(content.path(), &ByExtension).unwrap_err();
        match err {
            PremisError::Identify { path, message } => {
                assert!(path.ends_with("a.bin"));
                assert_eq!(message, "unknown format");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
