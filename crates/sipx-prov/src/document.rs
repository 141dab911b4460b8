//! The PREMIS document model and its read-modify-write persistence.

use crate::context::EventContext;
use crate::error::{PremisError, PremisResult};
use crate::types::{EventSummary, Identifier, PremisAgent, PremisEvent, PremisObject};
use crate::xml::{read_tree, write_tree, Node};
use chrono::SecondsFormat;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::debug;

pub const PREMIS_NAMESPACE: &str = "http://www.loc.gov/premis/v3";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const PREMIS_SCHEMA_LOCATION: &str =
    "http://www.loc.gov/premis/v3 https://www.loc.gov/standards/premis/premis.xsd";
pub const PREMIS_VERSION: &str = "3.0";

/// Top-level record elements in schema order. New records are inserted
/// before the first record of a later kind.
const RECORD_ORDER: [&str; 4] = ["object", "event", "agent", "rights"];

/// Which objects a new event is linked from.
#[derive(Debug, Clone, Copy)]
pub enum EventTargets<'a> {
    /// Every object currently in the document.
    AllObjects,
    /// The objects with these original names. Each must exist.
    Named(&'a [String]),
}

/// A PREMIS document: objects, then events, then agents.
///
/// The document keeps the element tree it was read from, so content this
/// crate does not model (rights statements, other object categories,
/// extra identifiers, foreign attributes) is written back unchanged.
/// Objects, events and agents are read out of the tree on demand.
///
/// The document is meant to be loaded with [`PremisDocument::parse_or_initialize`],
/// mutated, and written back with [`PremisDocument::save`] within a single
/// operation. There is no incremental on-disk format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremisDocument {
    root: Node,
}

impl Default for PremisDocument {
    fn default() -> Self {
        let root = Node::new("premis:premis")
            .with_attribute("xmlns:premis", PREMIS_NAMESPACE)
            .with_attribute("xmlns:xsi", XSI_NAMESPACE)
            .with_attribute("xsi:schemaLocation", PREMIS_SCHEMA_LOCATION)
            .with_attribute("version", PREMIS_VERSION);
        Self { root }
    }
}

impl PremisDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the document at `path`, or start an empty one if the file does
    /// not exist.
    pub fn parse_or_initialize<P: AsRef<Path>>(path: P) -> PremisResult<Self> {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => Self::from_reader(bytes.as_slice()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "initializing new PREMIS document");
                Ok(Self::new())
            }
            Err(err) => Err(PremisError::io("read PREMIS file", path, err)),
        }
    }

    pub fn from_xml(xml: &str) -> PremisResult<Self> {
        Self::from_reader(xml.as_bytes())
    }

    /// Parse a document. The root element must be `premis`.
    pub fn from_reader<R: BufRead>(source: R) -> PremisResult<Self> {
        let root = read_tree(source)?.ok_or(PremisError::NoRoot)?;
        if root.local_name() != "premis" {
            return Err(PremisError::NoRoot);
        }
        Ok(Self { root })
    }

    /// Serialize the whole document: UTF-8, two-space indentation, trailing
    /// newline.
    pub fn to_xml(&self) -> PremisResult<String> {
        let serialize_error = |err| PremisError::io("serialize PREMIS document", "<memory>", err);
        let bytes = write_tree(&self.root).map_err(serialize_error)?;
        String::from_utf8(bytes)
            .map_err(|err| serialize_error(io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    /// Replace the file at `path` with the serialized document.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PremisResult<()> {
        let path = path.as_ref();
        let xml = self.to_xml()?;
        fs::write(path, xml).map_err(|err| PremisError::io("write PREMIS file", path, err))?;
        debug!(
            path = %path.display(),
            objects = self.root.children_named("object").count(),
            events = self.root.children_named("event").count(),
            agents = self.root.children_named("agent").count(),
            "saved PREMIS document"
        );
        Ok(())
    }

    /// Whether the document holds no objects, events or agents.
    pub fn is_empty(&self) -> bool {
        !self
            .root
            .children
            .iter()
            .any(|child| matches!(child.local_name(), "object" | "event" | "agent"))
    }

    pub fn objects(&self) -> Vec<PremisObject> {
        self.root.children_named("object").map(read_object).collect()
    }

    pub fn events(&self) -> Vec<PremisEvent> {
        self.root.children_named("event").map(read_event).collect()
    }

    pub fn agents(&self) -> Vec<PremisAgent> {
        self.root.children_named("agent").map(read_agent).collect()
    }

    /// Add a file object unless one with the same original name exists.
    ///
    /// Returns whether an object was added. An existing object is never
    /// updated.
    pub fn append_object(&mut self, original_name: &str, id_type: &str, id_value: &str) -> bool {
        if self.object_position(original_name).is_some() {
            return false;
        }

        let names = self.names();
        let format = names.element("format").with_child(
            names
                .element("formatDesignation")
                .with_child(names.leaf("formatName", "")),
        );
        let object = names
            .element("object")
            .with_attribute("xsi:type", names.qualify("file"))
            .with_child(names.identifier(
                "objectIdentifier",
                &Identifier::new(id_type, id_value),
            ))
            .with_child(names.element("objectCharacteristics").with_child(format))
            .with_child(names.leaf("originalName", original_name));

        if self.root.attribute("xmlns:xsi").is_none() {
            self.root
                .attributes
                .push(("xmlns:xsi".to_string(), XSI_NAMESPACE.to_string()));
        }
        self.insert_record(object);
        true
    }

    /// Add an agent unless an identical one exists. Returns whether it was added.
    pub fn append_agent(&mut self, agent: &PremisAgent) -> bool {
        if self
            .root
            .children_named("agent")
            .any(|existing| &read_agent(existing) == agent)
        {
            return false;
        }

        let names = self.names();
        let node = names
            .element("agent")
            .with_child(names.identifier("agentIdentifier", &agent.identifier))
            .with_child(names.leaf("agentName", &agent.name))
            .with_child(names.leaf("agentType", &agent.agent_type));
        self.insert_record(node);
        true
    }

    /// Record a new event and link it from the target objects.
    ///
    /// Events are never deduplicated: every call creates a record with a
    /// fresh identifier and timestamp. Named targets are all resolved before
    /// the document is changed.
    pub fn append_event(
        &mut self,
        summary: &EventSummary,
        agent: &PremisAgent,
        targets: EventTargets<'_>,
        ctx: &EventContext,
    ) -> PremisResult<Identifier> {
        let positions: Vec<usize> = match targets {
            EventTargets::AllObjects => self
                .root
                .children
                .iter()
                .enumerate()
                .filter(|(_, child)| child.local_name() == "object")
                .map(|(index, _)| index)
                .collect(),
            EventTargets::Named([]) => return Err(PremisError::NoEventTargets),
            EventTargets::Named(names) => names
                .iter()
                .map(|name| {
                    self.object_position(name)
                        .ok_or_else(|| PremisError::ElementNotFound(name.clone()))
                })
                .collect::<PremisResult<_>>()?,
        };

        let identifier = Identifier::uuid(ctx.next_id());
        let date_time = ctx.now().to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let names = self.names();
        let event = names
            .element("event")
            .with_child(names.identifier("eventIdentifier", &identifier))
            .with_child(names.leaf("eventType", &summary.event_type))
            .with_child(names.leaf("eventDateTime", &date_time))
            .with_child(
                names
                    .element("eventDetailInformation")
                    .with_child(names.leaf("eventDetail", &summary.detail)),
            )
            .with_child(
                names
                    .element("eventOutcomeInformation")
                    .with_child(names.leaf("eventOutcome", &summary.outcome))
                    .with_child(names.element("eventOutcomeDetail").with_child(
                        names.leaf("eventOutcomeDetailNote", &summary.outcome_detail),
                    )),
            )
            .with_child(names.identifier("linkingAgentIdentifier", &agent.identifier));

        let link = names.identifier("linkingEventIdentifier", &identifier);
        for position in &positions {
            link_event(&mut self.root.children[*position], link.clone());
        }
        self.insert_record(event);

        debug!(
            event = %identifier.value,
            event_type = %summary.event_type,
            objects = positions.len(),
            "appended PREMIS event"
        );
        Ok(identifier)
    }

    pub fn object(&self, original_name: &str) -> Option<PremisObject> {
        self.object_position(original_name)
            .map(|position| read_object(&self.root.children[position]))
    }

    pub fn agent(&self, identifier: &Identifier) -> Option<PremisAgent> {
        self.root
            .children_named("agent")
            .map(read_agent)
            .find(|agent| &agent.identifier == identifier)
    }

    /// Events linked from the object with this original name, in link order.
    pub fn events_for(&self, original_name: &str) -> Vec<PremisEvent> {
        let Some(object) = self.object(original_name) else {
            return Vec::new();
        };
        let events = self.events();
        object
            .linked_events
            .iter()
            .filter_map(|link| events.iter().find(|event| &event.identifier == link))
            .cloned()
            .collect()
    }

    fn object_position(&self, original_name: &str) -> Option<usize> {
        self.root.children.iter().position(|child| {
            child.local_name() == "object" && child.text_at(&["originalName"]) == original_name
        })
    }

    fn names(&self) -> Names {
        Names {
            prefix: self.root.prefix().map(str::to_string),
        }
    }

    fn insert_record(&mut self, node: Node) {
        let rank = |name: &str| RECORD_ORDER.iter().position(|kind| *kind == name);
        let own = rank(node.local_name());
        let position = self
            .root
            .children
            .iter()
            .position(|child| match (rank(child.local_name()), own) {
                (Some(theirs), Some(own)) => theirs > own,
                _ => false,
            })
            .unwrap_or(self.root.children.len());
        self.root.children.insert(position, node);
    }
}

/// Builds elements in the namespace prefix the document root uses.
struct Names {
    prefix: Option<String>,
}

impl Names {
    fn qualify(&self, local: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        }
    }

    fn element(&self, local: &str) -> Node {
        Node::new(self.qualify(local))
    }

    fn leaf(&self, local: &str, text: &str) -> Node {
        self.element(local).with_text(text)
    }

    /// An element holding a `<name>Type` and `<name>Value` pair.
    fn identifier(&self, local: &str, identifier: &Identifier) -> Node {
        self.element(local)
            .with_child(self.leaf(&format!("{local}Type"), &identifier.id_type))
            .with_child(self.leaf(&format!("{local}Value"), &identifier.value))
    }
}

/// Add `link` after the object's existing event links, ahead of any rights
/// links.
fn link_event(object: &mut Node, link: Node) {
    let children = &object.children;
    let position = match children
        .iter()
        .rposition(|child| child.local_name() == "linkingEventIdentifier")
    {
        Some(last) => last + 1,
        None => children
            .iter()
            .position(|child| child.local_name() == "linkingRightsStatementIdentifier")
            .unwrap_or(children.len()),
    };
    object.children.insert(position, link);
}

fn read_identifier(node: &Node, name: &str) -> Identifier {
    Identifier::new(
        node.text_at(&[name, &format!("{name}Type")]),
        node.text_at(&[name, &format!("{name}Value")]),
    )
}

fn read_object(node: &Node) -> PremisObject {
    PremisObject {
        identifier: read_identifier(node, "objectIdentifier"),
        format_name: node.text_at(&[
            "objectCharacteristics",
            "format",
            "formatDesignation",
            "formatName",
        ]),
        original_name: node.text_at(&["originalName"]),
        linked_events: node
            .children_named("linkingEventIdentifier")
            .map(|link| {
                Identifier::new(
                    link.text_at(&["linkingEventIdentifierType"]),
                    link.text_at(&["linkingEventIdentifierValue"]),
                )
            })
            .collect(),
    }
}

fn read_event(node: &Node) -> PremisEvent {
    PremisEvent {
        identifier: read_identifier(node, "eventIdentifier"),
        event_type: node.text_at(&["eventType"]),
        date_time: node.text_at(&["eventDateTime"]),
        detail: node.text_at(&["eventDetailInformation", "eventDetail"]),
        outcome: node.text_at(&["eventOutcomeInformation", "eventOutcome"]),
        outcome_detail: node.text_at(&[
            "eventOutcomeInformation",
            "eventOutcomeDetail",
            "eventOutcomeDetailNote",
        ]),
        linking_agent: read_identifier(node, "linkingAgentIdentifier"),
    }
}

fn read_agent(node: &Node) -> PremisAgent {
    PremisAgent {
        identifier: read_identifier(node, "agentIdentifier"),
        name: node.text_at(&["agentName"]),
        agent_type: node.text_at(&["agentType"]),
    }
}
