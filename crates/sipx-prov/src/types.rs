//! PREMIS record types.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Identifier type used for objects and events created by this crate.
pub const UUID_IDENTIFIER_TYPE: &str = "UUID";

/// A typed identifier, as found in `objectIdentifier`, `eventIdentifier`,
/// `agentIdentifier` and their linking counterparts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub id_type: String,
    pub value: String,
}

impl Identifier {
    pub fn new(id_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id_type: id_type.into(),
            value: value.into(),
        }
    }

    pub fn uuid(value: impl Into<String>) -> Self {
        Self::new(UUID_IDENTIFIER_TYPE, value)
    }
}

/// A file object.
///
/// Objects are identified by their original name: the document holds at most
/// one object per name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PremisObject {
    pub identifier: Identifier,
    /// Format name; left empty when the object is first recorded
    pub format_name: String,
    /// Path of the file in the transfer (e.g. "data/objects/a.txt")
    pub original_name: String,
    /// Events that concern this object, in insertion order
    pub linked_events: Vec<Identifier>,
}

/// A preservation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PremisEvent {
    pub identifier: Identifier,
    pub event_type: String,
    /// `eventDateTime` as written in the document. Events recorded by this
    /// crate use RFC 3339 in UTC; other writers may use any xs:dateTime form.
    pub date_time: String,
    pub detail: String,
    pub outcome: String,
    pub outcome_detail: String,
    /// The agent that performed the event
    pub linking_agent: Identifier,
}

impl PremisEvent {
    /// The event time, if `date_time` is an xs:dateTime. A value without a
    /// zone offset is taken as UTC.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.date_time.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

/// A person, organization or piece of software that performs events.
///
/// Two agents are the same record when identifier type, identifier value,
/// name and agent type all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PremisAgent {
    pub identifier: Identifier,
    pub name: String,
    pub agent_type: String,
}

impl PremisAgent {
    pub fn new(
        id_type: impl Into<String>,
        id_value: impl Into<String>,
        name: impl Into<String>,
        agent_type: impl Into<String>,
    ) -> Self {
        Self {
            identifier: Identifier::new(id_type, id_value),
            name: name.into(),
            agent_type: agent_type.into(),
        }
    }

    /// A software agent identified by name and version.
    pub fn software(name: &str, version: &str) -> Self {
        Self::new("Name", format!("{name} v{version}"), name, "software")
    }
}

/// Outcome of a validation-style event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Valid,
    Invalid,
}

impl EventOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            EventOutcome::Valid => "valid",
            EventOutcome::Invalid => "invalid",
        }
    }
}

/// Descriptive fields of an event, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub event_type: String,
    pub detail: String,
    pub outcome: String,
    pub outcome_detail: String,
}

impl EventSummary {
    pub fn new(
        event_type: impl Into<String>,
        detail: impl Into<String>,
        outcome: impl Into<String>,
        outcome_detail: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            detail: detail.into(),
            outcome: outcome.into(),
            outcome_detail: outcome_detail.into(),
        }
    }

    /// A validation event whose outcome follows from whether problems were found.
    pub fn validation(detail: impl Into<String>, problems: &[String]) -> Self {
        let (outcome, note) = if problems.is_empty() {
            (EventOutcome::Valid, "No problems found".to_string())
        } else {
            (EventOutcome::Invalid, problems.join("\n"))
        };
        Self::new("validation", detail, outcome.as_str(), note)
    }
}
