//! PREMIS provenance records for archival packages.
//!
//! A [`PremisDocument`] holds file objects, preservation events and the
//! agents that performed them. Documents are read from disk, changed and
//! written back whole; the [`activity`] module wraps that cycle for the
//! common operations.
//!
//! # Example
//!
//! ```
//! use sipx_prov::{EventContext, EventSummary, EventTargets, PremisAgent, PremisDocument};
//!
//! let mut doc = PremisDocument::new();
//! doc.append_object("data/objects/a.txt", "UUID", "2f1c0a56-4f0a-4b4e-9a57-0c8f4d9c3a11");
//!
//! let agent = PremisAgent::software("sipx", "0.1.0");
//! doc.append_agent(&agent);
//! let summary = EventSummary::new("ingestion", "", "success", "");
//! doc.append_event(&summary, &agent, EventTargets::AllObjects, &EventContext::system())
//!     .unwrap();
//!
//! let xml = doc.to_xml().unwrap();
//! assert!(xml.contains("<premis:originalName>data/objects/a.txt</premis:originalName>"));
//! ```

pub mod activity;
mod context;
mod document;
mod error;
mod types;
mod xml;

pub use activity::{
    add_premis_agent, add_premis_event, add_premis_objects, add_validation_event,
    identify_formats, FormatIdentifier, FormatMap, StaticValidator, Validator,
};
pub use context::{
    Clock, EventContext, FixedClock, IdSource, SequentialIds, SystemClock, UuidSource,
};
pub use document::{
    EventTargets, PremisDocument, PREMIS_NAMESPACE, PREMIS_SCHEMA_LOCATION, PREMIS_VERSION,
    XSI_NAMESPACE,
};
pub use error::{PremisError, PremisResult};
pub use types::{
    EventOutcome, EventSummary, Identifier, PremisAgent, PremisEvent, PremisObject,
    UUID_IDENTIFIER_TYPE,
};
