use chrono::{TimeZone, Utc};
use sipx_prov::{
    add_premis_agent, add_premis_event, add_premis_objects, EventContext, EventSummary,
    FixedClock, PremisAgent, PremisDocument, SequentialIds,
};
use std::fs;
use tempfile::TempDir;

fn deterministic() -> EventContext {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    EventContext::new(FixedClock::new(start), SequentialIds::new("uuid"))
}

#[test]
fn repeated_activities_produce_expected_records() {
    let content = TempDir::new().unwrap();
    fs::create_dir_all(content.path().join("docs")).unwrap();
    fs::write(content.path().join("docs/report.pdf"), b"%PDF").unwrap();
    fs::write(content.path().join("readme.txt"), b"hello").unwrap();

    let out = TempDir::new().unwrap();
    let premis = out.path().join("metadata").join("premis.xml");
    fs::create_dir_all(premis.parent().unwrap()).unwrap();

    let ctx = deterministic();
    let agent = PremisAgent::new(
        "url",
        "https://archive.example.org",
        "Example Archive",
        "organization",
    );
    let summary = EventSummary::new("ingestion", "Package ingested", "success", "");

    // Simulate retries of every activity.
    for _ in 0..2 {
        add_premis_objects(&premis, content.path(), &ctx).unwrap();
        add_premis_agent(&premis, &agent).unwrap();
    }
    add_premis_event(&premis, &summary, &agent, &ctx).unwrap();
    add_premis_event(&premis, &summary, &agent, &ctx).unwrap();

    let doc = PremisDocument::parse_or_initialize(&premis).unwrap();
    let events = doc.events();
    assert_eq!(doc.objects().len(), 2);
    assert_eq!(doc.agents().len(), 1);
    assert_eq!(events.len(), 2);
    assert_ne!(events[0].identifier, events[1].identifier);
    for object in &doc.objects() {
        assert_eq!(object.linked_events.len(), 2);
        assert_eq!(doc.events_for(&object.original_name).len(), 2);
    }
}

#[test]
fn written_file_layout() {
    let out = TempDir::new().unwrap();
    let premis = out.path().join("premis.xml");

    let mut doc = PremisDocument::new();
    doc.append_object("data/objects/a.txt", "UUID", "u1");
    doc.append_agent(&PremisAgent::software("sipx", "0.1.0"));
    doc.save(&premis).unwrap();

    let xml = fs::read_to_string(&premis).unwrap();
    let object = xml.find("<premis:object ").unwrap();
    let agent = xml.find("<premis:agent>").unwrap();
    assert!(object < agent);
    assert!(xml.contains(r#"xmlns:premis="http://www.loc.gov/premis/v3""#));
    assert!(xml.contains("\n  <premis:object "));
    assert!(xml.ends_with("</premis:premis>\n"));
}

#[test]
fn foreign_records_survive_activities() {
    let content = TempDir::new().unwrap();
    fs::write(content.path().join("a.txt"), b"a").unwrap();
    let out = TempDir::new().unwrap();
    let premis = out.path().join("premis.xml");
    fs::write(
        &premis,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<premis:premis xmlns:premis="http://www.loc.gov/premis/v3" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" version="3.0">
  <premis:object xsi:type="premis:intellectualEntity">
    <premis:objectIdentifier>
      <premis:objectIdentifierType>local</premis:objectIdentifierType>
      <premis:objectIdentifierValue>ie-1</premis:objectIdentifierValue>
    </premis:objectIdentifier>
  </premis:object>
  <premis:event>
    <premis:eventIdentifier>
      <premis:eventIdentifierType>local</premis:eventIdentifierType>
      <premis:eventIdentifierValue>digitization-1</premis:eventIdentifierValue>
    </premis:eventIdentifier>
    <premis:eventType>digitization</premis:eventType>
    <premis:eventDateTime>2019-03-01T10:00:00</premis:eventDateTime>
    <premis:linkingAgentIdentifier>
      <premis:linkingAgentIdentifierType>local</premis:linkingAgentIdentifierType>
      <premis:linkingAgentIdentifierValue>scanner</premis:linkingAgentIdentifierValue>
    </premis:linkingAgentIdentifier>
    <premis:linkingAgentIdentifier>
      <premis:linkingAgentIdentifierType>local</premis:linkingAgentIdentifierType>
      <premis:linkingAgentIdentifierValue>operator</premis:linkingAgentIdentifierValue>
    </premis:linkingAgentIdentifier>
  </premis:event>
  <premis:rights>
    <premis:rightsStatement>
      <premis:rightsBasis>statute</premis:rightsBasis>
    </premis:rightsStatement>
  </premis:rights>
</premis:premis>
"#,
    )
    .unwrap();

    let ctx = deterministic();
    add_premis_objects(&premis, content.path(), &ctx).unwrap();
    add_premis_agent(&premis, &PremisAgent::software("sipx", "0.1.0")).unwrap();

    let xml = fs::read_to_string(&premis).unwrap();
    assert!(xml.contains("<premis:eventDateTime>2019-03-01T10:00:00</premis:eventDateTime>"));
    assert!(xml.contains("<premis:rightsBasis>statute</premis:rightsBasis>"));
    assert!(xml.contains(r#"<premis:object xsi:type="premis:intellectualEntity">"#));
    assert!(xml.contains("<premis:linkingAgentIdentifierValue>operator</premis:linkingAgentIdentifierValue>"));
    assert!(xml.rfind("<premis:object ").unwrap() < xml.find("<premis:event>").unwrap());

    let doc = PremisDocument::parse_or_initialize(&premis).unwrap();
    assert_eq!(doc.objects().len(), 2);
    assert!(doc.object("data/objects/a.txt").is_some());
    assert_eq!(doc.events()[0].event_type, "digitization");
}
