//! Time and identifier sources for new events.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::fmt;
use uuid::Uuid;

/// Source of the current time.
pub trait Clock: fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh identifier values.
pub trait IdSource: fmt::Debug {
    fn next_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// A clock that starts at a fixed instant and advances one second per call.
#[derive(Debug)]
pub struct FixedClock {
    next: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            next: Cell::new(start),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + Duration::seconds(1));
        now
    }
}

/// Deterministic identifiers of the form `<prefix>-<n>`, starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Cell::new(0),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        format!("{}-{n}", self.prefix)
    }
}

/// The collaborators a mutating PREMIS operation needs.
#[derive(Debug)]
pub struct EventContext {
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
}

impl EventContext {
    pub fn new(clock: impl Clock + 'static, ids: impl IdSource + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            ids: Box::new(ids),
        }
    }

    /// Wall clock and random UUIDs.
    pub fn system() -> Self {
        Self::new(SystemClock, UuidSource)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::system()
    }
}
