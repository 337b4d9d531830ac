//! Test utilities for the directory core.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Only compiled for tests or with the `test-support` feature.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{DiagnosticLevel, DirectoryDiagnostics, DirectoryEvent};

pub mod source;
pub mod sqlite;
pub mod store;

pub use source::ScriptedCustomerSource;
pub use sqlite::TempCustomerDatabase;
pub use store::{StoreOperation, StubCustomerStore};

/// Clock frozen at one instant.
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Diagnostics sink that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingDiagnostics(Mutex<Vec<DirectoryEvent>>);

impl RecordingDiagnostics {
    pub fn events(&self) -> Vec<DirectoryEvent> {
        self.lock_events().clone()
    }

    /// Whether any recorded event satisfies `predicate`.
    pub fn any(&self, predicate: impl Fn(&DirectoryEvent) -> bool) -> bool {
        self.lock_events().iter().any(predicate)
    }

    /// Events recorded at `level` or above.
    pub fn at_least(&self, level: DiagnosticLevel) -> Vec<DirectoryEvent> {
        self.lock_events()
            .iter()
            .filter(|event| event.level() >= level)
            .cloned()
            .collect()
    }

    fn lock_events(&self) -> MutexGuard<'_, Vec<DirectoryEvent>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("diagnostics mutex"),
        }
    }
}

impl DirectoryDiagnostics for RecordingDiagnostics {
    fn record(&self, event: DirectoryEvent) {
        self.lock_events().push(event);
    }
}
