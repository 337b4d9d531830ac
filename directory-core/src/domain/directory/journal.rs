//! Mutation journal that keeps reloads from clobbering newer mutations.
//!
//! A reload takes a watermark before it reads the store. Every mutation that
//! commits while a reload is in flight is journaled under a sequence number.
//! When the reload publishes, it replays entries at or after its watermark
//! onto the records it read. Patches are idempotent, so replaying one whose
//! store write the reload already observed is harmless.

use crate::domain::customer::{Customer, CustomerId};

use super::state::DirectorySnapshot;

/// In-memory effect of a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RecordPatch {
    Insert(Customer),
    Replace(Customer),
    Remove(CustomerId),
}

impl RecordPatch {
    pub(super) fn apply(&self, snapshot: &mut DirectorySnapshot) {
        match self {
            Self::Insert(record) => snapshot.upsert(record.clone()),
            Self::Replace(record) => snapshot.replace(record.clone()),
            Self::Remove(id) => snapshot.remove(id),
        }
    }
}

#[derive(Debug)]
struct JournalEntry {
    sequence: u64,
    patch: RecordPatch,
}

/// Watermark handed to a reload when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Watermark(u64);

#[derive(Debug, Default)]
pub(super) struct ReconcileLog {
    next_sequence: u64,
    active_reloads: usize,
    entries: Vec<JournalEntry>,
}

impl ReconcileLog {
    pub(super) fn begin_reload(&mut self) -> Watermark {
        self.active_reloads += 1;
        Watermark(self.next_sequence)
    }

    pub(super) fn end_reload(&mut self) {
        self.active_reloads = self.active_reloads.saturating_sub(1);
        if self.active_reloads == 0 {
            self.entries.clear();
        }
    }

    /// Record a committed patch. Only kept while a reload is in flight.
    pub(super) fn record(&mut self, patch: RecordPatch) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if self.active_reloads > 0 {
            self.entries.push(JournalEntry { sequence, patch });
        }
    }

    pub(super) fn patches_since(&self, watermark: Watermark) -> impl Iterator<Item = &RecordPatch> {
        self.entries
            .iter()
            .filter(move |entry| entry.sequence >= watermark.0)
            .map(|entry| &entry.patch)
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}
