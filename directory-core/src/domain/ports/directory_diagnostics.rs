//! Observability hook for the reconciliation engine.
//!
//! The engine reports what it did (and what it silently recovered from) as
//! typed [`DirectoryEvent`]s. Adapters decide where they go: the tracing
//! adapter turns them into log events, tests record them for assertions.

use std::fmt;

use crate::domain::DirectoryAction;

/// Severity attached to each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Where the published record set came from after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    /// Seeded from the remote source into an empty store.
    RemoteSeed,
    /// Read back from the local store.
    LocalStore,
}

impl fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteSeed => f.write_str("remote_seed"),
            Self::LocalStore => f.write_str("local_store"),
        }
    }
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    /// The store probe found no customer table.
    StoreProbeFailed,
    /// The write-path self-test failed.
    SelfTestFailed { message: String },
    /// The local store already holds rows, so no seed was attempted.
    SeedNotNeeded { local_count: usize },
    /// The remote fetch for seeding failed.
    SeedFetchFailed { message: String },
    /// The remote answered with no customers.
    SeedRemoteEmpty,
    /// The remote reported more pages; only the first is used.
    SeedCursorIgnored,
    /// Writing seeded customers to the store failed.
    SeedWriteFailed { message: String },
    /// Seeded customers were written to the store.
    SeedApplied { count: usize },
    /// The role constraint was dropped after a write was rejected.
    RoleConstraintRelaxed { preserved_rows: usize },
    /// A load published its record set.
    Loaded { origin: RecordOrigin, count: usize },
    /// A refresh published its record set.
    Refreshed { count: usize },
    /// Mutations that landed during a reload were re-applied to its snapshot.
    ReloadMergedMutations { replayed: usize },
    /// A best-effort remote mirror call failed.
    RemoteMirrorFailed {
        action: DirectoryAction,
        message: String,
    },
    /// A local store failure surfaced to the caller.
    ActionFailed {
        action: DirectoryAction,
        message: String,
    },
}

impl DirectoryEvent {
    /// Severity of this event.
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            Self::SeedCursorIgnored | Self::Refreshed { .. } | Self::SeedNotNeeded { .. } => {
                DiagnosticLevel::Debug
            }
            Self::SeedRemoteEmpty
            | Self::SeedApplied { .. }
            | Self::Loaded { .. }
            | Self::ReloadMergedMutations { .. } => DiagnosticLevel::Info,
            Self::StoreProbeFailed
            | Self::SelfTestFailed { .. }
            | Self::SeedFetchFailed { .. }
            | Self::SeedWriteFailed { .. }
            | Self::RoleConstraintRelaxed { .. }
            | Self::RemoteMirrorFailed { .. } => DiagnosticLevel::Warn,
            Self::ActionFailed { .. } => DiagnosticLevel::Error,
        }
    }
}

/// Sink for engine diagnostics.
pub trait DirectoryDiagnostics: Send + Sync {
    /// Record one event.
    fn record(&self, event: DirectoryEvent);
}

/// Diagnostics sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDirectoryDiagnostics;

impl DirectoryDiagnostics for NoOpDirectoryDiagnostics {
    fn record(&self, _event: DirectoryEvent) {}
}
