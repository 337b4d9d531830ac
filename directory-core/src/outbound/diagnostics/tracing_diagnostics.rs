//! `tracing`-backed directory diagnostics.

use tracing::{debug, error, info, warn};

use crate::domain::ports::{DiagnosticLevel, DirectoryDiagnostics, DirectoryEvent};

/// Emits each [`DirectoryEvent`] as a `tracing` event at its own level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

macro_rules! emit {
    ($level:expr, $name:expr, $detail:expr) => {
        match $level {
            DiagnosticLevel::Debug => debug!(event = $name, "{}", $detail),
            DiagnosticLevel::Info => info!(event = $name, "{}", $detail),
            DiagnosticLevel::Warn => warn!(event = $name, "{}", $detail),
            DiagnosticLevel::Error => error!(event = $name, "{}", $detail),
        }
    };
}

impl DirectoryDiagnostics for TracingDiagnostics {
    fn record(&self, event: DirectoryEvent) {
        emit!(event.level(), event_name(&event), describe(&event));
    }
}

/// Stable snake_case name used as the `event` field.
pub(super) fn event_name(event: &DirectoryEvent) -> &'static str {
    match event {
        DirectoryEvent::StoreProbeFailed => "store_probe_failed",
        DirectoryEvent::SelfTestFailed { .. } => "self_test_failed",
        DirectoryEvent::SeedNotNeeded { .. } => "seed_not_needed",
        DirectoryEvent::SeedFetchFailed { .. } => "seed_fetch_failed",
        DirectoryEvent::SeedRemoteEmpty => "seed_remote_empty",
        DirectoryEvent::SeedCursorIgnored => "seed_cursor_ignored",
        DirectoryEvent::SeedWriteFailed { .. } => "seed_write_failed",
        DirectoryEvent::SeedApplied { .. } => "seed_applied",
        DirectoryEvent::RoleConstraintRelaxed { .. } => "role_constraint_relaxed",
        DirectoryEvent::Loaded { .. } => "loaded",
        DirectoryEvent::Refreshed { .. } => "refreshed",
        DirectoryEvent::ReloadMergedMutations { .. } => "reload_merged_mutations",
        DirectoryEvent::RemoteMirrorFailed { .. } => "remote_mirror_failed",
        DirectoryEvent::ActionFailed { .. } => "action_failed",
    }
}

pub(super) fn describe(event: &DirectoryEvent) -> String {
    match event {
        DirectoryEvent::StoreProbeFailed => "customer table not found by probe".to_owned(),
        DirectoryEvent::SelfTestFailed { message } => {
            format!("store self-test failed: {message}")
        }
        DirectoryEvent::SeedNotNeeded { local_count } => {
            format!("local store holds {local_count} customers; remote seed skipped")
        }
        DirectoryEvent::SeedFetchFailed { message } => {
            format!("remote seed fetch failed: {message}")
        }
        DirectoryEvent::SeedRemoteEmpty => "remote returned no customers to seed".to_owned(),
        DirectoryEvent::SeedCursorIgnored => {
            "remote reported more pages; only the first is used".to_owned()
        }
        DirectoryEvent::SeedWriteFailed { message } => {
            format!("writing seeded customers failed: {message}")
        }
        DirectoryEvent::SeedApplied { count } => format!("seeded {count} customers from remote"),
        DirectoryEvent::RoleConstraintRelaxed { preserved_rows } => format!(
            "role constraint dropped after rejected write; {preserved_rows} existing rows re-inserted"
        ),
        DirectoryEvent::Loaded { origin, count } => {
            format!("loaded {count} customers from {origin}")
        }
        DirectoryEvent::Refreshed { count } => format!("refreshed {count} customers"),
        DirectoryEvent::ReloadMergedMutations { replayed } => {
            format!("re-applied {replayed} mutations committed during reload")
        }
        DirectoryEvent::RemoteMirrorFailed { action, message } => {
            format!("remote {action} failed; local result kept: {message}")
        }
        DirectoryEvent::ActionFailed { action, message } => {
            format!("{}: {message}", action.failure_message())
        }
    }
}
