//! Errors surfaced by the reconciliation engine's action surface.

use std::fmt;

use super::ports::CustomerStoreError;

/// Engine action that touched the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryAction {
    Load,
    Refresh,
    Add,
    Update,
    Delete,
}

impl DirectoryAction {
    /// User-facing message stored in `last_error` when this action fails.
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Load => "Failed to load customers",
            Self::Refresh => "Failed to refresh customers",
            Self::Add => "Failed to add customer",
            Self::Update => "Failed to update customer",
            Self::Delete => "Failed to delete customer",
        }
    }
}

impl fmt::Display for DirectoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Refresh => "refresh",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Failure returned by engine actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// The local store rejected the action's write or read.
    #[error("{}: {source}", action.failure_message())]
    Store {
        action: DirectoryAction,
        #[source]
        source: CustomerStoreError,
    },
}

impl DirectoryError {
    pub(crate) fn store(action: DirectoryAction, source: CustomerStoreError) -> Self {
        Self::Store { action, source }
    }

    /// The action that failed.
    pub fn action(&self) -> DirectoryAction {
        match self {
            Self::Store { action, .. } => *action,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DirectoryAction::Load, "Failed to load customers")]
    #[case(DirectoryAction::Refresh, "Failed to refresh customers")]
    #[case(DirectoryAction::Add, "Failed to add customer")]
    #[case(DirectoryAction::Update, "Failed to update customer")]
    #[case(DirectoryAction::Delete, "Failed to delete customer")]
    fn failure_messages_are_stable(#[case] action: DirectoryAction, #[case] expected: &str) {
        assert_eq!(action.failure_message(), expected);
    }

    #[test]
    fn store_error_display_leads_with_action_message() {
        let error = DirectoryError::store(
            DirectoryAction::Add,
            CustomerStoreError::query("disk I/O error"),
        );
        assert_eq!(
            error.to_string(),
            "Failed to add customer: customer store query failed: disk I/O error"
        );
        assert_eq!(error.action(), DirectoryAction::Add);
    }
}
