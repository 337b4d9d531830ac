//! Single SQLite connection handle with an explicit lifecycle.
//!
//! `diesel-async` wraps the synchronous SQLite connection so queries run on
//! a blocking thread instead of the executor. The handle moves through
//! uninitialized → open → closed; checkouts outside the open state fail with
//! `NotInitialized`.

use std::path::Path;

use diesel::SqliteConnection;
use diesel_async::AsyncConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use crate::domain::ports::CustomerStoreError;

use super::error_mapping::map_connection_error;

/// Async SQLite connection used by the store.
pub(crate) type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// Location of the customer database.
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::new("customers.db");
/// let ephemeral = StoreConfig::in_memory();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_url: String,
}

impl StoreConfig {
    /// Store backed by a file, created on first open.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: path.as_ref().to_string_lossy().into_owned(),
        }
    }

    /// Store that lives only as long as its handle stays open.
    pub fn in_memory() -> Self {
        Self {
            database_url: ":memory:".to_owned(),
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

enum HandleState {
    Uninitialized,
    Open(SqliteConn),
    Closed,
}

/// Owner of the one open connection.
pub(crate) struct ConnectionHandle {
    config: StoreConfig,
    state: Mutex<HandleState>,
}

impl ConnectionHandle {
    pub(crate) fn new(config: StoreConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HandleState::Uninitialized),
        }
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open the connection if it is not already open and return it.
    pub(crate) async fn open(&self) -> Result<MappedMutexGuard<'_, SqliteConn>, CustomerStoreError> {
        let mut state = self.state.lock().await;
        if !matches!(*state, HandleState::Open(_)) {
            let conn = SqliteConn::establish(self.config.database_url())
                .await
                .map_err(map_connection_error)?;
            *state = HandleState::Open(conn);
        }
        Self::map_open(state)
    }

    /// Borrow the open connection.
    pub(crate) async fn checkout(
        &self,
    ) -> Result<MappedMutexGuard<'_, SqliteConn>, CustomerStoreError> {
        Self::map_open(self.state.lock().await)
    }

    /// Drop the connection. Safe to call in any state.
    pub(crate) async fn close(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, HandleState::Open(_)) {
            *state = HandleState::Closed;
        }
    }

    fn map_open(
        state: MutexGuard<'_, HandleState>,
    ) -> Result<MappedMutexGuard<'_, SqliteConn>, CustomerStoreError> {
        MutexGuard::try_map(state, |state| match state {
            HandleState::Open(conn) => Some(conn),
            HandleState::Uninitialized | HandleState::Closed => None,
        })
        .map_err(|_| CustomerStoreError::not_initialized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_keeps_path() {
        let config = StoreConfig::new("/tmp/customers.db");
        assert_eq!(config.database_url(), "/tmp/customers.db");
    }

    #[tokio::test]
    async fn checkout_before_open_is_not_initialized() {
        let handle = ConnectionHandle::new(StoreConfig::in_memory());
        let error = handle.checkout().await.err().expect("no open handle");
        assert_eq!(error, CustomerStoreError::NotInitialized);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_checkout() {
        let handle = ConnectionHandle::new(StoreConfig::in_memory());
        drop(handle.open().await.expect("open in-memory database"));
        handle.close().await;
        handle.close().await;
        assert!(handle.checkout().await.is_err());
    }
}
