//! Throwaway on-disk SQLite databases for store tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::outbound::persistence::{DieselCustomerStore, StoreConfig};

/// Temporary directory holding one customer database file.
///
/// The directory and file are removed when this value drops.
pub struct TempCustomerDatabase {
    _dir: TempDir,
    path: PathBuf,
}

impl TempCustomerDatabase {
    /// Create an empty temporary directory for the database file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("customers.db");
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> StoreConfig {
        StoreConfig::new(&self.path)
    }

    /// A new, uninitialized store pointed at this database.
    pub fn store(&self) -> DieselCustomerStore {
        DieselCustomerStore::new(self.config())
    }
}
