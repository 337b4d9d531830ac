//! Directory configuration loaded via OrthoConfig.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoResult};
use serde::Deserialize;

use crate::domain::DirectoryConfig;

const DEFAULT_DATABASE_FILE: &str = "customers.db";
const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_EXAMPLE_COUNT: usize = 12;

/// Settings controlling storage, the remote source, and mutation mirroring.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DIRECTORY")]
pub struct DirectorySettings {
    /// Mirror add/update/delete to the remote source.
    #[ortho_config(default = false)]
    pub remote_mutations_enabled: bool,
    /// SQLite database file.
    pub database_path: Option<PathBuf>,
    /// GraphQL endpoint of the remote customer API.
    pub remote_endpoint: Option<String>,
    /// API key sent as `x-api-key` to the remote endpoint.
    pub remote_api_key: Option<String>,
    /// Remote request timeout in milliseconds.
    pub remote_timeout_ms: Option<u64>,
    /// Serve generated example customers as the remote when no endpoint is set.
    pub example_seed: Option<u64>,
    /// Number of example customers to generate.
    pub example_count: Option<usize>,
}

impl DirectorySettings {
    /// Load settings from the environment and configuration files only.
    ///
    /// Command-line flags belong to the driver, so only the program name is
    /// passed to the loader.
    pub fn load_from_env() -> OrthoResult<Self> {
        Self::load_from_iter([OsString::from("customer-directory")])
    }

    /// Return the configured database path, falling back to `customers.db`.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms.unwrap_or(DEFAULT_REMOTE_TIMEOUT_MS))
    }

    pub fn example_count(&self) -> usize {
        self.example_count.unwrap_or(DEFAULT_EXAMPLE_COUNT)
    }

    /// Engine configuration derived from these settings.
    pub fn directory_config(&self) -> DirectoryConfig {
        DirectoryConfig {
            remote_mutations_enabled: self.remote_mutations_enabled,
        }
    }
}
