//! Local-first customer directory core.
//!
//! The crate is split along hexagonal lines:
//!
//! - [`domain`]: customer model, role normalisation, filter projection, the
//!   reconciliation engine ([`domain::CustomerDirectory`]), and the ports it
//!   drives.
//! - [`outbound`]: adapters for those ports (Diesel/SQLite store, GraphQL and
//!   example remote sources, tracing diagnostics).
//! - [`inbound`]: the command-line driver that exercises the engine's action
//!   surface.
//! - [`bootstrap`]: composition root wiring settings to adapters.

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bootstrap::{BootstrapError, build_directory};
pub use config::DirectorySettings;
