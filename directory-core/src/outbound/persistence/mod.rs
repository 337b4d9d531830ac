//! SQLite persistence adapter using Diesel ORM.
//!
//! The adapter owns one connection, opened by `initialize` and released by
//! `close`, and translates between Diesel rows and domain customers. No
//! reconciliation logic lives here.
//!
//! # Example
//!
//! ```ignore
//! use directory_core::outbound::persistence::{DieselCustomerStore, StoreConfig};
//!
//! let store = DieselCustomerStore::new(StoreConfig::new("customers.db"));
//! store.initialize().await?;
//! ```

mod connection;
mod diesel_customer_store;
mod error_mapping;
mod models;
mod schema;

pub use connection::StoreConfig;
pub use diesel_customer_store::DieselCustomerStore;
