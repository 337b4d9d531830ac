//! Domain primitives, the reconciliation engine, and its ports.
//!
//! Purpose: own the customer model and every rule about how local storage,
//! the remote source, and the in-memory view are reconciled. Adapters live in
//! `crate::outbound` and only translate between these types and their
//! transport.
//!
//! Public surface:
//! - Customer, CustomerId, NewCustomer, Role, RoleSelector: record model.
//! - normalize_role: total mapping from arbitrary labels to [`Role`].
//! - filter_customers: the projected view.
//! - CustomerDirectory: the reconciliation engine and action surface.

pub mod customer;
pub mod directory;
pub mod error;
pub mod ports;
pub mod projection;

pub use self::customer::{
    Customer, CustomerId, CustomerValidationError, NewCustomer, Role, RoleSelector,
    normalize_role,
};
pub use self::directory::{
    CustomerDirectory, DirectoryConfig, DirectoryPhase, DirectoryPorts, DirectorySnapshot,
    LoadOutcome,
};
pub use self::error::{DirectoryAction, DirectoryError};
pub use self::projection::filter_customers;
