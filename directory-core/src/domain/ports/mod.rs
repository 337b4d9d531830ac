//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod customer_source;
mod customer_store;
mod directory_diagnostics;

#[cfg(test)]
pub use customer_source::MockCustomerSource;
pub use customer_source::{
    CustomerPage, CustomerSource, OfflineCustomerSource, RemoteCustomerFilter, RemoteSourceError,
};
pub use customer_store::{CustomerStore, CustomerStoreError};
pub use directory_diagnostics::{
    DiagnosticLevel, DirectoryDiagnostics, DirectoryEvent, NoOpDirectoryDiagnostics,
    RecordOrigin,
};
