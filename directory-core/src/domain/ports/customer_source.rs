//! Driven port for the remote customer API.
//!
//! Every call may fail. The engine treats fetch failures as "no seed
//! available" and mutation failures as "remote mirror failed"; neither is
//! ever fatal or rolled back locally.

use async_trait::async_trait;

use crate::domain::{Customer, CustomerId, NewCustomer, Role};

use super::define_port_error;

/// Optional predicate for [`CustomerSource::fetch_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteCustomerFilter {
    /// Equality predicate on role. `None` fetches every role.
    pub role: Option<Role>,
}

/// One page of remote customers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPage {
    /// Customers on this page, roles already normalised.
    pub items: Vec<Customer>,
    /// Opaque cursor for the next page. Never followed by the engine.
    pub next_cursor: Option<String>,
}

define_port_error! {
    /// Errors surfaced by remote customer sources, for fetches and mutations.
    pub enum RemoteSourceError {
        /// Network transport failed before a response arrived.
        Transport { message: String } => "remote customer transport failed: {message}",
        /// The call exceeded the transport timeout.
        Timeout { message: String } => "remote customer call timed out: {message}",
        /// The API answered with errors.
        Rejected { message: String } => "remote customer API rejected request: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "remote customer response decode failed: {message}",
        /// The adapter refused to build the request.
        InvalidRequest { message: String } => "remote customer request invalid: {message}",
        /// No remote source is configured.
        Unavailable => "remote customer source unavailable",
    }
}

/// Port for the remote customer API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerSource: Send + Sync {
    /// Fetch a single page of customers.
    async fn fetch_all(
        &self,
        filter: RemoteCustomerFilter,
    ) -> Result<CustomerPage, RemoteSourceError>;

    /// Create a customer and return the authoritative record.
    async fn create(&self, input: &NewCustomer) -> Result<Customer, RemoteSourceError>;

    /// Update a customer and return the authoritative record.
    async fn update(&self, record: &Customer) -> Result<Customer, RemoteSourceError>;

    /// Delete a customer and return its id.
    async fn delete(&self, id: &CustomerId) -> Result<CustomerId, RemoteSourceError>;
}

/// Source used when no remote is configured; every call is `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCustomerSource;

#[async_trait]
impl CustomerSource for OfflineCustomerSource {
    async fn fetch_all(
        &self,
        _filter: RemoteCustomerFilter,
    ) -> Result<CustomerPage, RemoteSourceError> {
        Err(RemoteSourceError::unavailable())
    }

    async fn create(&self, _input: &NewCustomer) -> Result<Customer, RemoteSourceError> {
        Err(RemoteSourceError::unavailable())
    }

    async fn update(&self, _record: &Customer) -> Result<Customer, RemoteSourceError> {
        Err(RemoteSourceError::unavailable())
    }

    async fn delete(&self, _id: &CustomerId) -> Result<CustomerId, RemoteSourceError> {
        Err(RemoteSourceError::unavailable())
    }
}
