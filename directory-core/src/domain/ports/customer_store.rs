//! Driven port for the on-device customer table.
//!
//! The store is the only component allowed to read or write the persistent
//! table. It has an explicit lifecycle: uninitialized → initialized (one open
//! handle) → closed. Calls made outside the initialized state fail with
//! [`CustomerStoreError::NotInitialized`].

use async_trait::async_trait;

use crate::domain::{Customer, CustomerId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by customer store adapters.
    pub enum CustomerStoreError {
        /// The store was used before `initialize` or after `close`.
        NotInitialized => "customer store is not initialized",
        /// The storage medium could not be opened or prepared. Fatal.
        Init { message: String } => "customer store could not be opened: {message}",
        /// The open handle failed underneath a call.
        Connection { message: String } => "customer store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "customer store query failed: {message}",
        /// A row was rejected by the role constraint on the table.
        RoleConstraint { message: String } =>
            "customer store rejected role value: {message}",
    }
}

impl CustomerStoreError {
    /// Whether relaxing the role constraint and retrying could succeed.
    pub fn is_role_constraint_violation(&self) -> bool {
        matches!(self, Self::RoleConstraint { .. })
    }
}

/// Port for the local customer table.
///
/// Every write path normalises the record's role before it reaches storage,
/// and every read path normalises stored role strings before returning them,
/// so rows written by older builds with free-form roles read back canonical.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Open the medium and create the table if missing. Idempotent.
    async fn initialize(&self) -> Result<(), CustomerStoreError>;

    /// Release the open handle. Safe to call repeatedly.
    async fn close(&self);

    /// Report whether the customer table exists. Never fails.
    async fn probe(&self) -> bool;

    /// Insert and delete a throwaway row to exercise the write path. The row
    /// must not remain, even when the delete fails.
    async fn self_test(&self) -> Result<(), CustomerStoreError>;

    /// Number of stored rows.
    async fn count(&self) -> Result<usize, CustomerStoreError>;

    /// All rows ordered by name, case-insensitively.
    async fn get_all(&self) -> Result<Vec<Customer>, CustomerStoreError>;

    /// Insert or replace one record by id.
    async fn insert_one(&self, record: &Customer) -> Result<(), CustomerStoreError>;

    /// Apply [`CustomerStore::insert_one`] to each record in order.
    ///
    /// Not atomic: when record `k` fails, records `0..k` stay committed.
    async fn insert_many(&self, records: &[Customer]) -> Result<(), CustomerStoreError> {
        for record in records {
            self.insert_one(record).await?;
        }
        Ok(())
    }

    /// Update the row with the record's id. A missing row is not an error.
    async fn update_one(&self, record: &Customer) -> Result<(), CustomerStoreError>;

    /// Delete one row by id.
    async fn delete_one(&self, id: &CustomerId) -> Result<(), CustomerStoreError>;

    /// Delete every row.
    async fn delete_all(&self) -> Result<(), CustomerStoreError>;

    /// Recreate the table without the role constraint.
    ///
    /// Destructive: all existing rows are discarded. Callers must capture any
    /// rows they intend to keep before calling this.
    async fn drop_role_constraint(&self) -> Result<(), CustomerStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::test_support::StubCustomerStore;

    fn customer(id: &str, name: &str) -> Customer {
        Customer::new(
            CustomerId::new(id).expect("id"),
            name,
            format!("{id}@example.com"),
            Role::Manager,
        )
    }

    #[tokio::test]
    async fn insert_many_keeps_records_committed_before_a_failure() {
        let store = StubCustomerStore::default();
        store.reject_roles_after(1);
        let batch = [
            customer("1", "John Doe"),
            customer("2", "Jane Smith"),
            customer("3", "Sam Jones"),
        ];

        let error = store.insert_many(&batch).await.expect_err("second insert fails");

        assert!(error.is_role_constraint_violation());
        assert_eq!(store.rows(), vec![batch[0].clone()]);
        assert_eq!(store.insert_calls(), 2, "insertion stops at the failing record");
    }
}
