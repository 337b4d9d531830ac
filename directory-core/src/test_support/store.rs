//! In-memory customer store with failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::ports::{CustomerStore, CustomerStoreError};
use crate::domain::{Customer, CustomerId};

/// Store calls that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Count,
    GetAll,
    InsertOne,
    UpdateOne,
    DeleteOne,
    DeleteAll,
    DropRoleConstraint,
    SelfTest,
}

#[derive(Default)]
struct StubState {
    rows: Vec<Customer>,
    failures: HashMap<StoreOperation, CustomerStoreError>,
    /// Inserts still accepted before the role check starts rejecting.
    /// `None` once the constraint is gone.
    role_check_allowance: Option<usize>,
    table_present: bool,
}

/// Blocks `get_all` until released, so tests can interleave a mutation with
/// an in-flight reload.
struct ReadGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

/// In-memory [`CustomerStore`] for engine tests.
///
/// Rows keep insertion order rather than name order so tests can tell
/// reloaded sets apart from patched ones. Injected failures stay active
/// until cleared.
pub struct StubCustomerStore {
    state: Mutex<StubState>,
    gate: Mutex<Option<ReadGate>>,
    insert_calls: AtomicUsize,
    drop_calls: AtomicUsize,
}

impl Default for StubCustomerStore {
    fn default() -> Self {
        Self {
            state: Mutex::new(StubState {
                table_present: true,
                ..StubState::default()
            }),
            gate: Mutex::new(None),
            insert_calls: AtomicUsize::new(0),
            drop_calls: AtomicUsize::new(0),
        }
    }
}

impl StubCustomerStore {
    pub fn with_rows(rows: Vec<Customer>) -> Self {
        let store = Self::default();
        store.lock_state().rows = rows;
        store
    }

    /// Write a row directly, bypassing the port.
    pub fn push_row(&self, record: Customer) {
        self.lock_state().rows.push(record);
    }

    /// Make `operation` fail with `error` until [`Self::clear_failure`].
    pub fn fail_on(&self, operation: StoreOperation, error: CustomerStoreError) {
        self.lock_state().failures.insert(operation, error);
    }

    pub fn clear_failure(&self, operation: StoreOperation) {
        self.lock_state().failures.remove(&operation);
    }

    /// Reject inserts with a role-constraint error until the constraint is
    /// dropped.
    pub fn reject_roles_until_relaxed(&self) {
        self.reject_roles_after(0);
    }

    /// Accept `allowed` more inserts, then reject with a role-constraint
    /// error until the constraint is dropped.
    pub fn reject_roles_after(&self, allowed: usize) {
        self.lock_state().role_check_allowance = Some(allowed);
    }

    /// Make the table probe report a missing table.
    pub fn hide_table(&self) {
        self.lock_state().table_present = false;
    }

    /// Hold the next `get_all` until `release` is notified. `entered` is
    /// notified once the read is parked.
    pub fn gate_next_read(&self, entered: Arc<Notify>, release: Arc<Notify>) {
        *self.lock_gate() = Some(ReadGate { entered, release });
    }

    pub fn rows(&self) -> Vec<Customer> {
        self.lock_state().rows.clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn drop_constraint_calls(&self) -> usize {
        self.drop_calls.load(Ordering::SeqCst)
    }

    fn check(&self, operation: StoreOperation) -> Result<(), CustomerStoreError> {
        match self.lock_state().failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StubState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("stub store mutex"),
        }
    }

    fn lock_gate(&self) -> MutexGuard<'_, Option<ReadGate>> {
        match self.gate.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("stub store gate mutex"),
        }
    }
}

#[async_trait]
impl CustomerStore for StubCustomerStore {
    async fn initialize(&self) -> Result<(), CustomerStoreError> {
        Ok(())
    }

    async fn close(&self) {}

    async fn probe(&self) -> bool {
        self.lock_state().table_present
    }

    async fn self_test(&self) -> Result<(), CustomerStoreError> {
        self.check(StoreOperation::SelfTest)
    }

    async fn count(&self) -> Result<usize, CustomerStoreError> {
        self.check(StoreOperation::Count)?;
        Ok(self.lock_state().rows.len())
    }

    async fn get_all(&self) -> Result<Vec<Customer>, CustomerStoreError> {
        let gate = self.lock_gate().take();
        // Snapshot before parking so the read reflects the moment it started.
        let rows = self.rows();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.check(StoreOperation::GetAll)?;
        Ok(rows)
    }

    async fn insert_one(&self, record: &Customer) -> Result<(), CustomerStoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check(StoreOperation::InsertOne)?;
        let mut state = self.lock_state();
        match state.role_check_allowance {
            Some(0) => {
                return Err(CustomerStoreError::role_constraint(
                    "CHECK constraint failed: customers_role_check",
                ));
            }
            Some(remaining) => state.role_check_allowance = Some(remaining - 1),
            None => {}
        }
        match state.rows.iter().position(|row| row.id() == record.id()) {
            Some(index) => state.rows[index] = record.clone(),
            None => state.rows.push(record.clone()),
        }
        Ok(())
    }

    async fn update_one(&self, record: &Customer) -> Result<(), CustomerStoreError> {
        self.check(StoreOperation::UpdateOne)?;
        let mut state = self.lock_state();
        if let Some(row) = state.rows.iter_mut().find(|row| row.id() == record.id()) {
            *row = record.clone();
        }
        Ok(())
    }

    async fn delete_one(&self, id: &CustomerId) -> Result<(), CustomerStoreError> {
        self.check(StoreOperation::DeleteOne)?;
        self.lock_state().rows.retain(|row| row.id() != id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), CustomerStoreError> {
        self.check(StoreOperation::DeleteAll)?;
        self.lock_state().rows.clear();
        Ok(())
    }

    async fn drop_role_constraint(&self) -> Result<(), CustomerStoreError> {
        self.drop_calls.fetch_add(1, Ordering::SeqCst);
        self.check(StoreOperation::DropRoleConstraint)?;
        let mut state = self.lock_state();
        state.rows.clear();
        state.role_check_allowance = None;
        Ok(())
    }
}
