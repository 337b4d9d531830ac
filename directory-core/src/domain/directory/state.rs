//! Observable reconciliation state.

use crate::domain::customer::{Customer, CustomerId, RoleSelector};
use crate::domain::projection::filter_customers;

/// Lifecycle phase of the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectoryPhase {
    /// No load has started.
    #[default]
    Uninitialized,
    /// The startup load is running.
    Loading,
    /// At least one load has finished, successfully or not.
    Ready,
}

/// Point-in-time view of the directory, published to subscribers.
///
/// ## Invariants
/// - `records` is unique by id.
/// - `projected` always equals the projection of `records` through
///   `selected_role` and `search_term`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    /// Authoritative in-memory record set.
    pub records: Vec<Customer>,
    /// Displayed subset of `records`.
    pub projected: Vec<Customer>,
    pub search_term: String,
    pub selected_role: RoleSelector,
    pub phase: DirectoryPhase,
    pub is_loading: bool,
    pub is_refreshing: bool,
    /// Advisory message for the last failed store-backed action.
    pub last_error: Option<String>,
}

impl DirectorySnapshot {
    /// Find a record by id.
    pub fn record(&self, id: &CustomerId) -> Option<&Customer> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub(super) fn recompute_projection(&mut self) {
        self.projected = filter_customers(&self.records, self.selected_role, &self.search_term);
    }

    pub(super) fn replace_records(&mut self, records: Vec<Customer>) {
        self.records.clear();
        for record in records {
            self.upsert(record);
        }
    }

    /// Replace in place when the id exists, append otherwise.
    pub(super) fn upsert(&mut self, record: Customer) {
        match self.position(record.id()) {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
    }

    /// Replace in place; absent ids are ignored.
    pub(super) fn replace(&mut self, record: Customer) {
        if let Some(index) = self.position(record.id()) {
            self.records[index] = record;
        }
    }

    pub(super) fn remove(&mut self, id: &CustomerId) {
        self.records.retain(|record| record.id() != id);
    }

    fn position(&self, id: &CustomerId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::Role;

    fn customer(id: &str, name: &str, role: Role) -> Customer {
        Customer::new(
            CustomerId::new(id).expect("id"),
            name,
            format!("{id}@example.com"),
            role,
        )
    }

    #[fixture]
    fn snapshot() -> DirectorySnapshot {
        let mut snapshot = DirectorySnapshot::default();
        snapshot.replace_records(vec![
            customer("1", "John Doe", Role::Admin),
            customer("2", "Jane Smith", Role::Manager),
        ]);
        snapshot
    }

    #[rstest]
    fn replace_records_keeps_last_write_per_id() {
        let mut snapshot = DirectorySnapshot::default();
        snapshot.replace_records(vec![
            customer("1", "First", Role::Admin),
            customer("2", "Second", Role::Manager),
            customer("1", "Renamed", Role::Manager),
        ]);
        let names: Vec<_> = snapshot.records.iter().map(Customer::name).collect();
        assert_eq!(names, vec!["Renamed", "Second"]);
    }

    #[rstest]
    fn upsert_appends_unknown_ids(mut snapshot: DirectorySnapshot) {
        snapshot.upsert(customer("3", "Ada", Role::Admin));
        assert_eq!(snapshot.records.len(), 3);
        assert_eq!(snapshot.records[2].name(), "Ada");
    }

    #[rstest]
    fn replace_ignores_unknown_ids(mut snapshot: DirectorySnapshot) {
        let before = snapshot.records.clone();
        snapshot.replace(customer("9", "Ghost", Role::Admin));
        assert_eq!(snapshot.records, before);
    }

    #[rstest]
    fn remove_drops_matching_record(mut snapshot: DirectorySnapshot) {
        snapshot.remove(&CustomerId::new("1").expect("id"));
        assert!(snapshot.record(&CustomerId::new("1").expect("id")).is_none());
        assert_eq!(snapshot.records.len(), 1);
    }

    #[rstest]
    fn projection_follows_filter_state(mut snapshot: DirectorySnapshot) {
        snapshot.selected_role = RoleSelector::Manager;
        snapshot.recompute_projection();
        assert_eq!(snapshot.projected.len(), 1);
        assert_eq!(snapshot.projected[0].name(), "Jane Smith");
    }
}
