//! Filter projection: the displayed subset of the authoritative record set.
//!
//! Pure and synchronous. The engine recomputes it whenever records, the role
//! selector, or the search term change.

use super::customer::{Customer, RoleSelector};

/// Project `records` through a role selector and search term.
///
/// Records are first kept when their role matches `selected_role` (skipped for
/// [`RoleSelector::All`]), then when their name contains the trimmed
/// `search_term` case-insensitively (skipped when the trimmed term is empty).
/// Input order is preserved.
///
/// # Examples
///
/// ```
/// use directory_core::domain::{Customer, CustomerId, Role, RoleSelector, filter_customers};
///
/// let records = vec![
///     Customer::new(CustomerId::new("1").unwrap(), "John Doe", "john@example.com", Role::Admin),
///     Customer::new(CustomerId::new("2").unwrap(), "Jane Smith", "jane@example.com", Role::Manager),
/// ];
///
/// let projected = filter_customers(&records, RoleSelector::All, " JANE ");
/// assert_eq!(projected.len(), 1);
/// assert_eq!(projected[0].name(), "Jane Smith");
/// ```
pub fn filter_customers(
    records: &[Customer],
    selected_role: RoleSelector,
    search_term: &str,
) -> Vec<Customer> {
    let needle = search_term.trim().to_lowercase();
    records
        .iter()
        .filter(|customer| selected_role.matches(customer.role()))
        .filter(|customer| needle.is_empty() || customer.name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
