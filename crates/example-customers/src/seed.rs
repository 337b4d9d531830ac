//! Generated customer seed types.
//!
//! These types carry raw, un-normalised values. They are converted into
//! directory domain types at the point of use.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw role labels sampled by the generator.
///
/// The mix deliberately includes casing and wording variants so callers
/// exercise their role normalisation.
pub const ROLE_LABELS: [&str; 8] = [
    "Admin",
    "admin",
    "Administrator",
    "SYSTEM_ADMIN",
    "Manager",
    "manager",
    "team_manager",
    "Sales Manager",
];

/// A generated example customer record.
///
/// # Example
///
/// ```
/// use example_customers::ExampleCustomerSeed;
/// use uuid::Uuid;
///
/// let customer = ExampleCustomerSeed {
///     id: Uuid::new_v4(),
///     name: "Ada Lovelace".to_owned(),
///     email: "ada.lovelace@example.com".to_owned(),
///     role_label: "Administrator".to_owned(),
/// };
///
/// assert_eq!(customer.name, "Ada Lovelace");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleCustomerSeed {
    /// Unique identifier for the customer.
    pub id: Uuid,
    /// Full name, first name followed by last name.
    pub name: String,
    /// Email address derived from the name.
    pub email: String,
    /// Raw role label as an upstream system might report it.
    pub role_label: String,
}
