//! Diesel table definitions and the DDL that creates them.
//!
//! There is no migration engine: the table has one fixed shape, created on
//! initialization and recreated without the role check when relaxed. The
//! `table!` definition must match both DDL variants.

diesel::table! {
    /// Customer directory rows.
    customers (id) {
        /// Opaque identifier, unique per customer.
        id -> Text,
        name -> Text,
        email -> Text,
        /// Canonical role label; free text once the constraint is relaxed.
        role -> Text,
    }
}

/// Name of the check constraint guarding `customers.role`.
pub(crate) const ROLE_CONSTRAINT_NAME: &str = "customers_role_check";

/// Create the table with the role check if it does not exist.
pub(crate) const CREATE_CUSTOMERS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS customers (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    role TEXT NOT NULL CONSTRAINT customers_role_check CHECK (role IN ('Admin', 'Manager'))
);";

/// Recreate the table without the role check. Discards every row.
pub(crate) const RECREATE_WITHOUT_ROLE_CONSTRAINT: &str = "\
DROP TABLE IF EXISTS customers;
CREATE TABLE customers (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    role TEXT NOT NULL
);";

/// Counts `customers` entries in the SQLite catalogue.
pub(crate) const PROBE_CUSTOMERS_TABLE: &str = "\
SELECT COUNT(*) AS present FROM sqlite_master WHERE type = 'table' AND name = 'customers'";
