//! Internal Diesel row structs for the customers table.
//!
//! These types never leave the persistence layer. Roles are plain strings
//! here; conversion to the domain normalises them.

use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::domain::ports::CustomerStoreError;
use crate::domain::{Customer, CustomerId, normalize_role};

use super::schema::customers;

/// Row struct for reading from the customers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct CustomerRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = CustomerStoreError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let CustomerRow {
            id,
            name,
            email,
            role,
        } = row;
        let id = CustomerId::new(id)
            .map_err(|err| CustomerStoreError::query(format!("stored customer row: {err}")))?;
        Ok(Customer::new(id, name, email, normalize_role(&role)))
    }
}

/// Insertable struct for upserting customer rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customers)]
pub(crate) struct NewCustomerRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
}

impl<'a> From<&'a Customer> for NewCustomerRow<'a> {
    fn from(customer: &'a Customer) -> Self {
        Self {
            id: customer.id().as_str(),
            name: customer.name(),
            email: customer.email(),
            role: customer.role().as_str(),
        }
    }
}

/// Changeset struct for updating an existing row by id.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = customers)]
pub(crate) struct CustomerChangeset<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
}

impl<'a> From<&'a Customer> for CustomerChangeset<'a> {
    fn from(customer: &'a Customer) -> Self {
        Self {
            name: customer.name(),
            email: customer.email(),
            role: customer.role().as_str(),
        }
    }
}

/// Result of the catalogue probe query.
#[derive(Debug, QueryableByName)]
pub(crate) struct TablePresence {
    #[diesel(sql_type = BigInt)]
    pub present: i64,
}
