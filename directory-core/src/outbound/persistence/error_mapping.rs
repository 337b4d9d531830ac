//! Diesel error mapping for the customer store.

use diesel::result::{ConnectionError, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::CustomerStoreError;

use super::schema::ROLE_CONSTRAINT_NAME;

/// Map a failure to open the SQLite file into the fatal init error.
pub(crate) fn map_connection_error(error: ConnectionError) -> CustomerStoreError {
    debug!(error = %error, "sqlite connection failed");
    CustomerStoreError::init(error.to_string())
}

/// Map Diesel errors raised while preparing the schema into the init error.
pub(crate) fn map_init_error(error: DieselError) -> CustomerStoreError {
    debug!(error = %error, "sqlite schema preparation failed");
    CustomerStoreError::init(error.to_string())
}

/// Map Diesel query errors into store errors, classifying role-check
/// rejections separately so callers can relax the schema and retry.
pub(crate) fn map_diesel_error(error: DieselError, operation: &str) -> CustomerStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            %operation,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            CustomerStoreError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) if is_role_check_message(info.message()) => {
            CustomerStoreError::role_constraint(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => {
            CustomerStoreError::query(info.message().to_owned())
        }
        other => CustomerStoreError::query(other.to_string()),
    }
}

/// SQLite reports check failures as `CHECK constraint failed: <name or expr>`.
fn is_role_check_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("check constraint")
        && (lower.contains(ROLE_CONSTRAINT_NAME) || lower.contains("role"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    #[case("CHECK constraint failed: customers_role_check")]
    #[case("CHECK constraint failed: role IN ('Admin', 'Manager')")]
    fn role_check_failures_are_classified(#[case] message: &str) {
        let error = map_diesel_error(database_error(DatabaseErrorKind::Unknown, message), "insert");
        assert!(error.is_role_constraint_violation());
    }

    #[test]
    fn other_check_failures_stay_query_errors() {
        let error = map_diesel_error(
            database_error(DatabaseErrorKind::Unknown, "CHECK constraint failed: email_check"),
            "insert",
        );
        assert!(matches!(error, CustomerStoreError::Query { .. }));
    }

    #[test]
    fn closed_connections_map_to_connection_errors() {
        let error = map_diesel_error(
            database_error(DatabaseErrorKind::ClosedConnection, "connection closed"),
            "count",
        );
        assert_eq!(error, CustomerStoreError::connection("connection closed"));
    }

    #[test]
    fn not_found_maps_to_query_error() {
        let error = map_diesel_error(DieselError::NotFound, "get");
        assert!(matches!(error, CustomerStoreError::Query { .. }));
    }
}
