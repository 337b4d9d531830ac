//! SQLite-backed customer store adapter.
//!
//! Thin translation between Diesel rows and domain customers. Roles are
//! written canonically and normalised again on read, so rows written with
//! free-form labels after the role check was relaxed still read back as
//! [`Role`](crate::domain::Role) values.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{CustomerStore, CustomerStoreError};
use crate::domain::{Customer, CustomerId, Role};

use super::connection::{ConnectionHandle, StoreConfig};
use super::error_mapping::{map_diesel_error, map_init_error};
use super::models::{CustomerChangeset, CustomerRow, NewCustomerRow, TablePresence};
use super::schema::{
    CREATE_CUSTOMERS_TABLE, PROBE_CUSTOMERS_TABLE, RECREATE_WITHOUT_ROLE_CONSTRAINT, customers,
};

diesel::define_sql_function! {
    /// SQLite `lower()`.
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

const SELF_TEST_ID_PREFIX: &str = "__self_test__";

/// Diesel-backed implementation of [`CustomerStore`].
pub struct DieselCustomerStore {
    handle: ConnectionHandle,
}

impl DieselCustomerStore {
    /// Create a store for `config`. Nothing is opened until
    /// [`CustomerStore::initialize`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use directory_core::domain::ports::CustomerStore;
    /// use directory_core::outbound::persistence::{DieselCustomerStore, StoreConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = DieselCustomerStore::new(StoreConfig::new("customers.db"));
    /// store.initialize().await?;
    /// assert_eq!(store.count().await?, 0);
    /// store.close().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: StoreConfig) -> Self {
        Self {
            handle: ConnectionHandle::new(config),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        self.handle.config()
    }
}

#[async_trait]
impl CustomerStore for DieselCustomerStore {
    async fn initialize(&self) -> Result<(), CustomerStoreError> {
        let mut conn = self.handle.open().await?;
        conn.batch_execute(CREATE_CUSTOMERS_TABLE)
            .await
            .map_err(map_init_error)?;
        info!(database = %self.config().database_url(), "customer store initialized");
        Ok(())
    }

    async fn close(&self) {
        self.handle.close().await;
    }

    async fn probe(&self) -> bool {
        let Ok(mut conn) = self.handle.checkout().await else {
            return false;
        };
        match diesel::sql_query(PROBE_CUSTOMERS_TABLE)
            .get_result::<TablePresence>(&mut *conn)
            .await
        {
            Ok(presence) => presence.present > 0,
            Err(error) => {
                debug!(error = %error, "customer table probe failed");
                false
            }
        }
    }

    async fn self_test(&self) -> Result<(), CustomerStoreError> {
        let id = CustomerId::new(format!("{SELF_TEST_ID_PREFIX}{}", Uuid::new_v4()))
            .map_err(|err| CustomerStoreError::query(err.to_string()))?;
        let probe = Customer::new(id, "Self Test", "self-test@localhost", Role::Manager);
        let mut conn = self.handle.checkout().await?;
        // Always rolled back, so the probe row never outlives the check.
        let outcome = conn
            .transaction::<(), diesel::result::Error, _>(|conn| {
                async move {
                    diesel::replace_into(customers::table)
                        .values(NewCustomerRow::from(&probe))
                        .execute(&mut *conn)
                        .await?;
                    diesel::delete(customers::table.find(probe.id().as_str()))
                        .execute(&mut *conn)
                        .await?;
                    Err(diesel::result::Error::RollbackTransaction)
                }
                .scope_boxed()
            })
            .await;
        match outcome {
            Ok(()) | Err(diesel::result::Error::RollbackTransaction) => Ok(()),
            Err(err) => Err(map_diesel_error(err, "self_test")),
        }
    }

    async fn count(&self) -> Result<usize, CustomerStoreError> {
        let mut conn = self.handle.checkout().await?;
        let total: i64 = customers::table
            .count()
            .get_result(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "count"))?;
        usize::try_from(total).map_err(|_| CustomerStoreError::query("negative row count"))
    }

    async fn get_all(&self) -> Result<Vec<Customer>, CustomerStoreError> {
        let mut conn = self.handle.checkout().await?;
        let rows: Vec<CustomerRow> = customers::table
            .select(CustomerRow::as_select())
            .order_by((lower(customers::name).asc(), customers::id.asc()))
            .load(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "get_all"))?;
        rows.into_iter().map(Customer::try_from).collect()
    }

    async fn insert_one(&self, record: &Customer) -> Result<(), CustomerStoreError> {
        let mut conn = self.handle.checkout().await?;
        diesel::replace_into(customers::table)
            .values(NewCustomerRow::from(record))
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert_one"))?;
        Ok(())
    }

    async fn update_one(&self, record: &Customer) -> Result<(), CustomerStoreError> {
        let mut conn = self.handle.checkout().await?;
        let updated = diesel::update(customers::table.find(record.id().as_str()))
            .set(CustomerChangeset::from(record))
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "update_one"))?;
        if updated == 0 {
            debug!(id = %record.id(), "update skipped: no stored customer with id");
        }
        Ok(())
    }

    async fn delete_one(&self, id: &CustomerId) -> Result<(), CustomerStoreError> {
        let mut conn = self.handle.checkout().await?;
        diesel::delete(customers::table.find(id.as_str()))
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete_one"))?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), CustomerStoreError> {
        let mut conn = self.handle.checkout().await?;
        diesel::delete(customers::table)
            .execute(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete_all"))?;
        Ok(())
    }

    async fn drop_role_constraint(&self) -> Result<(), CustomerStoreError> {
        let mut conn = self.handle.checkout().await?;
        conn.transaction(|conn| {
            async move { conn.batch_execute(RECREATE_WITHOUT_ROLE_CONSTRAINT).await }.scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, "drop_role_constraint"))?;
        info!("customer role constraint dropped; table recreated empty");
        Ok(())
    }
}
