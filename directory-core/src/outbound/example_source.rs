//! In-memory customer source backed by deterministic example data.
//!
//! Stands in for the remote API in demos and offline runs: a seeded batch of
//! generated customers, with raw role labels normalised on the way in, and
//! create/update/delete applied to the in-memory list.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use example_customers::{ExampleCustomerSeed, GenerationError, generate_example_customers};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{CustomerPage, CustomerSource, RemoteCustomerFilter, RemoteSourceError};
use crate::domain::{Customer, CustomerId, NewCustomer, normalize_role};

/// [`CustomerSource`] serving generated customers from memory.
#[derive(Debug, Default)]
pub struct ExampleCustomerSource {
    customers: Mutex<Vec<Customer>>,
}

impl ExampleCustomerSource {
    /// Generate `count` customers from `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use directory_core::outbound::ExampleCustomerSource;
    ///
    /// let source = ExampleCustomerSource::generate(7, 5).expect("generation succeeds");
    /// assert_eq!(source.len(), 5);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when `count` exceeds the generator limit or
    /// unique names cannot be produced.
    pub fn generate(seed: u64, count: usize) -> Result<Self, GenerationError> {
        let customers = generate_example_customers(seed, count)?
            .into_iter()
            .map(customer_from_seed)
            .collect();
        Ok(Self::from_customers(customers))
    }

    pub fn from_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: Mutex::new(customers),
        }
    }

    pub fn len(&self) -> usize {
        self.lock_customers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_customers().is_empty()
    }

    fn lock_customers(&self) -> MutexGuard<'_, Vec<Customer>> {
        self.customers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn customer_from_seed(seed: ExampleCustomerSeed) -> Customer {
    let ExampleCustomerSeed {
        id,
        name,
        email,
        role_label,
    } = seed;
    Customer::new(CustomerId::from(id), name, email, normalize_role(&role_label))
}

#[async_trait]
impl CustomerSource for ExampleCustomerSource {
    async fn fetch_all(
        &self,
        filter: RemoteCustomerFilter,
    ) -> Result<CustomerPage, RemoteSourceError> {
        let items: Vec<Customer> = self
            .lock_customers()
            .iter()
            .filter(|customer| filter.role.is_none_or(|role| customer.role() == role))
            .cloned()
            .collect();
        debug!(count = items.len(), "example source served customers");
        Ok(CustomerPage {
            items,
            next_cursor: None,
        })
    }

    async fn create(&self, input: &NewCustomer) -> Result<Customer, RemoteSourceError> {
        let record = input.clone().into_customer(CustomerId::from(Uuid::new_v4()));
        self.lock_customers().push(record.clone());
        Ok(record)
    }

    async fn update(&self, record: &Customer) -> Result<Customer, RemoteSourceError> {
        let mut customers = self.lock_customers();
        let existing = customers
            .iter_mut()
            .find(|customer| customer.id() == record.id())
            .ok_or_else(|| {
                RemoteSourceError::rejected(format!("unknown customer id {}", record.id()))
            })?;
        *existing = record.clone();
        Ok(record.clone())
    }

    async fn delete(&self, id: &CustomerId) -> Result<CustomerId, RemoteSourceError> {
        let mut customers = self.lock_customers();
        let before = customers.len();
        customers.retain(|customer| customer.id() != id);
        if customers.len() == before {
            return Err(RemoteSourceError::rejected(format!(
                "unknown customer id {id}"
            )));
        }
        Ok(id.clone())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::Role;

    #[fixture]
    fn source() -> ExampleCustomerSource {
        ExampleCustomerSource::generate(42, 24).expect("generation succeeds")
    }

    #[rstest]
    #[tokio::test]
    async fn unfiltered_fetch_serves_every_customer(source: ExampleCustomerSource) {
        let page = source
            .fetch_all(RemoteCustomerFilter::default())
            .await
            .expect("fetch");
        assert_eq!(page.items.len(), 24);
        assert_eq!(page.next_cursor, None);
    }

    #[rstest]
    #[tokio::test]
    async fn role_filter_narrows_fetch(source: ExampleCustomerSource) {
        let page = source
            .fetch_all(RemoteCustomerFilter {
                role: Some(Role::Admin),
            })
            .await
            .expect("fetch");
        assert!(page.items.iter().all(|customer| customer.role() == Role::Admin));
    }

    #[test]
    fn same_seed_generates_same_customers() {
        let first = ExampleCustomerSource::generate(9, 4).expect("first");
        let second = ExampleCustomerSource::generate(9, 4).expect("second");
        assert_eq!(*first.lock_customers(), *second.lock_customers());
    }

    #[test]
    fn oversized_requests_fail() {
        assert!(ExampleCustomerSource::generate(1, usize::MAX).is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn mutations_apply_in_memory(source: ExampleCustomerSource) {
        let input = NewCustomer::new("Ada Lovelace", "ada@example.com", Role::Admin)
            .expect("valid input");
        let created = source.create(&input).await.expect("create");
        assert_eq!(source.len(), 25);

        let renamed = Customer::new(
            created.id().clone(),
            "Ada King",
            created.email(),
            created.role(),
        );
        let updated = source.update(&renamed).await.expect("update");
        assert_eq!(updated.name(), "Ada King");

        source.delete(created.id()).await.expect("delete");
        assert_eq!(source.len(), 24);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_ids_are_rejected(source: ExampleCustomerSource) {
        let id = CustomerId::new("missing").expect("id");
        let error = source.delete(&id).await.expect_err("unknown id");
        assert!(matches!(error, RemoteSourceError::Rejected { .. }));
    }
}
