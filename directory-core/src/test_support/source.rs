//! Scripted remote customer source.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{CustomerPage, CustomerSource, RemoteCustomerFilter, RemoteSourceError};
use crate::domain::{Customer, CustomerId, NewCustomer};

#[derive(Default)]
struct Script {
    fetches: VecDeque<Result<CustomerPage, RemoteSourceError>>,
    creates: VecDeque<Result<Customer, RemoteSourceError>>,
    mutation_failure: Option<RemoteSourceError>,
    calls: Vec<SourceCall>,
}

/// Remote call observed by [`ScriptedCustomerSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    FetchAll(RemoteCustomerFilter),
    Create(NewCustomer),
    Update(Customer),
    Delete(CustomerId),
}

/// [`CustomerSource`] that replays queued responses and records calls.
///
/// Unscripted fetches and creates fail with `Unavailable`. Updates and
/// deletes echo their input unless [`Self::fail_mutations`] was called.
#[derive(Default)]
pub struct ScriptedCustomerSource(Mutex<Script>);

impl ScriptedCustomerSource {
    pub fn push_fetch(&self, result: Result<CustomerPage, RemoteSourceError>) {
        self.lock_script().fetches.push_back(result);
    }

    /// Queue a successful single-page fetch.
    pub fn push_page(&self, items: Vec<Customer>) {
        self.push_fetch(Ok(CustomerPage {
            items,
            next_cursor: None,
        }));
    }

    pub fn push_create(&self, result: Result<Customer, RemoteSourceError>) {
        self.lock_script().creates.push_back(result);
    }

    pub fn fail_mutations(&self, error: RemoteSourceError) {
        self.lock_script().mutation_failure = Some(error);
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.lock_script().calls.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.count_calls(|call| matches!(call, SourceCall::FetchAll(_)))
    }

    /// Number of create, update and delete calls.
    pub fn mutation_count(&self) -> usize {
        self.count_calls(|call| !matches!(call, SourceCall::FetchAll(_)))
    }

    fn count_calls(&self, predicate: impl Fn(&SourceCall) -> bool) -> usize {
        self.lock_script()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn lock_script(&self) -> MutexGuard<'_, Script> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("scripted source mutex"),
        }
    }
}

#[async_trait]
impl CustomerSource for ScriptedCustomerSource {
    async fn fetch_all(
        &self,
        filter: RemoteCustomerFilter,
    ) -> Result<CustomerPage, RemoteSourceError> {
        let mut script = self.lock_script();
        script.calls.push(SourceCall::FetchAll(filter));
        script
            .fetches
            .pop_front()
            .unwrap_or_else(|| Err(RemoteSourceError::unavailable()))
    }

    async fn create(&self, input: &NewCustomer) -> Result<Customer, RemoteSourceError> {
        let mut script = self.lock_script();
        script.calls.push(SourceCall::Create(input.clone()));
        script
            .creates
            .pop_front()
            .unwrap_or_else(|| Err(RemoteSourceError::unavailable()))
    }

    async fn update(&self, record: &Customer) -> Result<Customer, RemoteSourceError> {
        let mut script = self.lock_script();
        script.calls.push(SourceCall::Update(record.clone()));
        match &script.mutation_failure {
            Some(error) => Err(error.clone()),
            None => Ok(record.clone()),
        }
    }

    async fn delete(&self, id: &CustomerId) -> Result<CustomerId, RemoteSourceError> {
        let mut script = self.lock_script();
        script.calls.push(SourceCall::Delete(id.clone()));
        match &script.mutation_failure {
            Some(error) => Err(error.clone()),
            None => Ok(id.clone()),
        }
    }
}
