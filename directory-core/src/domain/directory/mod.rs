//! Reconciliation engine for the customer directory.
//!
//! The engine arbitrates between the local store (authoritative on disk), the
//! remote source (best effort, never fatal), and the in-memory record set that
//! subscribers observe. Store failures are surfaced through `last_error`;
//! remote failures only reach the diagnostics port.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;
use tokio::sync::watch;

use crate::domain::customer::{Customer, CustomerId, NewCustomer, RoleSelector};
use crate::domain::error::{DirectoryAction, DirectoryError};
use crate::domain::ports::{
    CustomerSource, CustomerStore, CustomerStoreError, DirectoryDiagnostics, DirectoryEvent,
    RecordOrigin, RemoteCustomerFilter,
};

mod journal;
mod state;

use journal::{ReconcileLog, RecordPatch, Watermark};
pub use state::{DirectoryPhase, DirectorySnapshot};

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Mirror add/update/delete to the remote source before writing locally.
    pub remote_mutations_enabled: bool,
}

/// Driven ports required by the engine.
#[derive(Clone)]
pub struct DirectoryPorts {
    pub store: Arc<dyn CustomerStore>,
    pub source: Arc<dyn CustomerSource>,
    pub diagnostics: Arc<dyn DirectoryDiagnostics>,
}

/// Result of [`CustomerDirectory::load_customers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The store was empty and was seeded from the remote source.
    Seeded { count: usize },
    /// Records were read back from the local store, possibly none.
    Local { count: usize },
    /// A store failure aborted the load; see `last_error`.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReloadKind {
    Load,
    Refresh,
}

/// Clears the in-flight flag and closes the journal window on every exit.
struct ReloadGuard<'a> {
    directory: &'a CustomerDirectory,
    kind: ReloadKind,
    watermark: Watermark,
}

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.directory.lock_log().end_reload();
        let kind = self.kind;
        self.directory.state.send_modify(|state| match kind {
            ReloadKind::Load => {
                state.is_loading = false;
                state.phase = DirectoryPhase::Ready;
            }
            ReloadKind::Refresh => state.is_refreshing = false,
        });
    }
}

/// Local-first customer directory.
///
/// ## Invariants
/// - Every state change, including the projection recompute it implies, is a
///   single critical section on the watch channel.
/// - A reload never discards a mutation that committed after the reload
///   started.
pub struct CustomerDirectory {
    store: Arc<dyn CustomerStore>,
    source: Arc<dyn CustomerSource>,
    diagnostics: Arc<dyn DirectoryDiagnostics>,
    clock: Arc<dyn Clock>,
    config: DirectoryConfig,
    state: watch::Sender<DirectorySnapshot>,
    log: Mutex<ReconcileLog>,
}

impl CustomerDirectory {
    /// Build an engine over already-initialized ports.
    /// ```rust,ignore
    /// let directory = CustomerDirectory::new(ports, Arc::new(DefaultClock), config);
    /// directory.load_customers().await;
    /// ```
    pub fn new(ports: DirectoryPorts, clock: Arc<dyn Clock>, config: DirectoryConfig) -> Self {
        let (state, _) = watch::channel(DirectorySnapshot::default());
        Self {
            store: ports.store,
            source: ports.source,
            diagnostics: ports.diagnostics,
            clock,
            config,
            state,
            log: Mutex::new(ReconcileLog::default()),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> DirectorySnapshot {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<DirectorySnapshot> {
        self.state.subscribe()
    }

    pub fn config(&self) -> DirectoryConfig {
        self.config
    }

    /// Populate the record set at startup.
    ///
    /// Probes the store, seeds an empty store from the remote source once,
    /// and otherwise reads the local rows. Remote and seeding failures fall
    /// through silently. A store failure sets `last_error` and keeps the
    /// previous records.
    pub async fn load_customers(&self) -> LoadOutcome {
        let guard = self.begin_reload(ReloadKind::Load);
        match self.read_for_load().await {
            Ok((origin, records)) => {
                let count = self.publish(guard.watermark, records);
                self.diagnostics
                    .record(DirectoryEvent::Loaded { origin, count });
                match origin {
                    RecordOrigin::RemoteSeed => LoadOutcome::Seeded { count },
                    RecordOrigin::LocalStore => LoadOutcome::Local { count },
                }
            }
            Err(error) => {
                self.fail(DirectoryAction::Load, &error);
                LoadOutcome::Failed
            }
        }
    }

    /// Re-read every record from the local store. The remote is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Store`] when the read fails; prior records
    /// are left untouched.
    pub async fn refresh_customers(&self) -> Result<usize, DirectoryError> {
        let guard = self.begin_reload(ReloadKind::Refresh);
        match self.store.get_all().await {
            Ok(records) => {
                let count = self.publish(guard.watermark, records);
                self.diagnostics.record(DirectoryEvent::Refreshed { count });
                Ok(count)
            }
            Err(error) => Err(self.fail(DirectoryAction::Refresh, &error)),
        }
    }

    /// Create a customer with a fresh id.
    ///
    /// When remote mutations are enabled the remote create runs first and its
    /// record wins; a remote failure falls back to the local record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Store`] when the local write fails.
    pub async fn add_customer(&self, input: NewCustomer) -> Result<Customer, DirectoryError> {
        let local = input
            .clone()
            .into_customer(CustomerId::generate(self.clock.as_ref()));
        let record = if self.config.remote_mutations_enabled {
            match self.source.create(&input).await {
                Ok(remote) => remote,
                Err(error) => {
                    self.remote_mirror_failed(DirectoryAction::Add, &error);
                    local
                }
            }
        } else {
            local
        };

        if let Err(error) = self.store.insert_one(&record).await {
            return Err(self.fail(DirectoryAction::Add, &error));
        }
        self.commit(RecordPatch::Insert(record.clone()));
        Ok(record)
    }

    /// Update an existing customer by id. Unknown ids leave memory unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Store`] when the local write fails.
    pub async fn update_customer(&self, record: Customer) -> Result<Customer, DirectoryError> {
        if self.config.remote_mutations_enabled {
            if let Err(error) = self.source.update(&record).await {
                self.remote_mirror_failed(DirectoryAction::Update, &error);
            }
        }

        if let Err(error) = self.store.update_one(&record).await {
            return Err(self.fail(DirectoryAction::Update, &error));
        }
        self.commit(RecordPatch::Replace(record.clone()));
        Ok(record)
    }

    /// Delete a customer by id.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Store`] when the local delete fails.
    pub async fn delete_customer(&self, id: &CustomerId) -> Result<(), DirectoryError> {
        if self.config.remote_mutations_enabled {
            if let Err(error) = self.source.delete(id).await {
                self.remote_mirror_failed(DirectoryAction::Delete, &error);
            }
        }

        if let Err(error) = self.store.delete_one(id).await {
            return Err(self.fail(DirectoryAction::Delete, &error));
        }
        self.commit(RecordPatch::Remove(id.clone()));
        Ok(())
    }

    /// Set the search term and recompute the projection.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.state.send_if_modified(|state| {
            if state.search_term == term {
                return false;
            }
            state.search_term = term;
            state.recompute_projection();
            true
        });
    }

    /// Set the role selector and recompute the projection.
    pub fn set_selected_role(&self, selector: RoleSelector) {
        self.state.send_if_modified(|state| {
            if state.selected_role == selector {
                return false;
            }
            state.selected_role = selector;
            state.recompute_projection();
            true
        });
    }

    /// Recompute the projection from the current records and filters.
    ///
    /// Idempotent; subscribers are only notified when the projection changes.
    pub fn filter_customers(&self) {
        self.state.send_if_modified(|state| {
            let before = std::mem::take(&mut state.projected);
            state.recompute_projection();
            before != state.projected
        });
    }

    /// Clear `last_error`. Nothing else changes.
    pub fn clear_error(&self) {
        self.state
            .send_if_modified(|state| state.last_error.take().is_some());
    }

    /// Release the store handle.
    pub async fn shutdown(&self) {
        self.store.close().await;
    }

    fn begin_reload(&self, kind: ReloadKind) -> ReloadGuard<'_> {
        let watermark = self.lock_log().begin_reload();
        self.state.send_modify(|state| match kind {
            ReloadKind::Load => {
                state.is_loading = true;
                state.phase = DirectoryPhase::Loading;
            }
            ReloadKind::Refresh => state.is_refreshing = true,
        });
        ReloadGuard {
            directory: self,
            kind,
            watermark,
        }
    }

    async fn read_for_load(&self) -> Result<(RecordOrigin, Vec<Customer>), CustomerStoreError> {
        self.run_store_diagnostics().await;

        let local_count = self.store.count().await?;
        if local_count == 0 {
            if let Some(seeded) = self.seed_from_remote().await {
                return Ok((RecordOrigin::RemoteSeed, seeded));
            }
        } else {
            self.diagnostics
                .record(DirectoryEvent::SeedNotNeeded { local_count });
        }

        let records = self.store.get_all().await?;
        Ok((RecordOrigin::LocalStore, records))
    }

    async fn run_store_diagnostics(&self) {
        if !self.store.probe().await {
            self.diagnostics.record(DirectoryEvent::StoreProbeFailed);
        }
        if let Err(error) = self.store.self_test().await {
            self.diagnostics.record(DirectoryEvent::SelfTestFailed {
                message: error.to_string(),
            });
        }
    }

    /// One remote fetch into an empty store. `None` means fall through to
    /// the local read.
    async fn seed_from_remote(&self) -> Option<Vec<Customer>> {
        let page = match self.source.fetch_all(RemoteCustomerFilter::default()).await {
            Ok(page) => page,
            Err(error) => {
                self.diagnostics.record(DirectoryEvent::SeedFetchFailed {
                    message: error.to_string(),
                });
                return None;
            }
        };
        if page.next_cursor.is_some() {
            self.diagnostics.record(DirectoryEvent::SeedCursorIgnored);
        }
        if page.items.is_empty() {
            self.diagnostics.record(DirectoryEvent::SeedRemoteEmpty);
            return None;
        }

        match self.write_seed(&page.items).await {
            Ok(()) => {
                self.diagnostics.record(DirectoryEvent::SeedApplied {
                    count: page.items.len(),
                });
                Some(page.items)
            }
            Err(error) => {
                self.diagnostics.record(DirectoryEvent::SeedWriteFailed {
                    message: error.to_string(),
                });
                None
            }
        }
    }

    /// Write a seed batch, relaxing the role constraint and retrying once if
    /// the table rejects a role value. Rows present before the relaxation are
    /// re-inserted alongside the batch.
    async fn write_seed(&self, batch: &[Customer]) -> Result<(), CustomerStoreError> {
        match self.store.insert_many(batch).await {
            Ok(()) => Ok(()),
            Err(error) if error.is_role_constraint_violation() => {
                let preserved = self.store.get_all().await?;
                self.store.drop_role_constraint().await?;
                self.diagnostics.record(DirectoryEvent::RoleConstraintRelaxed {
                    preserved_rows: preserved.len(),
                });
                let merged = merge_batch(preserved, batch);
                self.store.insert_many(&merged).await
            }
            Err(error) => Err(error),
        }
    }

    /// Publish reloaded records, replaying mutations that committed after the
    /// reload's watermark. Returns the published record count.
    fn publish(&self, watermark: Watermark, records: Vec<Customer>) -> usize {
        let log = self.lock_log();
        let patches: Vec<&RecordPatch> = log.patches_since(watermark).collect();
        let replayed = patches.len();
        let mut count = 0;
        self.state.send_modify(|state| {
            state.replace_records(records);
            for patch in patches {
                patch.apply(state);
            }
            state.recompute_projection();
            count = state.records.len();
        });
        drop(log);

        if replayed > 0 {
            self.diagnostics
                .record(DirectoryEvent::ReloadMergedMutations { replayed });
        }
        count
    }

    /// Apply a committed mutation to memory and journal it for in-flight
    /// reloads, under one lock.
    fn commit(&self, patch: RecordPatch) {
        let mut log = self.lock_log();
        self.state.send_modify(|state| {
            patch.apply(state);
            state.recompute_projection();
        });
        log.record(patch);
    }

    fn fail(&self, action: DirectoryAction, error: &CustomerStoreError) -> DirectoryError {
        self.diagnostics.record(DirectoryEvent::ActionFailed {
            action,
            message: error.to_string(),
        });
        self.state.send_modify(|state| {
            state.last_error = Some(action.failure_message().to_owned());
        });
        DirectoryError::store(action, error.clone())
    }

    fn remote_mirror_failed(&self, action: DirectoryAction, error: &impl ToString) {
        self.diagnostics.record(DirectoryEvent::RemoteMirrorFailed {
            action,
            message: error.to_string(),
        });
    }

    fn lock_log(&self) -> MutexGuard<'_, ReconcileLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Existing rows not overwritten by the batch, followed by the batch.
fn merge_batch(preserved: Vec<Customer>, batch: &[Customer]) -> Vec<Customer> {
    let mut merged: Vec<Customer> = preserved
        .into_iter()
        .filter(|row| batch.iter().all(|incoming| incoming.id() != row.id()))
        .collect();
    merged.extend_from_slice(batch);
    merged
}
