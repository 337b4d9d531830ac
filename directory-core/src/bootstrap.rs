//! Composition root: wires settings to adapters and builds the engine.

use std::sync::Arc;

use example_customers::GenerationError;
use mockable::DefaultClock;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::DirectorySettings;
use crate::domain::ports::{
    CustomerSource, CustomerStore, CustomerStoreError, OfflineCustomerSource, RemoteSourceError,
};
use crate::domain::{CustomerDirectory, DirectoryPorts};
use crate::outbound::ExampleCustomerSource;
use crate::outbound::diagnostics::TracingDiagnostics;
use crate::outbound::graphql::{GraphqlCustomerSource, GraphqlHttpIdentity};
use crate::outbound::persistence::{DieselCustomerStore, StoreConfig};

/// Errors that prevent the directory from starting.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The local store could not be opened or its schema created.
    #[error("customer store initialization failed: {0}")]
    StoreInit(#[source] CustomerStoreError),
    /// The configured remote endpoint is not a valid URL.
    #[error("invalid remote endpoint {endpoint:?}: {source}")]
    RemoteEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    /// The remote client could not be constructed.
    #[error("remote source setup failed: {0}")]
    RemoteSource(#[source] RemoteSourceError),
    /// Example customers could not be generated.
    #[error("example customer generation failed: {0}")]
    ExampleData(#[source] GenerationError),
}

/// Build a ready [`CustomerDirectory`] from `settings`.
///
/// The store is opened and its schema created before the engine exists, so
/// an initialization failure is fatal. The remote source is chosen in order:
/// a configured GraphQL endpoint, a configured example seed, otherwise an
/// offline source that fails every call.
///
/// # Errors
///
/// Returns [`BootstrapError`] when the store cannot be initialized or the
/// remote source cannot be built from the settings.
pub async fn build_directory(
    settings: &DirectorySettings,
) -> Result<CustomerDirectory, BootstrapError> {
    let store = DieselCustomerStore::new(StoreConfig::new(settings.database_path()));
    store.initialize().await.map_err(BootstrapError::StoreInit)?;
    info!(path = %settings.database_path().display(), "customer store ready");

    let source = build_source(settings)?;
    let ports = DirectoryPorts {
        store: Arc::new(store),
        source,
        diagnostics: Arc::new(TracingDiagnostics),
    };
    Ok(CustomerDirectory::new(
        ports,
        Arc::new(DefaultClock),
        settings.directory_config(),
    ))
}

fn build_source(settings: &DirectorySettings) -> Result<Arc<dyn CustomerSource>, BootstrapError> {
    if let Some(endpoint) = settings.remote_endpoint.as_deref() {
        let url = Url::parse(endpoint).map_err(|source| BootstrapError::RemoteEndpoint {
            endpoint: endpoint.to_owned(),
            source,
        })?;
        let identity = GraphqlHttpIdentity {
            api_key: settings.remote_api_key.clone(),
            ..GraphqlHttpIdentity::default()
        };
        let source = GraphqlCustomerSource::with_identity(url, settings.remote_timeout(), identity)
            .map_err(BootstrapError::RemoteSource)?;
        info!(endpoint = %source.endpoint(), "using GraphQL customer source");
        return Ok(Arc::new(source));
    }

    if let Some(seed) = settings.example_seed {
        let source = ExampleCustomerSource::generate(seed, settings.example_count())
            .map_err(BootstrapError::ExampleData)?;
        info!(seed, count = source.len(), "using example customer source");
        return Ok(Arc::new(source));
    }

    info!("no remote configured; running offline");
    Ok(Arc::new(OfflineCustomerSource))
}
