//! Reqwest-backed GraphQL customer source.
//!
//! This adapter owns transport details only: request serialisation, the
//! optional API key header, timeout and HTTP error mapping, and JSON decoding
//! into domain customers. It makes exactly one attempt per call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    CreateCustomerData, CreateCustomerInput, DeleteCustomerData, DeleteCustomerInput,
    GraphqlRequest, GraphqlResponse, InputVariables, ListCustomersData, ListVariables,
    UpdateCustomerData, UpdateCustomerInput,
};
use super::queries::{CREATE_CUSTOMER, DELETE_CUSTOMER, LIST_CUSTOMERS, UPDATE_CUSTOMER};
use crate::domain::ports::{CustomerPage, CustomerSource, RemoteCustomerFilter, RemoteSourceError};
use crate::domain::{Customer, CustomerId, NewCustomer};

const DEFAULT_USER_AGENT: &str = "customer-directory/0.1";
const API_KEY_HEADER: &str = "x-api-key";

/// Outbound identity for GraphQL requests.
#[derive(Debug, Clone)]
pub struct GraphqlHttpIdentity {
    /// HTTP user-agent sent with every request.
    pub user_agent: String,
    /// Value for the `x-api-key` header, when the API requires one.
    pub api_key: Option<String>,
}

impl Default for GraphqlHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            api_key: None,
        }
    }
}

/// Customer source that POSTs GraphQL documents to one endpoint.
pub struct GraphqlCustomerSource {
    client: Client,
    endpoint: Url,
    user_agent: String,
    api_key: Option<String>,
}

impl GraphqlCustomerSource {
    /// Build an adapter with an explicit request timeout.
    /// ```rust,ignore
    /// let source = GraphqlCustomerSource::new(endpoint, Duration::from_secs(10))?;
    /// ```
    /// # Errors
    ///
    /// Returns [`RemoteSourceError::InvalidRequest`] for non-HTTP endpoints or
    /// when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, RemoteSourceError> {
        Self::with_identity(endpoint, timeout, GraphqlHttpIdentity::default())
    }

    /// Build an adapter with explicit outbound identity.
    /// # Errors
    ///
    /// Returns [`RemoteSourceError::InvalidRequest`] for non-HTTP endpoints or
    /// when the reqwest client cannot be constructed.
    pub fn with_identity(
        endpoint: Url,
        timeout: Duration,
        identity: GraphqlHttpIdentity,
    ) -> Result<Self, RemoteSourceError> {
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RemoteSourceError::invalid_request(format!(
                "unsupported endpoint scheme '{}'",
                endpoint.scheme()
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| RemoteSourceError::invalid_request(error.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            user_agent: identity.user_agent,
            api_key: identity.api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, RemoteSourceError>
    where
        V: Serialize + Send + Sync,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&GraphqlRequest { query, variables });
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key.as_str());
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        debug!(bytes = body.len(), "graphql response received");
        parse_data(body.as_ref())
    }
}

#[async_trait]
impl CustomerSource for GraphqlCustomerSource {
    async fn fetch_all(
        &self,
        filter: RemoteCustomerFilter,
    ) -> Result<CustomerPage, RemoteSourceError> {
        let data: ListCustomersData = self
            .execute(LIST_CUSTOMERS, ListVariables::from(filter))
            .await?;
        let connection = data
            .list_customers
            .ok_or_else(|| RemoteSourceError::decode("listCustomers returned null"))?;
        connection
            .into_domain_page()
            .map_err(RemoteSourceError::decode)
    }

    async fn create(&self, input: &NewCustomer) -> Result<Customer, RemoteSourceError> {
        let data: CreateCustomerData = self
            .execute(
                CREATE_CUSTOMER,
                InputVariables {
                    input: CreateCustomerInput::from(input),
                },
            )
            .await?;
        data.create_customer
            .ok_or_else(|| RemoteSourceError::decode("createCustomer returned null"))?
            .into_domain_customer()
            .map_err(RemoteSourceError::decode)
    }

    async fn update(&self, record: &Customer) -> Result<Customer, RemoteSourceError> {
        let data: UpdateCustomerData = self
            .execute(
                UPDATE_CUSTOMER,
                InputVariables {
                    input: UpdateCustomerInput::from(record),
                },
            )
            .await?;
        data.update_customer
            .ok_or_else(|| RemoteSourceError::decode("updateCustomer returned null"))?
            .into_domain_customer()
            .map_err(RemoteSourceError::decode)
    }

    async fn delete(&self, id: &CustomerId) -> Result<CustomerId, RemoteSourceError> {
        let data: DeleteCustomerData = self
            .execute(
                DELETE_CUSTOMER,
                InputVariables {
                    input: DeleteCustomerInput { id: id.as_str() },
                },
            )
            .await?;
        data.delete_customer
            .ok_or_else(|| RemoteSourceError::decode("deleteCustomer returned null"))?
            .into_domain_id()
            .map_err(RemoteSourceError::decode)
    }
}

/// Decode a GraphQL envelope. Any reported error rejects the call, even when
/// partial data is present.
fn parse_data<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteSourceError> {
    let envelope: GraphqlResponse<T> = serde_json::from_slice(body).map_err(|error| {
        RemoteSourceError::decode(format!("invalid GraphQL JSON payload: {error}"))
    })?;
    if !envelope.errors.is_empty() {
        let messages = envelope
            .errors
            .into_iter()
            .map(|error| error.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(RemoteSourceError::rejected(messages));
    }
    envelope
        .data
        .ok_or_else(|| RemoteSourceError::decode("GraphQL response missing data"))
}

fn map_transport_error(error: reqwest::Error) -> RemoteSourceError {
    if error.is_timeout() {
        RemoteSourceError::timeout(error.to_string())
    } else {
        RemoteSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RemoteSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RemoteSourceError::timeout(message)
        }
        _ if status.is_client_error() => RemoteSourceError::rejected(message),
        _ => RemoteSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
