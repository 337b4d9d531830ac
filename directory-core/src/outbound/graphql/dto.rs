//! DTOs for GraphQL requests and responses.
//!
//! Responses decode into these transport DTOs first, then map into domain
//! customers in one pass. Role strings go through the normaliser there, so
//! nothing free-form crosses into the domain.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{CustomerPage, RemoteCustomerFilter};
use crate::domain::{Customer, CustomerId, NewCustomer, normalize_role};

#[derive(Debug, Serialize)]
pub(super) struct GraphqlRequest<'a, V> {
    pub(super) query: &'a str,
    pub(super) variables: V,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlResponse<T> {
    pub(super) data: Option<T>,
    #[serde(default)]
    pub(super) errors: Vec<GraphqlErrorDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlErrorDto {
    pub(super) message: String,
}

// -- variables ---------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct ListVariables {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) filter: Option<RoleFilterDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct RoleFilterDto {
    pub(super) role: EqualityDto,
}

#[derive(Debug, Serialize)]
pub(super) struct EqualityDto {
    pub(super) eq: &'static str,
}

impl From<RemoteCustomerFilter> for ListVariables {
    fn from(filter: RemoteCustomerFilter) -> Self {
        Self {
            filter: filter.role.map(|role| RoleFilterDto {
                role: EqualityDto { eq: role.as_str() },
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct InputVariables<I> {
    pub(super) input: I,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateCustomerInput<'a> {
    pub(super) name: &'a str,
    pub(super) email: &'a str,
    pub(super) role: &'static str,
}

impl<'a> From<&'a NewCustomer> for CreateCustomerInput<'a> {
    fn from(input: &'a NewCustomer) -> Self {
        Self {
            name: input.name(),
            email: input.email(),
            role: input.role().as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateCustomerInput<'a> {
    pub(super) id: &'a str,
    pub(super) name: &'a str,
    pub(super) email: &'a str,
    pub(super) role: &'static str,
}

impl<'a> From<&'a Customer> for UpdateCustomerInput<'a> {
    fn from(record: &'a Customer) -> Self {
        Self {
            id: record.id().as_str(),
            name: record.name(),
            email: record.email(),
            role: record.role().as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DeleteCustomerInput<'a> {
    pub(super) id: &'a str,
}

// -- response data -------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListCustomersData {
    pub(super) list_customers: Option<CustomerConnectionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CustomerConnectionDto {
    #[serde(default)]
    pub(super) items: Vec<Option<CustomerDto>>,
    pub(super) next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateCustomerData {
    pub(super) create_customer: Option<CustomerDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateCustomerData {
    pub(super) update_customer: Option<CustomerDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteCustomerData {
    pub(super) delete_customer: Option<DeletedCustomerDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CustomerDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: String,
    #[serde(default)]
    pub(super) email: String,
    pub(super) role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeletedCustomerDto {
    pub(super) id: String,
}

impl CustomerConnectionDto {
    /// Null items are dropped; a malformed item fails the whole page.
    pub(super) fn into_domain_page(self) -> Result<CustomerPage, String> {
        let items = self
            .items
            .into_iter()
            .flatten()
            .map(CustomerDto::into_domain_customer)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CustomerPage {
            items,
            next_cursor: self.next_token,
        })
    }
}

impl CustomerDto {
    pub(super) fn into_domain_customer(self) -> Result<Customer, String> {
        let id = CustomerId::new(&self.id).map_err(|err| format!("remote customer: {err}"))?;
        let role = normalize_role(self.role.as_deref().unwrap_or_default());
        Ok(Customer::new(id, self.name, self.email, role))
    }
}

impl DeletedCustomerDto {
    pub(super) fn into_domain_id(self) -> Result<CustomerId, String> {
        CustomerId::new(&self.id).map_err(|err| format!("deleted customer: {err}"))
    }
}
