//! GraphQL documents for the customer API.

pub(super) const LIST_CUSTOMERS: &str = "\
query ListCustomers($filter: ModelCustomerFilterInput) {
  listCustomers(filter: $filter) {
    items { id name email role }
    nextToken
  }
}";

pub(super) const CREATE_CUSTOMER: &str = "\
mutation CreateCustomer($input: CreateCustomerInput!) {
  createCustomer(input: $input) { id name email role }
}";

pub(super) const UPDATE_CUSTOMER: &str = "\
mutation UpdateCustomer($input: UpdateCustomerInput!) {
  updateCustomer(input: $input) { id name email role }
}";

pub(super) const DELETE_CUSTOMER: &str = "\
mutation DeleteCustomer($input: DeleteCustomerInput!) {
  deleteCustomer(input: $input) { id }
}";
