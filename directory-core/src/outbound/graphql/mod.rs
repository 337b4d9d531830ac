//! GraphQL outbound adapter.
//!
//! A thin HTTP implementation of the `CustomerSource` port against an
//! AppSync-style customer API.

mod dto;
mod http_source;
mod queries;

pub use http_source::{GraphqlCustomerSource, GraphqlHttpIdentity};
