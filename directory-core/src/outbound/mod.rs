//! Outbound adapters implementing domain ports.

pub mod diagnostics;
mod example_source;
pub mod graphql;
pub mod persistence;

pub use example_source::ExampleCustomerSource;
