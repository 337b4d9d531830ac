//! Deterministic example customer generation for demonstration purposes.
//!
//! This crate produces believable, reproducible customer records from a numeric
//! seed. It is independent of the directory domain types so it can be used by
//! fixtures, demos, and tests without a circular dependency.
//!
//! Role labels are emitted as raw strings drawn from the spellings real
//! upstream systems send (`"admin"`, `"Administrator"`, `"team_manager"`, and
//! so on). Consumers are expected to normalise them before trusting them.
//!
//! # Example
//!
//! ```
//! use example_customers::generate_example_customers;
//!
//! let customers = generate_example_customers(42, 3).expect("generation succeeds");
//! assert_eq!(customers.len(), 3);
//!
//! // The same seed always yields the same customers.
//! let again = generate_example_customers(42, 3).expect("generation succeeds");
//! assert_eq!(customers, again);
//! ```

mod error;
mod generator;
mod seed;

pub use error::GenerationError;
pub use generator::{MAX_EXAMPLE_CUSTOMERS, generate_example_customers};
pub use seed::{ExampleCustomerSeed, ROLE_LABELS};
