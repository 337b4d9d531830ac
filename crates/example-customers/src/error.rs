//! Error types for example customer generation.

use thiserror::Error;

/// Errors that can occur during customer generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Failed to generate a usable name after the maximum number of retries.
    #[error("failed to generate a valid customer name after {max_attempts} attempts")]
    NameGenerationFailed {
        /// Number of attempts made before giving up.
        max_attempts: usize,
    },

    /// The requested customer count exceeds the supported maximum.
    #[error("requested {requested} customers but at most {max} can be generated")]
    TooManyCustomers {
        /// Number of customers requested.
        requested: usize,
        /// Maximum number of customers supported.
        max: usize,
    },
}
