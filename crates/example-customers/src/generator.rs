//! Deterministic customer generation from a numeric seed.
//!
//! The same `(seed, count)` pair always produces identical output, so demo
//! databases and tests can rely on stable fixtures.

use std::collections::HashSet;

use fake::Fake;
use fake::faker::internet::raw::FreeEmailProvider;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::error::GenerationError;
use crate::seed::{ExampleCustomerSeed, ROLE_LABELS};

/// Upper bound on a single generation request.
pub const MAX_EXAMPLE_CUSTOMERS: usize = 10_000;

/// Maximum number of attempts to generate a usable name.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Generates example customers from a seed.
///
/// Each customer has a deterministic UUID, a `First Last` name, an email
/// derived from that name (unique within the batch), and a raw role label
/// sampled from [`ROLE_LABELS`].
///
/// # Errors
///
/// Returns [`GenerationError::TooManyCustomers`] when `count` exceeds
/// [`MAX_EXAMPLE_CUSTOMERS`], or [`GenerationError::NameGenerationFailed`]
/// when no usable name could be produced.
///
/// # Example
///
/// ```
/// use example_customers::generate_example_customers;
///
/// let customers = generate_example_customers(7, 2).expect("generated");
/// assert!(customers.iter().all(|customer| customer.email.contains('@')));
/// ```
pub fn generate_example_customers(
    seed: u64,
    count: usize,
) -> Result<Vec<ExampleCustomerSeed>, GenerationError> {
    if count > MAX_EXAMPLE_CUSTOMERS {
        return Err(GenerationError::TooManyCustomers {
            requested: count,
            max: MAX_EXAMPLE_CUSTOMERS,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut used_emails = HashSet::with_capacity(count);
    let mut customers = Vec::with_capacity(count);

    for _ in 0..count {
        let customer = generate_single_customer(&mut rng, &mut used_emails)?;
        customers.push(customer);
    }

    Ok(customers)
}

fn generate_single_customer(
    rng: &mut ChaCha8Rng,
    used_emails: &mut HashSet<String>,
) -> Result<ExampleCustomerSeed, GenerationError> {
    let id = Uuid::from_u128(rng.random());
    let (first, last) = generate_name_parts(rng)?;
    let provider: String = FreeEmailProvider(EN).fake_with_rng(rng);
    let email = unique_email(&first, &last, &provider, used_emails);
    let role_label = ROLE_LABELS.choose(rng).copied().unwrap_or("Manager");

    Ok(ExampleCustomerSeed {
        id,
        name: format!("{first} {last}"),
        email,
        role_label: role_label.to_owned(),
    })
}

/// Generates a first/last name pair whose email local part is non-empty.
fn generate_name_parts(rng: &mut ChaCha8Rng) -> Result<(String, String), GenerationError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let first: String = FirstName(EN).fake_with_rng(rng);
        let last: String = LastName(EN).fake_with_rng(rng);
        let first = first.trim().to_owned();
        let last = last.trim().to_owned();

        if !email_fragment(&first).is_empty() && !email_fragment(&last).is_empty() {
            return Ok((first, last));
        }
    }

    Err(GenerationError::NameGenerationFailed {
        max_attempts: MAX_NAME_ATTEMPTS,
    })
}

fn unique_email(
    first: &str,
    last: &str,
    provider: &str,
    used_emails: &mut HashSet<String>,
) -> String {
    let local = format!("{}.{}", email_fragment(first), email_fragment(last));
    let mut candidate = format!("{local}@{provider}");
    let mut suffix = 2_u32;
    while used_emails.contains(&candidate) {
        candidate = format!("{local}{suffix}@{provider}");
        suffix += 1;
    }
    used_emails.insert(candidate.clone());
    candidate
}

/// Lowercase ASCII alphanumerics of `part`, dropping everything else.
fn email_fragment(part: &str) -> String {
    part.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("O'Connor", "oconnor")]
    #[case("Mary-Jane", "maryjane")]
    #[case("  ", "")]
    fn email_fragment_keeps_only_lowercase_alphanumerics(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(email_fragment(input), expected);
    }

    #[test]
    fn unique_email_appends_suffix_on_collision() {
        let mut used = HashSet::new();
        let first = unique_email("Ada", "Lovelace", "example.com", &mut used);
        let second = unique_email("Ada", "Lovelace", "example.com", &mut used);
        assert_eq!(first, "ada.lovelace@example.com");
        assert_eq!(second, "ada.lovelace2@example.com");
    }
}
