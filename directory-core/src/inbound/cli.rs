//! Command-line driver for the directory action surface.
//!
//! The binary parses arguments into [`Cli`] and hands the command to
//! [`run_command`], keeping behaviour testable without spawning a process.

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::domain::{
    Customer, CustomerDirectory, CustomerId, CustomerValidationError, DirectoryError, NewCustomer,
    RoleSelector, normalize_role,
};

/// Local-first customer directory.
#[derive(Debug, Parser)]
#[command(name = "customer-directory", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the filtered customer list.
    List {
        /// Role filter: all, admin, or manager.
        #[arg(long, default_value = "all")]
        role: RoleSelector,
        /// Case-insensitive name search.
        #[arg(long)]
        search: Option<String>,
        /// Emit JSON instead of tab-separated rows.
        #[arg(long)]
        json: bool,
    },
    /// Add a customer.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Any role label; normalised to Admin or Manager.
        #[arg(long)]
        role: String,
    },
    /// Change fields of an existing customer.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Delete a customer by id.
    Delete { id: String },
    /// Re-read every record from the local store.
    Refresh,
}

/// Errors surfaced by a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("invalid input: {0}")]
    InvalidInput(#[from] CustomerValidationError),
    #[error("no customer with id {id}")]
    UnknownCustomer { id: String },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode customers as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Execute `command` against a loaded directory.
///
/// Results go to `out`. A non-fatal `last_error` left on the snapshot, such
/// as a failed startup load, is reported on `err` before the command runs.
///
/// # Errors
///
/// Returns [`CliError`] when input is invalid, the target record is unknown,
/// a store write fails, or output cannot be written.
pub async fn run_command(
    directory: &CustomerDirectory,
    command: Command,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<(), CliError> {
    report_last_error(directory, err)?;
    match command {
        Command::List { role, search, json } => {
            directory.set_selected_role(role);
            directory.set_search_term(search.unwrap_or_default());
            let projected = directory.snapshot().projected;
            if json {
                serde_json::to_writer_pretty(&mut *out, &projected)?;
                writeln!(out)?;
            } else {
                write_rows(out, &projected)?;
            }
        }
        Command::Add { name, email, role } => {
            let input = NewCustomer::new(name, email, normalize_role(&role))?;
            let created = directory.add_customer(input).await?;
            write_rows(out, std::slice::from_ref(&created))?;
        }
        Command::Update {
            id,
            name,
            email,
            role,
        } => {
            let id = CustomerId::new(&id)?;
            let current = directory
                .snapshot()
                .record(&id)
                .cloned()
                .ok_or_else(|| CliError::UnknownCustomer {
                    id: id.to_string(),
                })?;
            let changed = Customer::new(
                id,
                name.unwrap_or_else(|| current.name().to_owned()),
                email.unwrap_or_else(|| current.email().to_owned()),
                role.map_or(current.role(), |label| normalize_role(&label)),
            );
            let updated = directory.update_customer(changed).await?;
            write_rows(out, std::slice::from_ref(&updated))?;
        }
        Command::Delete { id } => {
            let id = CustomerId::new(&id)?;
            directory.delete_customer(&id).await?;
            writeln!(out, "deleted {id}")?;
        }
        Command::Refresh => {
            let count = directory.refresh_customers().await?;
            writeln!(out, "refreshed {count} customers")?;
        }
    }
    Ok(())
}

/// Write and clear the snapshot's `last_error`, if any.
///
/// # Errors
///
/// Returns the I/O error when `err` cannot be written.
pub fn report_last_error(directory: &CustomerDirectory, err: &mut impl Write) -> io::Result<()> {
    if let Some(message) = directory.snapshot().last_error {
        writeln!(err, "error: {message}")?;
        directory.clear_error();
    }
    Ok(())
}

fn write_rows(out: &mut impl Write, customers: &[Customer]) -> io::Result<()> {
    for customer in customers {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            customer.id(),
            customer.name(),
            customer.email(),
            customer.role()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
