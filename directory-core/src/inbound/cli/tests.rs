//! Unit tests for the command-line driver.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use clap::Parser;
use rstest::{fixture, rstest};

use super::{Cli, CliError, Command, run_command};
use crate::domain::ports::CustomerStoreError;
use crate::domain::{
    Customer, CustomerDirectory, CustomerId, DirectoryConfig, DirectoryError, DirectoryPorts,
    Role, RoleSelector,
};
use crate::test_support::{
    FixedClock, RecordingDiagnostics, ScriptedCustomerSource, StoreOperation, StubCustomerStore,
};

struct Run {
    store: Arc<StubCustomerStore>,
    directory: CustomerDirectory,
}

impl Run {
    async fn command(&self, command: Command) -> (Result<(), CliError>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = run_command(&self.directory, command, &mut out, &mut err).await;
        (
            result,
            String::from_utf8(out).expect("utf-8 stdout"),
            String::from_utf8(err).expect("utf-8 stderr"),
        )
    }
}

#[fixture]
fn run() -> Run {
    let store = Arc::new(StubCustomerStore::with_rows(vec![
        Customer::new(
            CustomerId::new("1").expect("id"),
            "John Doe",
            "john@example.com",
            Role::Admin,
        ),
        Customer::new(
            CustomerId::new("2").expect("id"),
            "Jane Smith",
            "jane@example.com",
            Role::Manager,
        ),
    ]));
    let directory = CustomerDirectory::new(
        DirectoryPorts {
            store: store.clone(),
            source: Arc::new(ScriptedCustomerSource::default()),
            diagnostics: Arc::new(RecordingDiagnostics::default()),
        },
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0)
                .single()
                .expect("valid time"),
        )),
        DirectoryConfig::default(),
    );
    Run { store, directory }
}

#[rstest]
#[case(&["customer-directory", "list"], Command::List { role: RoleSelector::All, search: None, json: false })]
#[case(
    &["customer-directory", "list", "--role", "Manager", "--search", "jane", "--json"],
    Command::List { role: RoleSelector::Manager, search: Some("jane".to_owned()), json: true }
)]
#[case(&["customer-directory", "delete", "abc"], Command::Delete { id: "abc".to_owned() })]
#[case(&["customer-directory", "refresh"], Command::Refresh)]
fn arguments_parse_into_commands(#[case] args: &[&str], #[case] expected: Command) {
    let cli = Cli::try_parse_from(args).expect("arguments parse");
    assert_eq!(cli.command, expected);
}

#[test]
fn unknown_role_selector_is_rejected() {
    assert!(Cli::try_parse_from(["customer-directory", "list", "--role", "owner"]).is_err());
}

#[rstest]
#[tokio::test]
async fn list_prints_filtered_rows(run: Run) {
    run.directory.load_customers().await;
    let (result, out, err) = run
        .command(Command::List {
            role: RoleSelector::Admin,
            search: None,
            json: false,
        })
        .await;

    result.expect("list succeeds");
    assert_eq!(out, "1\tJohn Doe\tjohn@example.com\tAdmin\n");
    assert!(err.is_empty());
}

#[rstest]
#[tokio::test]
async fn list_json_emits_projected_records(run: Run) {
    run.directory.load_customers().await;
    let (result, out, _) = run
        .command(Command::List {
            role: RoleSelector::All,
            search: Some(" smith ".to_owned()),
            json: true,
        })
        .await;

    result.expect("list succeeds");
    let decoded: Vec<Customer> = serde_json::from_str(&out).expect("valid json");
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].name(), "Jane Smith");
}

#[rstest]
#[tokio::test]
async fn add_normalises_the_role_label(run: Run) {
    run.directory.load_customers().await;
    let (result, out, _) = run
        .command(Command::Add {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            role: "Administrator".to_owned(),
        })
        .await;

    result.expect("add succeeds");
    assert!(out.ends_with("\tAda Lovelace\tada@example.com\tAdmin\n"));
    assert_eq!(run.store.rows().len(), 3);
}

#[rstest]
#[tokio::test]
async fn add_rejects_invalid_email(run: Run) {
    run.directory.load_customers().await;
    let (result, _, _) = run
        .command(Command::Add {
            name: "Ada".to_owned(),
            email: "not-an-email".to_owned(),
            role: "admin".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(CliError::InvalidInput(_))));
}

#[rstest]
#[tokio::test]
async fn update_keeps_unspecified_fields(run: Run) {
    run.directory.load_customers().await;
    let (result, out, _) = run
        .command(Command::Update {
            id: "2".to_owned(),
            name: None,
            email: Some("jane.smith@example.com".to_owned()),
            role: None,
        })
        .await;

    result.expect("update succeeds");
    assert_eq!(out, "2\tJane Smith\tjane.smith@example.com\tManager\n");
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_id_fails(run: Run) {
    run.directory.load_customers().await;
    let (result, _, _) = run
        .command(Command::Update {
            id: "99".to_owned(),
            name: Some("Nobody".to_owned()),
            email: None,
            role: None,
        })
        .await;

    assert!(matches!(result, Err(CliError::UnknownCustomer { .. })));
}

#[rstest]
#[tokio::test]
async fn failed_delete_returns_the_store_error(run: Run) {
    run.directory.load_customers().await;
    run.store.fail_on(
        StoreOperation::DeleteOne,
        CustomerStoreError::query("database is locked"),
    );

    let (result, out, _) = run.command(Command::Delete { id: "1".to_owned() }).await;

    let error = result.expect_err("delete fails");
    assert!(matches!(error, CliError::Directory(DirectoryError::Store { .. })));
    assert!(error.to_string().starts_with("Failed to delete customer"));
    assert!(out.is_empty());
}

#[rstest]
#[tokio::test]
async fn load_failure_is_reported_on_stderr_once(run: Run) {
    run.store
        .fail_on(StoreOperation::Count, CustomerStoreError::query("disk I/O error"));
    run.directory.load_customers().await;

    let (first, _, err) = run.command(Command::Refresh).await;
    assert!(first.is_ok());
    assert_eq!(err, "error: Failed to load customers\n");

    let (_, _, err) = run.command(Command::Refresh).await;
    assert!(err.is_empty());
}

#[rstest]
#[tokio::test]
async fn refresh_reports_the_record_count(run: Run) {
    run.directory.load_customers().await;
    let (result, out, _) = run.command(Command::Refresh).await;
    result.expect("refresh succeeds");
    assert_eq!(out, "refreshed 2 customers\n");
}
