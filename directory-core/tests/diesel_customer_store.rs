//! Integration tests for `DieselCustomerStore` against on-disk SQLite files.
//!
//! Each test gets its own temporary database so the lifecycle, ordering and
//! constraint-relaxation behaviour can be checked against real SQLite.

use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};
use directory_core::domain::ports::{CustomerStore, CustomerStoreError};
use directory_core::domain::{Customer, CustomerId, Role};
use directory_core::outbound::persistence::DieselCustomerStore;
use directory_core::test_support::TempCustomerDatabase;
use rstest::{fixture, rstest};

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

fn customer(id: &str, name: &str, role: Role) -> Customer {
    Customer::new(
        CustomerId::new(id).expect("fixture id is valid"),
        name,
        format!("{id}@example.com"),
        role,
    )
}

#[fixture]
fn database() -> TempCustomerDatabase {
    TempCustomerDatabase::new().expect("temporary database directory")
}

async fn open_store(database: &TempCustomerDatabase) -> DieselCustomerStore {
    let store = database.store();
    store.initialize().await.expect("store initializes");
    store
}

/// Run raw SQL on a second, synchronous connection to the same file.
fn execute_raw(database: &TempCustomerDatabase, sql: &str) -> diesel::QueryResult<()> {
    let url = database.path().to_string_lossy().into_owned();
    let mut conn = SqliteConnection::establish(&url).expect("raw connection");
    conn.batch_execute(sql)
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn calls_before_initialize_are_rejected(database: TempCustomerDatabase) {
    let store = database.store();

    let error = store.count().await.expect_err("store is not open yet");
    assert_eq!(error, CustomerStoreError::NotInitialized);
    assert!(!store.probe().await);
}

#[rstest]
#[tokio::test]
async fn initialize_creates_the_table_and_is_idempotent(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    store.initialize().await.expect("second initialize");

    assert!(store.probe().await);
    assert_eq!(store.count().await.expect("count"), 0);
    store.self_test().await.expect("self-test passes");
    assert_eq!(store.count().await.expect("count"), 0);
}

#[rstest]
#[tokio::test]
async fn failed_self_test_leaves_no_row_behind(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    execute_raw(
        &database,
        "CREATE TRIGGER block_self_test_delete BEFORE DELETE ON customers \
         WHEN old.id LIKE '\\_\\_self\\_test\\_\\_%' ESCAPE '\\' \
         BEGIN SELECT RAISE(ABORT, 'delete blocked'); END;",
    )
    .expect("trigger created");

    let error = store.self_test().await.expect_err("delete is blocked");

    assert!(matches!(error, CustomerStoreError::Query { .. }), "got {error:?}");
    assert_eq!(store.count().await.expect("count"), 0);
    assert!(store.get_all().await.expect("get all").is_empty());
}

#[rstest]
#[tokio::test]
async fn close_is_idempotent_and_blocks_further_calls(database: TempCustomerDatabase) {
    let store = open_store(&database).await;

    store.close().await;
    store.close().await;

    let error = store.get_all().await.expect_err("store is closed");
    assert_eq!(error, CustomerStoreError::NotInitialized);
}

#[rstest]
#[tokio::test]
async fn rows_survive_reopening_the_file(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    store
        .insert_one(&customer("a", "Ada Lovelace", Role::Admin))
        .await
        .expect("insert");
    store.close().await;

    let reopened = open_store(&database).await;
    assert_eq!(reopened.count().await.expect("count"), 1);
}

// -----------------------------------------------------------------------------
// Reads and writes
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn get_all_orders_by_name_case_insensitively(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    store
        .insert_many(&[
            customer("3", "charlie Brown", Role::Manager),
            customer("1", "Bob Stone", Role::Admin),
            customer("2", "alice Wong", Role::Manager),
        ])
        .await
        .expect("insert many");

    let names: Vec<String> = store
        .get_all()
        .await
        .expect("get all")
        .iter()
        .map(|row| row.name().to_owned())
        .collect();
    assert_eq!(names, ["alice Wong", "Bob Stone", "charlie Brown"]);
}

#[rstest]
#[tokio::test]
async fn insert_replaces_an_existing_id(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    store
        .insert_one(&customer("1", "John Doe", Role::Admin))
        .await
        .expect("first insert");
    store
        .insert_one(&customer("1", "John Q. Doe", Role::Manager))
        .await
        .expect("second insert");

    let rows = store.get_all().await.expect("get all");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name(), "John Q. Doe");
    assert_eq!(rows[0].role(), Role::Manager);
}

#[rstest]
#[tokio::test]
async fn update_and_delete_of_missing_ids_are_no_ops(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    store
        .insert_one(&customer("1", "John Doe", Role::Admin))
        .await
        .expect("insert");

    store
        .update_one(&customer("404", "Nobody", Role::Manager))
        .await
        .expect("update of unknown id");
    store
        .delete_one(&CustomerId::new("404").expect("id"))
        .await
        .expect("delete of unknown id");

    assert_eq!(store.count().await.expect("count"), 1);
}

#[rstest]
#[tokio::test]
async fn update_rewrites_every_field(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    store
        .insert_one(&customer("1", "Jane Smith", Role::Manager))
        .await
        .expect("insert");

    let changed = Customer::new(
        CustomerId::new("1").expect("id"),
        "Jane Doe",
        "jane.doe@example.com",
        Role::Admin,
    );
    store.update_one(&changed).await.expect("update");

    assert_eq!(store.get_all().await.expect("get all"), vec![changed]);
}

#[rstest]
#[tokio::test]
async fn delete_all_empties_the_table(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    store
        .insert_many(&[
            customer("1", "John Doe", Role::Admin),
            customer("2", "Jane Smith", Role::Manager),
        ])
        .await
        .expect("insert many");

    store.delete_all().await.expect("delete all");
    assert_eq!(store.count().await.expect("count"), 0);
}

// -----------------------------------------------------------------------------
// Role constraint
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn role_check_rejects_free_form_roles(database: TempCustomerDatabase) {
    let _store = open_store(&database).await;

    let result = execute_raw(
        &database,
        "INSERT INTO customers (id, name, email, role) \
         VALUES ('x', 'Legacy', 'legacy@example.com', 'ADMINISTRATOR')",
    );
    assert!(result.is_err(), "role check should reject the row");
}

#[rstest]
#[tokio::test]
async fn relaxed_table_reads_free_form_roles_back_canonical(database: TempCustomerDatabase) {
    let store = open_store(&database).await;
    store
        .insert_one(&customer("1", "John Doe", Role::Admin))
        .await
        .expect("insert");

    store
        .drop_role_constraint()
        .await
        .expect("constraint dropped");
    assert!(store.probe().await);
    assert_eq!(store.count().await.expect("count"), 0);

    execute_raw(
        &database,
        "INSERT INTO customers (id, name, email, role) VALUES \
         ('x', 'Legacy Admin', 'legacy@example.com', 'ADMINISTRATOR'), \
         ('y', 'Legacy Lead', 'lead@example.com', 'team lead')",
    )
    .expect("relaxed table accepts free-form roles");

    let rows = store.get_all().await.expect("get all");
    let roles: Vec<(String, Role)> = rows
        .iter()
        .map(|row| (row.id().to_string(), row.role()))
        .collect();
    assert_eq!(
        roles,
        [
            ("x".to_owned(), Role::Admin),
            ("y".to_owned(), Role::Manager)
        ]
    );
}
