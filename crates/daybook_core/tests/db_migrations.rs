use daybook_core::db::migrations::latest_version;
use daybook_core::db::{open_db, open_db_in_memory, probe, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "users",
        "api_tokens",
        "folders",
        "tasks",
        "task_substeps",
        "task_notes",
        "diary_entries",
    ] {
        assert_table_exists(&conn, table);
    }
    assert_eq!(probe(&conn).unwrap(), 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daybook.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute(
            "INSERT INTO users (email, name) VALUES ('a@example.com', 'A');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let users: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO tasks (user_id, title) VALUES (424242, 'orphan');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().to_lowercase().contains("foreign key"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn default_timestamps_carry_millisecond_precision() {
    let conn = open_db_in_memory().unwrap();
    let before_ms = epoch_ms_now();

    let mut stamps = Vec::new();
    for index in 0..5 {
        conn.execute(
            "INSERT INTO users (email, name) VALUES (?1, 'Stamp');",
            [format!("stamp{index}@example.com")],
        )
        .unwrap();
        let created_at: i64 = conn
            .query_row(
                "SELECT created_at FROM users WHERE id = last_insert_rowid();",
                [],
                |row| row.get(0),
            )
            .unwrap();
        stamps.push(created_at);
        std::thread::sleep(std::time::Duration::from_millis(3));
    }
    let after_ms = epoch_ms_now();

    assert!(stamps.iter().all(|ms| (before_ms..=after_ms).contains(ms)));
    assert!(stamps.iter().any(|ms| ms % 1000 != 0), "{stamps:?}");
}

fn epoch_ms_now() -> i64 {
    let elapsed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap();
    i64::try_from(elapsed.as_millis()).unwrap()
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
