use feelability_core::db::migrations::latest_version;
use feelability_core::db::{open_cache_db, open_cache_db_in_memory};
use rusqlite::Connection;

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn fresh_database_lands_on_the_latest_version() {
    let conn = open_cache_db_in_memory().unwrap();
    assert_eq!(user_version(&conn), latest_version());

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM cache_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn reopening_an_existing_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.sqlite3");

    {
        let conn = open_cache_db(&path).unwrap();
        conn.execute(
            "INSERT INTO cache_entries (scope, key, value) VALUES ('u:test', 'k', 'v');",
            [],
        )
        .unwrap();
    }

    let conn = open_cache_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    let value: String = conn
        .query_row(
            "SELECT value FROM cache_entries WHERE scope = 'u:test' AND key = 'k';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "v");
}

#[test]
fn newer_schema_versions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.sqlite3");

    {
        let conn = open_cache_db(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
    }

    let err = open_cache_db(&path).unwrap_err();
    assert!(err.to_string().contains("newer than supported"));
}
