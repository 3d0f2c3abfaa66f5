use super::*;

async fn roundtrip_entries(store: &dyn KeyValueStore) {
    assert_eq!(store.get(TOKEN_KEY).await.expect("get"), None);

    store.set(TOKEN_KEY, "abc").await.expect("set");
    store.set(TOKEN_KEY, "def").await.expect("overwrite");
    assert_eq!(
        store.get(TOKEN_KEY).await.expect("get"),
        Some("def".to_string())
    );

    store.remove(TOKEN_KEY).await.expect("remove");
    store.remove(TOKEN_KEY).await.expect("remove twice");
    assert_eq!(store.get(TOKEN_KEY).await.expect("get"), None);
}

#[tokio::test]
async fn memory_store_sets_overwrites_and_removes() {
    let store = MemoryStore::new();
    roundtrip_entries(&store).await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn sqlite_store_sets_overwrites_and_removes() {
    let store = SqliteStore::new("sqlite::memory:").await.expect("db");
    roundtrip_entries(&store).await;
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = SqliteStore::new("sqlite::memory:").await.expect("db");
    store.health_check().await.expect("health check");
}

#[tokio::test]
async fn removing_one_key_keeps_the_other() {
    let store = SqliteStore::new("sqlite::memory:").await.expect("db");
    store.set(TOKEN_KEY, "t").await.expect("token");
    store.set(USER_KEY, r#"{"id":1}"#).await.expect("user");

    store.remove(TOKEN_KEY).await.expect("remove");

    assert_eq!(store.get(TOKEN_KEY).await.expect("get"), None);
    assert_eq!(
        store.get(USER_KEY).await.expect("get"),
        Some(r#"{"id":1}"#.to_string())
    );
}

#[tokio::test]
async fn entries_survive_reopening_the_database_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("session.db");
    let database_url = sqlite_url_for_path(&db_path.to_string_lossy());

    {
        let store = SqliteStore::new(&database_url).await.expect("db");
        store.set(TOKEN_KEY, "persisted").await.expect("set");
        store.pool().close().await;
    }

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = SqliteStore::new(&database_url).await.expect("reopen");
    assert_eq!(
        reopened.get(TOKEN_KEY).await.expect("get"),
        Some("persisted".to_string())
    );
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        sqlite_url_for_path("./data/session.db"),
        "sqlite://./data/session.db"
    );
    assert_eq!(
        sqlite_url_for_path("sqlite::memory:"),
        "sqlite::memory:"
    );
}

#[test]
fn memory_urls_have_no_backing_path() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/session.db?mode=rwc"),
        Some(PathBuf::from("./data/session.db"))
    );
}
