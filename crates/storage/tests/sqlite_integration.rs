use chrono::Duration;
use quiz_core::time::fixed_now;
use storage::repository::{KeyValueRepository, Storage, StoredValue};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrips_integers_and_timestamps() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get_value("gamesCount").await.unwrap(), None);

    repo.put_values(&[
        ("gamesCount", StoredValue::Integer(2)),
        ("bestDate", StoredValue::Timestamp(fixed_now())),
    ])
    .await
    .expect("put");

    assert_eq!(
        repo.get_value("gamesCount").await.unwrap(),
        Some(StoredValue::Integer(2))
    );
    assert_eq!(
        repo.get_value("bestDate").await.unwrap(),
        Some(StoredValue::Timestamp(fixed_now()))
    );
}

#[tokio::test]
async fn sqlite_overwrites_and_switches_value_kind() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.put_values(&[("bestDate", StoredValue::Integer(1))])
        .await
        .unwrap();
    let later = fixed_now() + Duration::hours(3);
    repo.put_values(&[("bestDate", StoredValue::Timestamp(later))])
        .await
        .unwrap();

    assert_eq!(
        repo.get_value("bestDate").await.unwrap(),
        Some(StoredValue::Timestamp(later))
    );
}

#[tokio::test]
async fn sqlite_remove_values_clears_keys() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_remove?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.put_values(&[
        ("totalCorrect", StoredValue::Integer(5)),
        ("totalQuestions", StoredValue::Integer(10)),
    ])
    .await
    .unwrap();
    repo.remove_values(&["totalCorrect", "totalQuestions", "missing"])
        .await
        .unwrap();

    assert_eq!(repo.get_value("totalCorrect").await.unwrap(), None);
    assert_eq!(repo.get_value("totalQuestions").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn storage_sqlite_builds_migrated_backend() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .values
        .put_values(&[("gamesCount", StoredValue::Integer(1))])
        .await
        .unwrap();
    assert_eq!(
        storage.values.get_value("gamesCount").await.unwrap(),
        Some(StoredValue::Integer(1))
    );
}
