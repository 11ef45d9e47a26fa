use chrono::{Duration, Utc};
use lesson_core::model::{LessonId, ProgressRecord, UserId};
use storage::repository::{PROGRESS_RETENTION_DAYS, ProgressRepository};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_persists_position() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::generate();
    let record = ProgressRecord::new(LessonId::new("html-1"), 2, Utc::now());
    repo.save_progress(Some(&user), &record).await.unwrap();

    let loaded = repo
        .load_progress(Some(&user), &LessonId::new("html-1"))
        .await
        .unwrap()
        .expect("record present");
    assert_eq!(loaded.step_index, 2);
    assert_eq!(loaded.lesson_id, LessonId::new("html-1"));

    // Other lessons and other users read as absent.
    assert!(repo
        .load_progress(Some(&user), &LessonId::new("css-1"))
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .load_progress(None, &LessonId::new("html-1"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn sqlite_upsert_replaces_position() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = ProgressRecord::new(LessonId::new("l1"), 1, Utc::now());
    let second = ProgressRecord::new(LessonId::new("l1"), 5, Utc::now());
    repo.save_progress(None, &first).await.unwrap();
    repo.save_progress(None, &second).await.unwrap();

    let loaded = repo
        .load_progress(None, &LessonId::new("l1"))
        .await
        .unwrap();
    assert_eq!(loaded.map(|r| r.step_index), Some(5));
}

#[tokio::test]
async fn sqlite_expired_progress_reads_as_absent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_retention?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let stale = ProgressRecord::new(
        LessonId::new("l1"),
        3,
        Utc::now() - Duration::days(PROGRESS_RETENTION_DAYS + 1),
    );
    repo.save_progress(None, &stale).await.unwrap();

    assert!(repo
        .load_progress(None, &LessonId::new("l1"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn sqlite_malformed_row_reads_as_absent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_malformed?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    // Simulate a corrupt timestamp written by an older build.
    sqlx::query(
        "INSERT INTO lessons_progress (user_id, lesson_id, step_index, updated_at)
         VALUES ('', 'l1', 2, 'not-a-timestamp')",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    assert!(repo
        .load_progress(None, &LessonId::new("l1"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first run");
    repo.migrate().await.expect("second run");
}
