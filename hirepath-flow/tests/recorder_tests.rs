//! Transition recorder against an in-memory database

use chrono::{DateTime, Duration, TimeZone, Utc};
use hirepath_common::db::init_memory_database;
use hirepath_common::stage_model::{StageClass, StageEntry, StageTable};
use hirepath_common::{Error, StageModel, Status};
use hirepath_flow::db::{applications, transitions};
use hirepath_flow::TransitionRecorder;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

fn t(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap() + Duration::days(day)
}

async fn setup() -> (SqlitePool, TransitionRecorder) {
    let pool = init_memory_database().await.unwrap();
    let recorder = TransitionRecorder::new(pool.clone(), Arc::new(StageModel::default()));
    (pool, recorder)
}

async fn transition_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM status_transitions")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_application_records_initial_transition() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();

    let (application, record) = recorder.create_application(owner, Status::Applied, t(0)).await.unwrap();

    assert_eq!(record.application_id, application.id);
    assert_eq!(record.owner_id, owner);
    assert_eq!(record.from_status, None);
    assert_eq!(record.to_status, Status::Applied);
    assert!(record.is_progression);
    assert_eq!(record.stage_order, 1.0);

    let stored = transitions::list_for_application(&pool, application.id).await.unwrap();
    assert_eq!(stored, vec![record]);
}

#[tokio::test]
async fn test_change_status_updates_application_and_log() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::Applied, t(0)).await.unwrap();

    let record = recorder
        .change_status(application.id, owner, Status::PhoneScreen, t(2))
        .await
        .unwrap()
        .expect("status changed");

    assert_eq!(record.from_status, Some(Status::Applied));
    assert_eq!(record.to_status, Status::PhoneScreen);
    assert!(record.is_progression);
    assert_eq!(record.stage_order, 3.0);

    let mut conn = pool.acquire().await.unwrap();
    let current = applications::fetch_application(&mut conn, application.id).await.unwrap().unwrap();
    assert_eq!(current.status, Status::PhoneScreen);
    assert_eq!(current.updated_at, t(2));
}

#[tokio::test]
async fn test_change_to_same_status_is_skipped() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::UnderReview, t(0)).await.unwrap();

    let result = recorder
        .change_status(application.id, owner, Status::UnderReview, t(1))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(transition_count(&pool).await, 1);
}

#[tokio::test]
async fn test_rejection_recorded_as_non_progression() {
    let (_pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::OnsiteInterview, t(0)).await.unwrap();

    let record = recorder
        .change_status(application.id, owner, Status::Rejected, t(3))
        .await
        .unwrap()
        .unwrap();
    assert!(!record.is_progression);
}

#[tokio::test]
async fn test_missing_application_is_not_found() {
    let (pool, recorder) = setup().await;

    let err = recorder
        .record(Uuid::new_v4(), Uuid::new_v4(), Some(Status::Applied), Status::PhoneScreen, t(1))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(transition_count(&pool).await, 0);
}

#[tokio::test]
async fn test_foreign_owner_is_unauthorized_and_writes_nothing() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::Applied, t(0)).await.unwrap();

    let err = recorder
        .change_status(application.id, intruder, Status::PhoneScreen, t(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    let err = recorder
        .record(application.id, intruder, Some(Status::Applied), Status::PhoneScreen, t(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    assert_eq!(transition_count(&pool).await, 1);
    let mut conn = pool.acquire().await.unwrap();
    let current = applications::fetch_application(&mut conn, application.id).await.unwrap().unwrap();
    assert_eq!(current.status, Status::Applied);
}

#[tokio::test]
async fn test_stale_from_status_rejected() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::Applied, t(0)).await.unwrap();

    let err = recorder
        .record(application.id, owner, Some(Status::UnderReview), Status::PhoneScreen, t(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = recorder
        .record(application.id, owner, None, Status::PhoneScreen, t(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    assert_eq!(transition_count(&pool).await, 1);
}

#[tokio::test]
async fn test_record_with_explicit_from() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::UnderReview, t(0)).await.unwrap();

    let record = recorder
        .record(application.id, owner, Some(Status::UnderReview), Status::Applied, t(1))
        .await
        .unwrap();
    assert!(!record.is_progression);

    let stored = transitions::list_for_application(&pool, application.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1], record);
}

#[tokio::test]
async fn test_record_in_rolls_back_with_caller_transaction() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::Applied, t(0)).await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    applications::update_status(&mut tx, application.id, Status::PhoneScreen, t(1))
        .await
        .unwrap();
    recorder
        .record_in(&mut tx, application.id, owner, Some(Status::Applied), Status::PhoneScreen, t(1))
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(transition_count(&pool).await, 1);
    let mut conn = pool.acquire().await.unwrap();
    let current = applications::fetch_application(&mut conn, application.id).await.unwrap().unwrap();
    assert_eq!(current.status, Status::Applied);
}

#[tokio::test]
async fn test_snapshot_fields_survive_stage_table_change() {
    let pool = init_memory_database().await.unwrap();
    let owner = Uuid::new_v4();

    let original = TransitionRecorder::new(pool.clone(), Arc::new(StageModel::default()));
    let (application, _) = original.create_application(owner, Status::Applied, t(0)).await.unwrap();
    let first = original
        .change_status(application.id, owner, Status::UnderReview, t(1))
        .await
        .unwrap()
        .unwrap();

    // UNDER_REVIEW moves below APPLIED in the new ordering
    let reordered = StageTable::default().with_override(StageEntry {
        status: Status::UnderReview,
        order: 0.5,
        class: StageClass::Active,
        color: "#6366f1".to_string(),
    });
    let updated = TransitionRecorder::new(pool.clone(), Arc::new(StageModel::new(&reordered).unwrap()));
    let second = updated
        .change_status(application.id, owner, Status::Applied, t(2))
        .await
        .unwrap()
        .unwrap();
    assert!(second.is_progression);

    let stored = transitions::list_for_application(&pool, application.id).await.unwrap();
    assert_eq!(stored[1], first);
    assert!(stored[1].is_progression);
    assert_eq!(stored[1].stage_order, 2.0);
}

#[tokio::test]
async fn test_delete_application_cascades() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::Applied, t(0)).await.unwrap();
    recorder
        .change_status(application.id, owner, Status::Ghosted, t(30))
        .await
        .unwrap();

    let err = recorder.delete_application(application.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    assert_eq!(transition_count(&pool).await, 2);

    recorder.delete_application(application.id, owner).await.unwrap();
    assert_eq!(transition_count(&pool).await, 0);
}

#[tokio::test]
async fn test_same_timestamp_keeps_insertion_order() {
    let (pool, recorder) = setup().await;
    let owner = Uuid::new_v4();
    let (application, _) = recorder.create_application(owner, Status::Applied, t(0)).await.unwrap();
    recorder.change_status(application.id, owner, Status::UnderReview, t(1)).await.unwrap();
    recorder.change_status(application.id, owner, Status::PhoneScreen, t(1)).await.unwrap();

    let stored = transitions::list_for_application(&pool, application.id).await.unwrap();
    let targets: Vec<Status> = stored.iter().map(|r| r.to_status).collect();
    assert_eq!(targets, vec![Status::Applied, Status::UnderReview, Status::PhoneScreen]);
}
