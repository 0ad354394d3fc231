//! status_transitions table access
//!
//! Rows are append-only; there is no update function.
//! Reads come back ordered by `occurred_at`, then insertion order.

use hirepath_common::{time, uuid_utils, Error, Result, Status, TransitionRecord};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

type TransitionRow = (String, String, String, Option<String>, String, String, bool, f64);

const SELECT_COLUMNS: &str = "SELECT guid, application_id, owner_id, from_status, to_status, \
     occurred_at, is_progression, stage_order FROM status_transitions";

fn parse_status(guid: &str, raw: &str) -> Result<Status> {
    raw.parse()
        .map_err(|_| Error::Internal(format!("Transition {} has unknown status {:?}", guid, raw)))
}

fn from_row(row: TransitionRow) -> Result<TransitionRecord> {
    let (guid, application_id, owner_id, from_status, to_status, occurred_at, is_progression, stage_order) =
        row;
    Ok(TransitionRecord {
        id: uuid_utils::parse_stored(&guid)?,
        application_id: uuid_utils::parse_stored(&application_id)?,
        owner_id: uuid_utils::parse_stored(&owner_id)?,
        from_status: from_status.as_deref().map(|s| parse_status(&guid, s)).transpose()?,
        to_status: parse_status(&guid, &to_status)?,
        occurred_at: time::from_storage(&occurred_at)?,
        is_progression,
        stage_order,
    })
}

pub async fn insert_transition(conn: &mut SqliteConnection, record: &TransitionRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO status_transitions (
            guid, application_id, owner_id, from_status, to_status,
            occurred_at, is_progression, stage_order
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.application_id.to_string())
    .bind(record.owner_id.to_string())
    .bind(record.from_status.map(|s| s.as_str()))
    .bind(record.to_status.as_str())
    .bind(time::to_storage(record.occurred_at))
    .bind(record.is_progression)
    .bind(record.stage_order)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn count_for_application(conn: &mut SqliteConnection, application_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM status_transitions WHERE application_id = ?")
        .bind(application_id.to_string())
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

pub async fn list_for_owner(db: &SqlitePool, owner_id: Uuid) -> Result<Vec<TransitionRecord>> {
    let sql = format!("{} WHERE owner_id = ? ORDER BY occurred_at, rowid", SELECT_COLUMNS);
    let rows: Vec<TransitionRow> = sqlx::query_as(&sql)
        .bind(owner_id.to_string())
        .fetch_all(db)
        .await?;

    rows.into_iter().map(from_row).collect()
}

pub async fn list_for_application(db: &SqlitePool, application_id: Uuid) -> Result<Vec<TransitionRecord>> {
    let sql = format!("{} WHERE application_id = ? ORDER BY occurred_at, rowid", SELECT_COLUMNS);
    let rows: Vec<TransitionRow> = sqlx::query_as(&sql)
        .bind(application_id.to_string())
        .fetch_all(db)
        .await?;

    rows.into_iter().map(from_row).collect()
}

pub async fn list_for_applications(db: &SqlitePool, application_ids: &[Uuid]) -> Result<Vec<TransitionRecord>> {
    if application_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; application_ids.len()].join(", ");
    let sql = format!(
        "{} WHERE application_id IN ({}) ORDER BY occurred_at, rowid",
        SELECT_COLUMNS, placeholders
    );

    let mut query = sqlx::query_as::<_, TransitionRow>(&sql);
    for id in application_ids {
        query = query.bind(id.to_string());
    }
    let rows = query.fetch_all(db).await?;

    rows.into_iter().map(from_row).collect()
}
