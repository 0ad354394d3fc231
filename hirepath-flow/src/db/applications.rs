//! Applications table access
//!
//! Only the columns the flow engine reads or writes. Functions taking a
//! `SqliteConnection` are meant to run inside the caller's transaction.

use chrono::{DateTime, Utc};
use hirepath_common::{time, uuid_utils, Application, Error, Result, Status};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

type ApplicationRow = (String, String, String, String, String);

fn from_row(row: ApplicationRow) -> Result<Application> {
    let (guid, owner_id, status, created_at, updated_at) = row;
    Ok(Application {
        id: uuid_utils::parse_stored(&guid)?,
        owner_id: uuid_utils::parse_stored(&owner_id)?,
        status: status
            .parse::<Status>()
            .map_err(|_| Error::Internal(format!("Application {} has unknown status {:?}", guid, status)))?,
        created_at: time::from_storage(&created_at)?,
        updated_at: time::from_storage(&updated_at)?,
    })
}

pub async fn insert_application(conn: &mut SqliteConnection, application: &Application) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO applications (guid, owner_id, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(application.id.to_string())
    .bind(application.owner_id.to_string())
    .bind(application.status.as_str())
    .bind(time::to_storage(application.created_at))
    .bind(time::to_storage(application.updated_at))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn fetch_application(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Application>> {
    let row: Option<ApplicationRow> = sqlx::query_as(
        "SELECT guid, owner_id, status, created_at, updated_at FROM applications WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(from_row).transpose()
}

/// Fetch an application the caller owns
///
/// `NotFound` if it doesn't exist, `Unauthorized` if it belongs to
/// someone else.
pub async fn load_owned(conn: &mut SqliteConnection, id: Uuid, owner_id: Uuid) -> Result<Application> {
    let application = fetch_application(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Application {}", id)))?;

    if application.owner_id != owner_id {
        return Err(Error::Unauthorized(format!(
            "Application {} does not belong to owner {}",
            id, owner_id
        )));
    }

    Ok(application)
}

pub async fn update_status(
    conn: &mut SqliteConnection,
    id: Uuid,
    status: Status,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE guid = ?")
        .bind(status.as_str())
        .bind(time::to_storage(updated_at))
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Delete an application; its transitions go with it (ON DELETE CASCADE)
pub async fn delete_application(conn: &mut SqliteConnection, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM applications WHERE guid = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn list_for_owner(db: &SqlitePool, owner_id: Uuid) -> Result<Vec<Application>> {
    let rows: Vec<ApplicationRow> = sqlx::query_as(
        r#"
        SELECT guid, owner_id, status, created_at, updated_at
        FROM applications
        WHERE owner_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(owner_id.to_string())
    .fetch_all(db)
    .await?;

    rows.into_iter().map(from_row).collect()
}
