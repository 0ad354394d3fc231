//! Database schema migrations
//!
//! Versioned migrations tracked in the `schema_version` table. Each
//! migration is idempotent.
//!
//! 1. **Never modify existing migrations** - databases in the field have already run them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Use ALTER TABLE** - prefer it over DROP/CREATE to preserve history

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> = sqlx::query_scalar(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1"
    )
    .fetch_optional(pool)
    .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    Ok(())
}

/// Migration v1: transition read indexes and the append-only guard
///
/// Flow and analytics reads filter by owner or application and order by
/// time. The trigger rejects any UPDATE of a transition row; deletes are
/// still allowed so application deletion can cascade.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: status_transitions indexes and immutability trigger");

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_status_transitions_owner_time
        ON status_transitions (owner_id, occurred_at)
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_status_transitions_application_time
        ON status_transitions (application_id, occurred_at)
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_applications_owner ON applications (owner_id)")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS status_transitions_immutable
        BEFORE UPDATE ON status_transitions
        BEGIN
            SELECT RAISE(ABORT, 'status_transitions rows are immutable');
        END
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(())
}
