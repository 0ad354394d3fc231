//! Transition recording
//!
//! Every status change of an application is written as one immutable
//! `TransitionRecord`, in the same transaction as the status update it
//! documents. The progression flag and stage order are computed here, at
//! write time, and never recomputed afterwards.

use chrono::{DateTime, Utc};
use hirepath_common::{uuid_utils, Application, Error, Result, StageModel, Status, TransitionRecord};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use uuid::Uuid;

use crate::classifier::ProgressionClassifier;
use crate::db::{applications, transitions};

/// Transition Recorder
pub struct TransitionRecorder {
    db: SqlitePool,
    classifier: ProgressionClassifier,
}

impl TransitionRecorder {
    /// Create new transition recorder
    pub fn new(db: SqlitePool, model: Arc<StageModel>) -> Self {
        Self {
            db,
            classifier: ProgressionClassifier::new(model),
        }
    }

    pub fn classifier(&self) -> &ProgressionClassifier {
        &self.classifier
    }

    /// Start a write transaction holding the database write lock
    ///
    /// Concurrent writers wait on the busy timeout here, before any read.
    /// A deferred read-then-write transaction would fail with SQLITE_BUSY.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.db.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Build the record for a status change without persisting it
    pub fn snapshot(
        &self,
        application_id: Uuid,
        owner_id: Uuid,
        from: Option<Status>,
        to: Status,
        occurred_at: DateTime<Utc>,
    ) -> TransitionRecord {
        TransitionRecord {
            id: uuid_utils::generate(),
            application_id,
            owner_id,
            from_status: from,
            to_status: to,
            occurred_at,
            is_progression: self.classifier.is_progression(from, to),
            stage_order: self.classifier.model().stage_order(to),
        }
    }

    /// Append a transition inside the caller's transaction
    ///
    /// For callers that update the application's status themselves. The
    /// ownership check runs in the same transaction; on error nothing is
    /// written and the caller should roll back.
    pub async fn record_in(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        application_id: Uuid,
        owner_id: Uuid,
        from: Option<Status>,
        to: Status,
        occurred_at: DateTime<Utc>,
    ) -> Result<TransitionRecord> {
        applications::load_owned(&mut **tx, application_id, owner_id).await?;

        let record = self.snapshot(application_id, owner_id, from, to, occurred_at);
        transitions::insert_transition(&mut **tx, &record).await?;

        tracing::debug!(
            application_id = %application_id,
            from = ?from,
            to = %to,
            kind = ?self.classifier.classify(from, to),
            "Recorded status transition"
        );

        Ok(record)
    }

    /// Record a status change and apply it to the application atomically
    ///
    /// `from` must match the application's current status; `None` is only
    /// accepted for an application with no transitions yet. Same-status
    /// changes are recorded as given: skipping no-op updates is the
    /// caller's job (see [`TransitionRecorder::change_status`]).
    pub async fn record(
        &self,
        application_id: Uuid,
        owner_id: Uuid,
        from: Option<Status>,
        to: Status,
        occurred_at: DateTime<Utc>,
    ) -> Result<TransitionRecord> {
        let mut tx = self.begin_write().await?;

        let application = applications::load_owned(&mut *tx, application_id, owner_id).await?;
        match from {
            Some(previous) => {
                if previous != application.status {
                    return Err(Error::InvalidInput(format!(
                        "Application {} is {}, not {}",
                        application_id, application.status, previous
                    )));
                }
            }
            None => {
                if transitions::count_for_application(&mut *tx, application_id).await? > 0 {
                    return Err(Error::InvalidInput(format!(
                        "Application {} already has an initial transition",
                        application_id
                    )));
                }
            }
        }

        applications::update_status(&mut *tx, application_id, to, occurred_at).await?;
        let record = self
            .record_in(&mut tx, application_id, owner_id, from, to, occurred_at)
            .await?;

        tx.commit().await?;

        tracing::info!(
            application_id = %application_id,
            from = ?from,
            to = %to,
            is_progression = record.is_progression,
            "Status transition committed"
        );

        Ok(record)
    }

    /// Create an application together with its initial transition
    pub async fn create_application(
        &self,
        owner_id: Uuid,
        initial_status: Status,
        created_at: DateTime<Utc>,
    ) -> Result<(Application, TransitionRecord)> {
        let application = Application {
            id: uuid_utils::generate(),
            owner_id,
            status: initial_status,
            created_at,
            updated_at: created_at,
        };

        let mut tx = self.begin_write().await?;
        applications::insert_application(&mut *tx, &application).await?;
        let record = self
            .record_in(&mut tx, application.id, owner_id, None, initial_status, created_at)
            .await?;
        tx.commit().await?;

        tracing::info!(
            application_id = %application.id,
            owner_id = %owner_id,
            status = %initial_status,
            "Application created"
        );

        Ok((application, record))
    }

    /// Move an application to `new_status`
    ///
    /// Reads the current status inside the transaction. Returns `None` and
    /// writes nothing when the status is unchanged.
    pub async fn change_status(
        &self,
        application_id: Uuid,
        owner_id: Uuid,
        new_status: Status,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<TransitionRecord>> {
        let mut tx = self.begin_write().await?;

        let application = applications::load_owned(&mut *tx, application_id, owner_id).await?;
        if application.status == new_status {
            tracing::debug!(
                application_id = %application_id,
                status = %new_status,
                "Status unchanged, no transition recorded"
            );
            return Ok(None);
        }

        applications::update_status(&mut *tx, application_id, new_status, occurred_at).await?;
        let record = self
            .record_in(
                &mut tx,
                application_id,
                owner_id,
                Some(application.status),
                new_status,
                occurred_at,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            application_id = %application_id,
            from = %application.status,
            to = %new_status,
            is_progression = record.is_progression,
            "Status changed"
        );

        Ok(Some(record))
    }

    /// Delete an application and, by cascade, its transition history
    pub async fn delete_application(&self, application_id: Uuid, owner_id: Uuid) -> Result<()> {
        let mut tx = self.begin_write().await?;
        applications::load_owned(&mut *tx, application_id, owner_id).await?;
        applications::delete_application(&mut *tx, application_id).await?;
        tx.commit().await?;

        tracing::info!(application_id = %application_id, "Application deleted");
        Ok(())
    }
}
