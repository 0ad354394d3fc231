//! Transition log and application records

use crate::status::{FlowSource, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One observed status change of one application
///
/// Immutable once written. `is_progression` and `stage_order` are the
/// values computed when the change happened; readers must use them as-is
/// rather than re-deriving them from the current stage table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    pub id: Uuid,
    pub application_id: Uuid,
    pub owner_id: Uuid,
    /// `None` only for the transition that created the application
    pub from_status: Option<Status>,
    pub to_status: Status,
    pub occurred_at: DateTime<Utc>,
    pub is_progression: bool,
    /// Stage order of `to_status` at write time
    pub stage_order: f64,
}

impl TransitionRecord {
    /// Flow graph source node of this transition
    pub fn source(&self) -> FlowSource {
        FlowSource::from_previous(self.from_status)
    }

    pub fn is_initial(&self) -> bool {
        self.from_status.is_none()
    }
}

/// Flow-relevant view of a tracked application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
