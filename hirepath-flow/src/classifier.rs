//! Progression classification
//!
//! Rules, first match wins:
//! 1. Moving into an exit-terminal status is never a progression.
//! 2. Moving into ACCEPTED is always a progression.
//! 3. Otherwise it is a progression iff the target's stage order is
//!    strictly greater than the source's. A missing source (application
//!    intake) sits at the CREATED depth, below every stage.

use hirepath_common::{StageModel, Status};
use serde::Serialize;
use std::sync::Arc;

/// Direction of a single status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Forward movement, including acceptance
    Progression,
    /// Same stage order (re-applied status or co-equal sub-stage)
    Lateral,
    /// Lower stage order, e.g. a manual correction
    Regression,
    /// Left the pipeline (rejected, withdrawn, ghosted, position filled)
    Exit,
}

#[derive(Debug, Clone)]
pub struct ProgressionClassifier {
    model: Arc<StageModel>,
}

impl ProgressionClassifier {
    pub fn new(model: Arc<StageModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &StageModel {
        &self.model
    }

    pub fn classify(&self, from: Option<Status>, to: Status) -> TransitionKind {
        if self.model.is_exit_terminal(to) {
            return TransitionKind::Exit;
        }
        if self.model.is_success_terminal(to) {
            return TransitionKind::Progression;
        }

        let from_order = from.map_or(self.model.created_depth(), |s| self.model.stage_order(s));
        let to_order = self.model.stage_order(to);

        if to_order > from_order {
            TransitionKind::Progression
        } else if to_order == from_order {
            TransitionKind::Lateral
        } else {
            TransitionKind::Regression
        }
    }

    pub fn is_progression(&self, from: Option<Status>, to: Status) -> bool {
        self.classify(from, to) == TransitionKind::Progression
    }
}
