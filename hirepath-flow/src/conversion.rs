//! Conversion and hiring analytics
//!
//! Works on per-application transition histories. Progression comes from
//! the `is_progression` snapshot on each record, never from the current
//! stage table; the stage table is only used to order the output.

use chrono::{DateTime, Utc};
use hirepath_common::{time, StageModel, Status, TransitionRecord};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// All transitions of one application, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationHistory {
    pub application_id: Uuid,
    pub records: Vec<TransitionRecord>,
}

impl ApplicationHistory {
    /// Most recent record; later input position wins on equal timestamps
    pub fn latest(&self) -> Option<&TransitionRecord> {
        self.records.iter().reduce(|latest, r| {
            if r.occurred_at >= latest.occurred_at {
                r
            } else {
                latest
            }
        })
    }

    pub fn final_status(&self) -> Option<Status> {
        self.latest().map(|r| r.to_status)
    }

    /// Time of the initial (no previous status) record, else the earliest record
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.records
            .iter()
            .find(|r| r.is_initial())
            .or_else(|| self.records.iter().min_by_key(|r| r.occurred_at))
            .map(|r| r.occurred_at)
    }

    /// Every status the application was ever in
    pub fn reached_stages(&self) -> BTreeSet<Status> {
        self.records
            .iter()
            .flat_map(|r| r.from_status.into_iter().chain(std::iter::once(r.to_status)))
            .collect()
    }
}

/// Split records per application, keeping first-seen application order
///
/// Each history is sorted by `occurred_at` (stable, so equal timestamps
/// keep their input order).
pub fn group_by_application<I>(records: I) -> Vec<ApplicationHistory>
where
    I: IntoIterator<Item = TransitionRecord>,
{
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut histories: Vec<ApplicationHistory> = Vec::new();

    for record in records {
        let slot = *index.entry(record.application_id).or_insert_with(|| {
            histories.push(ApplicationHistory {
                application_id: record.application_id,
                records: Vec::new(),
            });
            histories.len() - 1
        });
        histories[slot].records.push(record);
    }

    for history in &mut histories {
        history.records.sort_by_key(|r| r.occurred_at);
    }

    histories
}

/// Percentage of `part` in `whole`; 0 when `whole` is 0
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStat {
    pub stage: Status,
    pub applications_at_stage: u64,
    pub progressed_to_next: u64,
    pub dropped_off: u64,
    /// Percent, 0..=100
    pub conversion_rate: f64,
}

impl ConversionStat {
    pub fn new(stage: Status, applications_at_stage: u64, progressed_to_next: u64) -> Self {
        Self {
            stage,
            applications_at_stage,
            progressed_to_next,
            dropped_off: applications_at_stage.saturating_sub(progressed_to_next),
            conversion_rate: percentage(progressed_to_next, applications_at_stage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiringSummary {
    pub total_applications: u64,
    pub total_hired: u64,
    /// Percent, 0..=100
    pub hiring_rate: f64,
    /// 0 when nobody was hired
    pub average_time_to_hire_days: f64,
    pub most_common_drop_off_stage: Option<Status>,
}

#[derive(Debug, Clone)]
pub struct ConversionAnalyzer {
    model: Arc<StageModel>,
}

impl ConversionAnalyzer {
    pub fn new(model: Arc<StageModel>) -> Self {
        Self { model }
    }

    /// Per-stage reach and progression, for every stage any application reached
    ///
    /// Ordered by stage order, ties in status declaration order.
    pub fn analyze(&self, histories: &[ApplicationHistory]) -> Vec<ConversionStat> {
        let mut reached: HashMap<Status, u64> = HashMap::new();
        let mut progressed: HashMap<Status, u64> = HashMap::new();

        for history in histories {
            for stage in history.reached_stages() {
                *reached.entry(stage).or_insert(0) += 1;
            }

            let moved_on: HashSet<Status> = history
                .records
                .iter()
                .filter(|r| r.is_progression)
                .filter_map(|r| r.from_status)
                .collect();
            for stage in moved_on {
                *progressed.entry(stage).or_insert(0) += 1;
            }
        }

        self.model
            .ordered_statuses()
            .into_iter()
            .filter_map(|stage| {
                reached.get(&stage).map(|&at_stage| {
                    ConversionStat::new(stage, at_stage, progressed.get(&stage).copied().unwrap_or(0))
                })
            })
            .collect()
    }

    pub fn hiring_summary(&self, histories: &[ApplicationHistory]) -> HiringSummary {
        let mut total_applications = 0u64;
        let mut total_hired = 0u64;
        let mut days_to_hire_sum = 0.0;
        // Insertion-ordered so ties go to the first status encountered
        let mut drop_offs: Vec<(Status, u64)> = Vec::new();

        for history in histories {
            let Some(final_status) = history.final_status() else {
                continue;
            };
            total_applications += 1;

            if self.model.is_success_terminal(final_status) {
                total_hired += 1;
                let hired_at = history
                    .records
                    .iter()
                    .filter(|r| r.to_status == final_status)
                    .map(|r| r.occurred_at)
                    .max();
                if let (Some(created_at), Some(hired_at)) = (history.created_at(), hired_at) {
                    days_to_hire_sum += time::days_between(created_at, hired_at);
                }
            } else if self.model.is_exit_terminal(final_status) {
                match drop_offs.iter_mut().find(|(status, _)| *status == final_status) {
                    Some((_, count)) => *count += 1,
                    None => drop_offs.push((final_status, 1)),
                }
            }
        }

        let mut most_common_drop_off_stage = None;
        let mut best = 0;
        for (status, count) in drop_offs {
            if count > best {
                best = count;
                most_common_drop_off_stage = Some(status);
            }
        }

        HiringSummary {
            total_applications,
            total_hired,
            hiring_rate: percentage(total_hired, total_applications),
            average_time_to_hire_days: if total_hired == 0 {
                0.0
            } else {
                days_to_hire_sum / total_hired as f64
            },
            most_common_drop_off_stage,
        }
    }
}
