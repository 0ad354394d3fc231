//! Stage ordering and terminal classification
//!
//! The ordering lives in a `StageTable` value rather than in the `Status`
//! enum, so alternate orderings (configuration overrides, test doubles)
//! are just different tables. A `StageModel` is a validated, indexed
//! table: once constructed every lookup is total.

use crate::status::Status;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Where a status sits in the application lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageClass {
    /// Application is still in flight
    Active,
    /// Successful end of the pipeline (ACCEPTED)
    SuccessTerminal,
    /// Application left the pipeline without an accepted offer
    ExitTerminal,
}

/// One row of a stage table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEntry {
    pub status: Status,
    pub order: f64,
    pub class: StageClass,
    /// `#rrggbb`
    pub color: String,
}

/// Partial stage row from configuration
///
/// Fields left out keep the value of the row being overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOverride {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<StageClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StageOverride {
    /// The full row, if every field is given
    fn complete(&self) -> Option<StageEntry> {
        Some(StageEntry {
            status: self.status,
            order: self.order?,
            class: self.class?,
            color: self.color.clone()?,
        })
    }
}

impl From<StageEntry> for StageOverride {
    fn from(entry: StageEntry) -> Self {
        Self {
            status: entry.status,
            order: Some(entry.order),
            class: Some(entry.class),
            color: Some(entry.color),
        }
    }
}

const BUILTIN_STAGES: [(Status, f64, StageClass, &str); 15] = [
    (Status::Draft, 0.0, StageClass::Active, "#9ca3af"),
    (Status::Applied, 1.0, StageClass::Active, "#3b82f6"),
    (Status::ConfirmationReceived, 1.5, StageClass::Active, "#60a5fa"),
    (Status::UnderReview, 2.0, StageClass::Active, "#6366f1"),
    (Status::PhoneScreen, 3.0, StageClass::Active, "#8b5cf6"),
    (Status::TechnicalInterview, 4.0, StageClass::Active, "#a855f7"),
    (Status::OnsiteInterview, 5.0, StageClass::Active, "#d946ef"),
    (Status::ReferenceCheck, 6.0, StageClass::Active, "#ec4899"),
    (Status::OfferReceived, 7.0, StageClass::Active, "#f59e0b"),
    (Status::OfferNegotiating, 7.5, StageClass::Active, "#f97316"),
    (Status::Accepted, 8.0, StageClass::SuccessTerminal, "#22c55e"),
    (Status::Rejected, 9.0, StageClass::ExitTerminal, "#ef4444"),
    (Status::Withdrawn, 9.0, StageClass::ExitTerminal, "#78716c"),
    (Status::Ghosted, 9.0, StageClass::ExitTerminal, "#64748b"),
    (Status::PositionFilled, 9.0, StageClass::ExitTerminal, "#b91c1c"),
];

/// Unvalidated stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTable {
    pub entries: Vec<StageEntry>,
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN_STAGES
                .iter()
                .map(|(status, order, class, color)| StageEntry {
                    status: *status,
                    order: *order,
                    class: *class,
                    color: color.to_string(),
                })
                .collect(),
        }
    }
}

impl StageTable {
    /// Replace the row for `entry.status` (or append it if absent)
    pub fn with_override(mut self, entry: StageEntry) -> Self {
        match self.entries.iter_mut().find(|e| e.status == entry.status) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Merge a partial row into the row for `patch.status`
    ///
    /// Without an existing row, only a complete override is added; an
    /// incomplete one leaves the status missing for `StageModel::new` to
    /// report.
    pub fn with_patch(mut self, patch: StageOverride) -> Self {
        match self.entries.iter_mut().find(|e| e.status == patch.status) {
            Some(existing) => {
                if let Some(order) = patch.order {
                    existing.order = order;
                }
                if let Some(class) = patch.class {
                    existing.class = class;
                }
                if let Some(color) = patch.color {
                    existing.color = color;
                }
            }
            None => {
                if let Some(entry) = patch.complete() {
                    self.entries.push(entry);
                }
            }
        }
        self
    }

    /// Apply a list of partial overrides in order
    pub fn with_overrides(self, overrides: impl IntoIterator<Item = StageOverride>) -> Self {
        overrides.into_iter().fold(self, StageTable::with_patch)
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb` (case-insensitive)
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba()` string at the given opacity
    pub fn with_alpha(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

#[derive(Debug, Clone, Copy)]
struct StageInfo {
    order: f64,
    class: StageClass,
    color: Rgb,
}

/// Validated stage table, indexed by status
#[derive(Debug, Clone)]
pub struct StageModel {
    // Indexed by `Status as usize`; always `Status::ALL.len()` long.
    stages: Vec<StageInfo>,
    created_depth: f64,
}

impl Default for StageModel {
    fn default() -> Self {
        let stages: Vec<StageInfo> = BUILTIN_STAGES
            .iter()
            .map(|(_, order, class, color)| StageInfo {
                order: *order,
                class: *class,
                color: Rgb::parse_hex(color).unwrap_or(Rgb { r: 0, g: 0, b: 0 }),
            })
            .collect();
        Self::from_stages(stages)
    }
}

impl StageModel {
    /// Validate a stage table
    ///
    /// Fails with `Error::Config` if any status is missing or listed twice,
    /// an order is not finite, a color is not `#rrggbb`, or the success
    /// class is assigned to anything other than ACCEPTED.
    pub fn new(table: &StageTable) -> Result<Self> {
        let mut slots: Vec<Option<StageInfo>> = vec![None; Status::ALL.len()];

        for entry in &table.entries {
            let slot = &mut slots[entry.status as usize];
            if slot.is_some() {
                return Err(Error::Config(format!(
                    "Stage table lists {} more than once",
                    entry.status
                )));
            }
            if !entry.order.is_finite() {
                return Err(Error::Config(format!(
                    "Stage order for {} is not a finite number",
                    entry.status
                )));
            }
            let is_accepted = entry.status == Status::Accepted;
            if is_accepted != (entry.class == StageClass::SuccessTerminal) {
                return Err(Error::Config(format!(
                    "{} cannot have class {:?}; only ACCEPTED is success-terminal",
                    entry.status, entry.class
                )));
            }
            let color = Rgb::parse_hex(&entry.color).ok_or_else(|| {
                Error::Config(format!(
                    "Color for {} must be #rrggbb, got {:?}",
                    entry.status, entry.color
                ))
            })?;
            *slot = Some(StageInfo {
                order: entry.order,
                class: entry.class,
                color,
            });
        }

        let mut stages = Vec::with_capacity(slots.len());
        for (status, slot) in Status::ALL.iter().zip(slots) {
            match slot {
                Some(info) => stages.push(info),
                None => {
                    return Err(Error::Config(format!(
                        "Stage table has no entry for {}",
                        status
                    )))
                }
            }
        }

        Ok(Self::from_stages(stages))
    }

    fn from_stages(stages: Vec<StageInfo>) -> Self {
        let lowest = stages
            .iter()
            .map(|s| s.order)
            .fold(f64::INFINITY, f64::min);
        Self {
            stages,
            created_depth: lowest - 1.0,
        }
    }

    fn info(&self, status: Status) -> &StageInfo {
        &self.stages[status as usize]
    }

    pub fn stage_order(&self, status: Status) -> f64 {
        self.info(status).order
    }

    pub fn class(&self, status: Status) -> StageClass {
        self.info(status).class
    }

    /// True for both success- and exit-terminal statuses
    pub fn is_terminal(&self, status: Status) -> bool {
        self.class(status) != StageClass::Active
    }

    pub fn is_success_terminal(&self, status: Status) -> bool {
        self.class(status) == StageClass::SuccessTerminal
    }

    pub fn is_exit_terminal(&self, status: Status) -> bool {
        self.class(status) == StageClass::ExitTerminal
    }

    pub fn color(&self, status: Status) -> Rgb {
        self.info(status).color
    }

    /// Reserved depth of the CREATED intake node, below every real stage
    pub fn created_depth(&self) -> f64 {
        self.created_depth
    }

    /// Statuses sorted by stage order, ties in declaration order
    pub fn ordered_statuses(&self) -> Vec<Status> {
        let mut statuses = Status::ALL.to_vec();
        statuses.sort_by(|a, b| self.stage_order(*a).total_cmp(&self.stage_order(*b)));
        statuses
    }
}
