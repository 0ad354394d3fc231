//! Application status types
//!
//! `Status` is the closed set of stages an application can be in.
//! `FlowSource` adds the synthetic `CREATED` intake node used as the
//! source of an application's first transition.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Application status
///
/// Variant order is declaration order, which is also the tie-breaker
/// wherever two statuses share a stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Draft,
    Applied,
    ConfirmationReceived,
    UnderReview,
    PhoneScreen,
    TechnicalInterview,
    OnsiteInterview,
    ReferenceCheck,
    OfferReceived,
    OfferNegotiating,
    Accepted,
    Rejected,
    Withdrawn,
    Ghosted,
    PositionFilled,
}

impl Status {
    /// Every status, in declaration order
    pub const ALL: [Status; 15] = [
        Status::Draft,
        Status::Applied,
        Status::ConfirmationReceived,
        Status::UnderReview,
        Status::PhoneScreen,
        Status::TechnicalInterview,
        Status::OnsiteInterview,
        Status::ReferenceCheck,
        Status::OfferReceived,
        Status::OfferNegotiating,
        Status::Accepted,
        Status::Rejected,
        Status::Withdrawn,
        Status::Ghosted,
        Status::PositionFilled,
    ];

    /// Stored / serialized name (e.g. `PHONE_SCREEN`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "DRAFT",
            Status::Applied => "APPLIED",
            Status::ConfirmationReceived => "CONFIRMATION_RECEIVED",
            Status::UnderReview => "UNDER_REVIEW",
            Status::PhoneScreen => "PHONE_SCREEN",
            Status::TechnicalInterview => "TECHNICAL_INTERVIEW",
            Status::OnsiteInterview => "ONSITE_INTERVIEW",
            Status::ReferenceCheck => "REFERENCE_CHECK",
            Status::OfferReceived => "OFFER_RECEIVED",
            Status::OfferNegotiating => "OFFER_NEGOTIATING",
            Status::Accepted => "ACCEPTED",
            Status::Rejected => "REJECTED",
            Status::Withdrawn => "WITHDRAWN",
            Status::Ghosted => "GHOSTED",
            Status::PositionFilled => "POSITION_FILLED",
        }
    }

    /// Human-readable label for charts and tables
    pub fn display_name(&self) -> &'static str {
        match self {
            Status::Draft => "Draft",
            Status::Applied => "Applied",
            Status::ConfirmationReceived => "Confirmation Received",
            Status::UnderReview => "Under Review",
            Status::PhoneScreen => "Phone Screen",
            Status::TechnicalInterview => "Technical Interview",
            Status::OnsiteInterview => "Onsite Interview",
            Status::ReferenceCheck => "Reference Check",
            Status::OfferReceived => "Offer Received",
            Status::OfferNegotiating => "Offer Negotiating",
            Status::Accepted => "Accepted",
            Status::Rejected => "Rejected",
            Status::Withdrawn => "Withdrawn",
            Status::Ghosted => "Ghosted",
            Status::PositionFilled => "Position Filled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown application status: {}", s)))
    }
}

/// Source end of a flow edge: the synthetic intake node or a real status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlowSource {
    /// Application intake (transition with no previous status)
    Created,
    Status(Status),
}

impl FlowSource {
    pub const CREATED_NAME: &'static str = "CREATED";

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowSource::Created => Self::CREATED_NAME,
            FlowSource::Status(status) => status.as_str(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FlowSource::Created => "Created",
            FlowSource::Status(status) => status.display_name(),
        }
    }

    /// `None` previous status maps to the intake node
    pub fn from_previous(previous: Option<Status>) -> Self {
        previous.map_or(FlowSource::Created, FlowSource::Status)
    }
}

impl From<Status> for FlowSource {
    fn from(status: Status) -> Self {
        FlowSource::Status(status)
    }
}

impl fmt::Display for FlowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == Self::CREATED_NAME {
            Ok(FlowSource::Created)
        } else {
            s.parse().map(FlowSource::Status)
        }
    }
}

impl Serialize for FlowSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FlowSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
