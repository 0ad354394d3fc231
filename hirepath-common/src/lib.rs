//! # Hirepath Common Library
//!
//! Shared code for the Hirepath status flow engine:
//! - Application status and stage model
//! - Transition record types
//! - Database initialization and migrations
//! - Configuration loading and logging setup
//! - Utility functions

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod stage_model;
pub mod status;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use models::{Application, TransitionRecord};
pub use stage_model::{StageClass, StageModel, StageOverride, StageTable};
pub use status::{FlowSource, Status};
