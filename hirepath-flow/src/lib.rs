//! # Hirepath Flow Engine
//!
//! Records application status transitions and compiles them into a
//! forward-layered flow graph and conversion analytics.
//!
//! Pipeline:
//! - status change → [`classifier`] → [`recorder`] (append, transactional)
//! - records → [`aggregator`] → [`graph`] → renderable nodes/links
//! - records → [`conversion`] → per-stage stats and hiring summary
//!
//! [`service::FlowService`] ties these to a database pool.

pub mod aggregator;
pub mod classifier;
pub mod conversion;
pub mod db;
pub mod graph;
pub mod observer;
pub mod recorder;
pub mod service;

pub use aggregator::{aggregate, AggregatedEdge};
pub use classifier::{ProgressionClassifier, TransitionKind};
pub use conversion::{ApplicationHistory, ConversionAnalyzer, ConversionStat, HiringSummary};
pub use graph::{FlowGraph, FlowGraphBuilder, GraphLink, GraphNode};
pub use observer::{FlowObserver, RejectReason};
pub use recorder::TransitionRecorder;
pub use service::{FlowScope, FlowService};
