//! Graph-building observability hooks
//!
//! The graph builder reports what it drops through a `FlowObserver`
//! instead of logging directly, so the transform stays pure and tests can
//! inspect rejections without capturing log output.

use crate::aggregator::AggregatedEdge;
use std::sync::Mutex;

/// Why an aggregated edge was left out of the flow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Source and target are the same node
    SelfLoop,
    /// Target sits at a lower depth than the source
    Backward,
    /// Source and target share a depth (co-equal stages)
    SameDepth,
}

pub trait FlowObserver: Send + Sync {
    fn edge_rejected(&self, _edge: &AggregatedEdge, _reason: RejectReason) {}

    fn graph_built(&self, _node_count: usize, _link_count: usize) {}
}

/// Default observer: emits tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FlowObserver for TracingObserver {
    fn edge_rejected(&self, edge: &AggregatedEdge, reason: RejectReason) {
        tracing::debug!(
            from = %edge.from_status,
            to = %edge.to_status,
            count = edge.count,
            reason = ?reason,
            "Dropped flow edge"
        );
    }

    fn graph_built(&self, node_count: usize, link_count: usize) {
        tracing::debug!(node_count, link_count, "Built flow graph");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FlowObserver for NoopObserver {}

/// Collects rejections in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    rejected: Mutex<Vec<(AggregatedEdge, RejectReason)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejections seen so far, in order
    pub fn rejected(&self) -> Vec<(AggregatedEdge, RejectReason)> {
        self.rejected
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl FlowObserver for RecordingObserver {
    fn edge_rejected(&self, edge: &AggregatedEdge, reason: RejectReason) {
        let mut rejected = self.rejected.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rejected.push((edge.clone(), reason));
    }
}
