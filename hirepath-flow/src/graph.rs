//! Flow graph construction
//!
//! Turns aggregated edges into a node/link graph for a Sankey-style
//! renderer. Every retained link goes strictly forward in depth, so the
//! result is a layered DAG: self-loops and backward or same-depth edges
//! (status reversions, manual corrections, co-equal sub-stages) are
//! dropped. Callers that need the full history should read the raw
//! transition records instead.

use hirepath_common::config::GraphConfig;
use hirepath_common::stage_model::Rgb;
use hirepath_common::{Error, FlowSource, Result, StageModel};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::aggregator::AggregatedEdge;
use crate::observer::{FlowObserver, RejectReason, TracingObserver};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: FlowSource,
    pub display_name: String,
    /// `#rrggbb`
    pub color: String,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub source: FlowSource,
    pub target: FlowSource,
    pub value: u64,
    /// Source node color at reduced opacity, as CSS `rgba()`
    pub color: String,
}

/// Renderable flow graph
///
/// An empty graph means "no renderable flow yet", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl FlowGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn node(&self, id: FlowSource) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, source: FlowSource, target: FlowSource) -> Option<&GraphLink> {
        self.links.iter().find(|l| l.source == source && l.target == target)
    }
}

pub struct FlowGraphBuilder {
    model: Arc<StageModel>,
    created_color: Rgb,
    link_opacity: f64,
    observer: Arc<dyn FlowObserver>,
}

impl FlowGraphBuilder {
    /// Fails with `Error::Config` on a malformed CREATED color or a link
    /// opacity outside (0, 1].
    pub fn new(model: Arc<StageModel>, config: &GraphConfig) -> Result<Self> {
        let created_color = Rgb::parse_hex(&config.created_color).ok_or_else(|| {
            Error::Config(format!(
                "created_color must be #rrggbb, got {:?}",
                config.created_color
            ))
        })?;

        if !(config.link_opacity > 0.0 && config.link_opacity <= 1.0) {
            return Err(Error::Config(format!(
                "link_opacity must be in (0, 1], got {}",
                config.link_opacity
            )));
        }

        Ok(Self {
            model,
            created_color,
            link_opacity: config.link_opacity,
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn FlowObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn depth(&self, id: FlowSource) -> f64 {
        match id {
            FlowSource::Created => self.model.created_depth(),
            FlowSource::Status(status) => self.model.stage_order(status),
        }
    }

    fn color(&self, id: FlowSource) -> Rgb {
        match id {
            FlowSource::Created => self.created_color,
            FlowSource::Status(status) => self.model.color(status),
        }
    }

    fn node(&self, id: FlowSource) -> GraphNode {
        GraphNode {
            id,
            display_name: id.display_name().to_string(),
            color: self.color(id).to_hex(),
            depth: self.depth(id),
        }
    }

    pub fn build(&self, edges: &[AggregatedEdge]) -> FlowGraph {
        // Distinct ids in first-appearance order
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for edge in edges {
            for id in [edge.from_status, FlowSource::Status(edge.to_status)] {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
        }

        let mut nodes: Vec<GraphNode> = ids.into_iter().map(|id| self.node(id)).collect();
        // Stable: equal depths keep first-appearance order
        nodes.sort_by(|a, b| a.depth.total_cmp(&b.depth));

        let depth_of: HashMap<FlowSource, f64> = nodes.iter().map(|n| (n.id, n.depth)).collect();

        let mut links = Vec::new();
        for edge in edges {
            let source = edge.from_status;
            let target = FlowSource::Status(edge.to_status);

            if source == target {
                self.observer.edge_rejected(edge, RejectReason::SelfLoop);
                continue;
            }

            let (source_depth, target_depth) = (depth_of[&source], depth_of[&target]);
            if source_depth > target_depth {
                self.observer.edge_rejected(edge, RejectReason::Backward);
                continue;
            }
            if source_depth == target_depth {
                self.observer.edge_rejected(edge, RejectReason::SameDepth);
                continue;
            }

            links.push(GraphLink {
                source,
                target,
                value: edge.count,
                color: self.color(source).with_alpha(self.link_opacity),
            });
        }

        if links.is_empty() {
            self.observer.graph_built(0, 0);
            return FlowGraph::empty();
        }

        self.observer.graph_built(nodes.len(), links.len());
        FlowGraph { nodes, links }
    }
}
