//! Flow engine entry point
//!
//! `FlowService` wires the recorder, aggregator, graph builder and
//! analyzer to one database pool and one stage model. Reads are a
//! database fetch followed by pure transforms; the service keeps no
//! state beyond its configuration.

use chrono::{DateTime, Utc};
use hirepath_common::config::{resolve_database_path, FlowConfig, GraphConfig};
use hirepath_common::db::init_database;
use hirepath_common::{Application, Result, StageModel, Status, TransitionRecord};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregator::aggregate;
use crate::conversion::{group_by_application, ConversionAnalyzer, ConversionStat, HiringSummary};
use crate::db::{applications, transitions};
use crate::graph::{FlowGraph, FlowGraphBuilder};
use crate::observer::FlowObserver;
use crate::recorder::TransitionRecorder;

/// Which transitions a flow graph is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowScope {
    /// Every application of one owner
    Owner(Uuid),
    /// An explicit set of applications
    Applications(Vec<Uuid>),
}

pub struct FlowService {
    db: SqlitePool,
    recorder: TransitionRecorder,
    graph_builder: FlowGraphBuilder,
    analyzer: ConversionAnalyzer,
}

impl FlowService {
    pub fn new(db: SqlitePool, model: StageModel, graph_config: &GraphConfig) -> Result<Self> {
        let model = Arc::new(model);
        Ok(Self {
            recorder: TransitionRecorder::new(db.clone(), model.clone()),
            graph_builder: FlowGraphBuilder::new(model.clone(), graph_config)?,
            analyzer: ConversionAnalyzer::new(model),
            db,
        })
    }

    /// Build a service from configuration on an existing pool
    pub fn from_config(db: SqlitePool, config: &FlowConfig) -> Result<Self> {
        let model = StageModel::new(&config.stage_table())?;
        Self::new(db, model, &config.graph)
    }

    /// Open (creating if needed) the configured database and build a service
    pub async fn open(config: &FlowConfig, database_path: Option<&Path>) -> Result<Self> {
        let path = resolve_database_path(database_path, config);
        let db = init_database(&path).await?;
        info!("Flow engine using database {}", path.display());
        Self::from_config(db, config)
    }

    /// Route graph-building diagnostics to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn FlowObserver>) -> Self {
        self.graph_builder = self.graph_builder.with_observer(observer);
        self
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub fn recorder(&self) -> &TransitionRecorder {
        &self.recorder
    }

    // ---- Write interface ----

    /// Record a status change (and apply it) for an existing application
    pub async fn record_transition(
        &self,
        application_id: Uuid,
        owner_id: Uuid,
        from: Option<Status>,
        to: Status,
        occurred_at: DateTime<Utc>,
    ) -> Result<TransitionRecord> {
        self.recorder
            .record(application_id, owner_id, from, to, occurred_at)
            .await
    }

    pub async fn create_application(
        &self,
        owner_id: Uuid,
        initial_status: Status,
        created_at: DateTime<Utc>,
    ) -> Result<(Application, TransitionRecord)> {
        self.recorder
            .create_application(owner_id, initial_status, created_at)
            .await
    }

    /// `None` when `new_status` equals the current status
    pub async fn change_status(
        &self,
        application_id: Uuid,
        owner_id: Uuid,
        new_status: Status,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<TransitionRecord>> {
        self.recorder
            .change_status(application_id, owner_id, new_status, occurred_at)
            .await
    }

    pub async fn delete_application(&self, application_id: Uuid, owner_id: Uuid) -> Result<()> {
        self.recorder.delete_application(application_id, owner_id).await
    }

    // ---- Read interface ----

    pub async fn get_flow_graph(&self, scope: &FlowScope) -> Result<FlowGraph> {
        let records = match scope {
            FlowScope::Owner(owner_id) => transitions::list_for_owner(&self.db, *owner_id).await?,
            FlowScope::Applications(ids) => transitions::list_for_applications(&self.db, ids).await?,
        };

        let edges = aggregate(&records);
        let graph = self.graph_builder.build(&edges);

        debug!(
            scope = ?scope,
            records = records.len(),
            edges = edges.len(),
            links = graph.links.len(),
            "Flow graph computed"
        );

        Ok(graph)
    }

    pub async fn get_conversion_stats(&self, owner_id: Uuid) -> Result<Vec<ConversionStat>> {
        let records = transitions::list_for_owner(&self.db, owner_id).await?;
        let histories = group_by_application(records);
        Ok(self.analyzer.analyze(&histories))
    }

    pub async fn get_hiring_summary(&self, owner_id: Uuid) -> Result<HiringSummary> {
        let records = transitions::list_for_owner(&self.db, owner_id).await?;
        let histories = group_by_application(records);
        Ok(self.analyzer.hiring_summary(&histories))
    }

    /// Raw, unfiltered transition history of one application
    ///
    /// Includes the backward and self-loop moves the flow graph drops.
    pub async fn get_application_timeline(
        &self,
        application_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<TransitionRecord>> {
        let mut conn = self.db.acquire().await?;
        applications::load_owned(&mut *conn, application_id, owner_id).await?;
        drop(conn);

        transitions::list_for_application(&self.db, application_id).await
    }

    pub async fn list_applications(&self, owner_id: Uuid) -> Result<Vec<Application>> {
        applications::list_for_owner(&self.db, owner_id).await
    }
}
