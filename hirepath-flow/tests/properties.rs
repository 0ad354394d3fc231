//! Property tests for classification, aggregation and graph building

use chrono::{Duration, TimeZone, Utc};
use hirepath_common::config::GraphConfig;
use hirepath_common::{FlowSource, StageModel, Status, TransitionRecord};
use hirepath_flow::conversion::{percentage, ConversionStat};
use hirepath_flow::{aggregate, AggregatedEdge, FlowGraphBuilder, ProgressionClassifier};
use proptest::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

fn model() -> Arc<StageModel> {
    Arc::new(StageModel::default())
}

fn any_status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn any_source() -> impl Strategy<Value = FlowSource> {
    prop::option::of(any_status()).prop_map(FlowSource::from_previous)
}

fn any_edge() -> impl Strategy<Value = AggregatedEdge> {
    (any_source(), any_status(), 1u64..50).prop_map(|(from_status, to_status, count)| AggregatedEdge {
        from_status,
        to_status,
        count,
    })
}

fn any_record() -> impl Strategy<Value = TransitionRecord> {
    (0u128..4, prop::option::of(any_status()), any_status(), 0i64..100, any::<bool>()).prop_map(
        |(app, from_status, to_status, day, is_progression)| TransitionRecord {
            id: Uuid::new_v4(),
            application_id: Uuid::from_u128(app),
            owner_id: Uuid::nil(),
            from_status,
            to_status,
            occurred_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            is_progression,
            stage_order: 0.0,
        },
    )
}

proptest! {
    /// Property: moving up the stage order into an active stage is a progression.
    #[test]
    fn forward_into_active_stage_is_progression(from in any_status(), to in any_status()) {
        let model = model();
        let classifier = ProgressionClassifier::new(model.clone());
        if model.stage_order(from) < model.stage_order(to) && !model.is_terminal(to) {
            prop_assert!(classifier.is_progression(Some(from), to));
        }
    }

    /// Property: entering an exit stage is never a progression.
    #[test]
    fn exit_is_never_progression(from in prop::option::of(any_status()), to in any_status()) {
        let model = model();
        let classifier = ProgressionClassifier::new(model.clone());
        if model.is_exit_terminal(to) {
            prop_assert!(!classifier.is_progression(from, to));
        }
    }

    /// Property: acceptance is a progression from anywhere, intake included.
    #[test]
    fn acceptance_is_always_progression(from in prop::option::of(any_status())) {
        let classifier = ProgressionClassifier::new(model());
        prop_assert!(classifier.is_progression(from, Status::Accepted));
    }

    /// Property: no self-loop link survives graph building.
    #[test]
    fn no_self_loop_links(edges in prop::collection::vec(any_edge(), 0..40)) {
        let builder = FlowGraphBuilder::new(model(), &GraphConfig::default()).unwrap();
        let graph = builder.build(&edges);
        for link in &graph.links {
            prop_assert_ne!(link.source, link.target);
        }
    }

    /// Property: every retained link goes strictly forward in depth.
    #[test]
    fn links_strictly_forward(edges in prop::collection::vec(any_edge(), 0..40)) {
        let builder = FlowGraphBuilder::new(model(), &GraphConfig::default()).unwrap();
        let graph = builder.build(&edges);
        for link in &graph.links {
            prop_assert!(
                builder.depth(link.source) < builder.depth(link.target),
                "{} -> {} is not forward",
                link.source,
                link.target
            );
        }
        // Every link endpoint has a node
        for link in &graph.links {
            prop_assert!(graph.node(link.source).is_some());
            prop_assert!(graph.node(link.target).is_some());
        }
    }

    /// Property: node list is sorted by depth.
    #[test]
    fn nodes_sorted_by_depth(edges in prop::collection::vec(any_edge(), 0..40)) {
        let builder = FlowGraphBuilder::new(model(), &GraphConfig::default()).unwrap();
        let graph = builder.build(&edges);
        for pair in graph.nodes.windows(2) {
            prop_assert!(pair[0].depth <= pair[1].depth);
        }
    }

    /// Property: aggregation does not depend on record order.
    #[test]
    fn aggregation_is_order_independent(
        (records, shuffled) in prop::collection::vec(any_record(), 0..60)
            .prop_flat_map(|records| (Just(records.clone()), Just(records).prop_shuffle()))
    ) {
        prop_assert_eq!(aggregate(&records), aggregate(&shuffled));
    }

    /// Property: aggregated counts add up to the number of records.
    #[test]
    fn aggregation_preserves_total(records in prop::collection::vec(any_record(), 0..60)) {
        let total: u64 = aggregate(&records).iter().map(|e| e.count).sum();
        prop_assert_eq!(total, records.len() as u64);
    }

    /// Property: zero applications at a stage means a zero conversion rate.
    #[test]
    fn empty_stage_has_zero_rate(stage in any_status(), progressed in 0u64..10) {
        let stat = ConversionStat::new(stage, 0, progressed);
        prop_assert_eq!(stat.conversion_rate, 0.0);
        prop_assert_eq!(stat.dropped_off, 0);
    }

    /// Property: percentages stay within 0..=100 when part <= whole.
    #[test]
    fn percentage_bounded(whole in 0u64..1000, fraction in 0.0f64..=1.0) {
        let part = (whole as f64 * fraction).floor() as u64;
        let value = percentage(part, whole);
        prop_assert!((0.0..=100.0).contains(&value));
    }
}
