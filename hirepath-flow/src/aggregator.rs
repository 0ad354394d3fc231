//! Flow aggregation
//!
//! Groups transition records by (source, target) and counts them. Nothing
//! is filtered here: self-loops and backward moves pass through untouched
//! and are dealt with by the graph builder.

use hirepath_common::{FlowSource, Status, TransitionRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of transitions observed between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedEdge {
    pub from_status: FlowSource,
    pub to_status: Status,
    pub count: u64,
}

impl AggregatedEdge {
    pub fn is_self_loop(&self) -> bool {
        self.from_status == FlowSource::Status(self.to_status)
    }
}

/// Collapse records into counted edges
///
/// The result is sorted by (source, target), CREATED first, so it depends
/// only on the multiset of pairs and not on input order.
pub fn aggregate<'a, I>(records: I) -> Vec<AggregatedEdge>
where
    I: IntoIterator<Item = &'a TransitionRecord>,
{
    let mut counts: BTreeMap<(FlowSource, Status), u64> = BTreeMap::new();
    for record in records {
        *counts.entry((record.source(), record.to_status)).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((from_status, to_status), count)| AggregatedEdge {
            from_status,
            to_status,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn record(application_id: Uuid, from: Option<Status>, to: Status) -> TransitionRecord {
        TransitionRecord {
            id: Uuid::new_v4(),
            application_id,
            owner_id: Uuid::nil(),
            from_status: from,
            to_status: to,
            occurred_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_progression: false,
            stage_order: 0.0,
        }
    }

    #[test]
    fn test_empty_input_yields_no_edges() {
        assert!(aggregate(&Vec::<TransitionRecord>::new()).is_empty());
    }

    #[test]
    fn test_intake_edges_merge_across_applications() {
        let records = vec![
            record(Uuid::new_v4(), None, Status::Applied),
            record(Uuid::new_v4(), None, Status::Applied),
        ];

        let edges = aggregate(&records);
        assert_eq!(
            edges,
            vec![AggregatedEdge {
                from_status: FlowSource::Created,
                to_status: Status::Applied,
                count: 2,
            }]
        );
    }

    #[test]
    fn test_self_loops_and_backward_edges_pass_through() {
        let app = Uuid::new_v4();
        let records = vec![
            record(app, Some(Status::UnderReview), Status::Applied),
            record(app, Some(Status::Applied), Status::Applied),
        ];

        let edges = aggregate(&records);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().any(|e| e.is_self_loop()));
        assert!(edges
            .iter()
            .any(|e| e.from_status == FlowSource::Status(Status::UnderReview) && e.to_status == Status::Applied));
    }

    #[test]
    fn test_output_sorted_created_first() {
        let app = Uuid::new_v4();
        let records = vec![
            record(app, Some(Status::PhoneScreen), Status::Rejected),
            record(app, Some(Status::Applied), Status::PhoneScreen),
            record(app, None, Status::Applied),
        ];

        let sources: Vec<FlowSource> = aggregate(&records).into_iter().map(|e| e.from_status).collect();
        assert_eq!(
            sources,
            vec![
                FlowSource::Created,
                FlowSource::Status(Status::Applied),
                FlowSource::Status(Status::PhoneScreen),
            ]
        );
    }
}
