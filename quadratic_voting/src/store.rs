//! The seam between the analytics engine and whatever owns the vote records.
//!
//! The engine never talks to a database: it takes one immutable snapshot per
//! request through this trait and computes everything from it.

use crate::config::{AnalyticsConfig, AnalyticsErrors, AnalyticsResult, EventOption, VoteRecord};

/// Read-only snapshot access to an event's options and vote records.
///
/// Both listing calls return `None` when the event id is unknown, which is
/// how a missing event is told apart from an existing event that simply has
/// no votes yet (`Some(vec![])`).
pub trait EventStore {
    /// All options of the event, ordered by display position.
    fn list_options_for_event(&self, event_id: &str) -> Option<Vec<EventOption>>;

    /// All vote records of the event, in submission order.
    fn list_votes_for_event(&self, event_id: &str) -> Option<Vec<VoteRecord>>;
}

/// Takes a snapshot of the event through the store and runs the full
/// analytics pass over it.
///
/// An unknown event id yields [`AnalyticsErrors::MissingEvent`]; an event
/// with zero votes computes normally into empty aggregates.
pub fn run_analytics_for_event<S: EventStore>(
    store: &S,
    event_id: &str,
    config: &AnalyticsConfig,
) -> Result<AnalyticsResult, AnalyticsErrors> {
    let options = store
        .list_options_for_event(event_id)
        .ok_or(AnalyticsErrors::MissingEvent)?;
    let records = store
        .list_votes_for_event(event_id)
        .ok_or(AnalyticsErrors::MissingEvent)?;
    crate::run_analytics_stats(event_id, &records, &options, config)
}

#[cfg(test)]
mod tests {
    use super::{run_analytics_for_event, EventStore};
    use crate::config::{
        AnalyticsConfig, AnalyticsErrors, EventOption, OptionSource, VoteRecord,
    };
    use std::collections::HashMap;

    struct MemStore {
        events: HashMap<String, (Vec<EventOption>, Vec<VoteRecord>)>,
    }

    impl EventStore for MemStore {
        fn list_options_for_event(&self, event_id: &str) -> Option<Vec<EventOption>> {
            self.events.get(event_id).map(|(options, _)| options.clone())
        }

        fn list_votes_for_event(&self, event_id: &str) -> Option<Vec<VoteRecord>> {
            self.events.get(event_id).map(|(_, votes)| votes.clone())
        }
    }

    #[test]
    fn missing_event_is_an_error() {
        let store = MemStore {
            events: HashMap::new(),
        };
        let res = run_analytics_for_event(&store, "nope", &AnalyticsConfig::DEFAULT);
        assert_eq!(res, Err(AnalyticsErrors::MissingEvent));
    }

    #[test]
    fn empty_event_computes_empty_aggregates() {
        let option = EventOption {
            id: "a".to_string(),
            event_id: "ev1".to_string(),
            title: "A".to_string(),
            position: 0,
            source: OptionSource::Admin,
        };
        let mut events = HashMap::new();
        events.insert("ev1".to_string(), (vec![option], Vec::new()));
        let store = MemStore { events };

        let res = run_analytics_for_event(&store, "ev1", &AnalyticsConfig::DEFAULT).unwrap();
        assert_eq!(res.summary.total_votes, 0);
        assert_eq!(res.option_aggregates.len(), 1);
        assert_eq!(res.option_aggregates[0].total_credits, 0);
        assert_eq!(res.option_aggregates[0].quadratic_score, 0.0);
        assert!(res.network.edges.is_empty());
        assert!(res.clusters.is_empty());
        assert!(res.timeline.is_empty());
        assert_eq!(res.cluster_summary.diversity, 0.0);
    }
}
