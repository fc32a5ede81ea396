pub use crate::config::*;

use chrono::Utc;
use std::collections::BTreeMap;

/// A builder for assembling an event snapshot vote by vote.
///
/// This is the embedding API used by live previews and tests; services that
/// already hold a snapshot can call [`crate::run_analytics_stats`] directly.
///
/// ```
/// pub use quadratic_voting::builder::Builder;
/// # use quadratic_voting::AnalyticsErrors;
///
/// let mut builder = Builder::new("community-budget-2024")
///     .options(&["Bike lanes".to_string(), "New park".to_string()]);
///
/// builder.add_vote_simple("invite-a8x", &[("option_1".to_string(), 49)]);
/// builder.add_vote_simple("invite-b2k", &[("option_1".to_string(), 25), ("option_2".to_string(), 16)]);
///
/// let result = builder.compute()?;
/// assert_eq!(result.summary.total_votes, 2);
/// assert_eq!(result.option_aggregates[0].total_credits, 74);
/// # Ok::<(), AnalyticsErrors>(())
/// ```
pub struct Builder {
    pub(crate) _event_id: String,
    pub(crate) _config: AnalyticsConfig,
    pub(crate) _options: Vec<EventOption>,
    pub(crate) _records: Vec<VoteRecord>,
}

impl Builder {
    pub fn new(event_id: &str) -> Builder {
        Builder {
            _event_id: event_id.to_string(),
            _config: AnalyticsConfig::DEFAULT,
            _options: Vec::new(),
            _records: Vec::new(),
        }
    }

    /// Replaces the canvas geometry used for the network graph.
    pub fn config(self, config: &AnalyticsConfig) -> Builder {
        Builder {
            _config: *config,
            ..self
        }
    }

    /// Declares the options by title. Ids are generated as `option_1`,
    /// `option_2`, ... in the given order.
    pub fn options(self, titles: &[String]) -> Builder {
        let event_id = self._event_id.clone();
        Builder {
            _options: titles
                .iter()
                .enumerate()
                .map(|(idx, title)| EventOption {
                    id: format!("option_{}", idx + 1),
                    event_id: event_id.clone(),
                    title: title.clone(),
                    position: idx as u32,
                    source: OptionSource::Admin,
                })
                .collect(),
            ..self
        }
    }

    /// Adds a vote with a generated record id, the submission time stamped
    /// as now, and the total derived from the allocation amounts.
    pub fn add_vote_simple(&mut self, invite_code: &str, allocations: &[(String, u64)]) {
        let allocation_map: BTreeMap<String, u64> = allocations.iter().cloned().collect();
        let total: u64 = allocation_map.values().sum();
        let record = VoteRecord {
            id: format!("vote_{}", self._records.len() + 1),
            event_id: self._event_id.clone(),
            invite_code: invite_code.to_string(),
            allocations: allocation_map,
            total_credits_used: total,
            submitted_at: Utc::now(),
            ip_address: None,
        };
        self.add_vote(record);
    }

    /// Adds a fully specified vote record.
    pub fn add_vote(&mut self, record: VoteRecord) {
        self._records.push(record);
    }

    /// The live-preview weight for a pending allocation. Shares the exact
    /// formula the aggregation uses, so the preview can never drift from the
    /// tallied score.
    pub fn preview_score(&self, credits: u64) -> f64 {
        crate::quadratic_score(credits)
    }

    pub fn compute(&self) -> Result<AnalyticsResult, AnalyticsErrors> {
        crate::run_analytics_stats(&self._event_id, &self._records, &self._options, &self._config)
    }
}
