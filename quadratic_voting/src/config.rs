// ********* Input data structures ***********

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// One voter's submitted credit allocation for an event.
///
/// There is exactly one record per (event, invite code) pair: the invite code
/// stands in for the voter's identity. The allocation map is keyed by option
/// id; keys may be present with a zero amount, and keys may be missing for
/// options the voter did not fund. A `BTreeMap` keeps iteration order
/// deterministic across runs.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRecord {
    pub id: String,
    pub event_id: String,
    pub invite_code: String,
    /// Credits allocated per option id. Only strictly positive entries count
    /// as votes.
    pub allocations: BTreeMap<String, u64>,
    /// The total declared by the submission layer. Expected to equal the sum
    /// of the allocation map; a mismatch is reported as an integrity anomaly.
    pub total_credits_used: u64,
    pub submitted_at: DateTime<Utc>,
    /// Raw submitter address. Never crosses the analytics boundary: results
    /// only ever carry its hashed form.
    pub ip_address: Option<String>,
}

/// Where an option came from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OptionSource {
    /// Defined by the event organizer.
    Admin,
    /// Derived from a community proposal.
    Community,
}

/// A votable option of an event. Immutable for analytics purposes.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EventOption {
    pub id: String,
    pub event_id: String,
    pub title: String,
    /// Display ordering within the event.
    pub position: u32,
    pub source: OptionSource,
}

/// Canvas geometry for the network graph layout.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct AnalyticsConfig {
    pub width: f64,
    pub height: f64,
}

impl AnalyticsConfig {
    pub const DEFAULT: AnalyticsConfig = AnalyticsConfig {
        width: 700.0,
        height: 500.0,
    };
}

// ******** Output data structures *********

/// Per-option tally. Options with no votes are still present with zeroes.
#[derive(PartialEq, Debug, Clone)]
pub struct OptionAggregate {
    pub option_id: String,
    pub title: String,
    pub total_credits: u64,
    /// Number of vote records that allocated more than zero credits here.
    pub vote_count: u64,
    /// `sqrt(total_credits)`.
    pub quadratic_score: f64,
}

/// Event-wide participation statistics.
#[derive(PartialEq, Debug, Clone)]
pub struct VoteSummary {
    pub total_votes: u64,
    pub unique_voters: u64,
    pub avg_credits_used: f64,
    pub max_credits_used: u64,
    pub min_credits_used: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub enum NodeKind {
    Option {
        title: String,
        total_credits: u64,
        vote_count: u64,
    },
    Voter {
        credits: u64,
        submitted_at: DateTime<Utc>,
    },
}

#[derive(PartialEq, Debug, Clone)]
pub struct GraphNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub kind: NodeKind,
}

/// One edge per strictly positive allocation. The id is `voteId_optionId`, so
/// recomputation over the same snapshot is idempotent.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct NetworkGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Voters grouped by allocation signature: the sorted, comma-joined ids of
/// the options they funded. Amounts do not matter for the grouping, only the
/// funded subset does. The empty signature is the "abstained on all" group.
#[derive(PartialEq, Debug, Clone)]
pub struct ClusterGroup {
    pub pattern: String,
    pub voter_count: u64,
    pub total_credits: u64,
    pub avg_credits: f64,
    pub percentage: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ClusterSummary {
    pub total_clusters: u64,
    pub largest_cluster: u64,
    /// Distinct clusters divided by total voters; 0 for an event with no
    /// votes.
    pub diversity: f64,
}

/// Votes falling in one hour, keyed by the start of that hour. Hours with no
/// votes get no bucket.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TimelineBucket {
    pub bucket_start: DateTime<Utc>,
    pub vote_count: u64,
    pub total_credits: u64,
}

/// A vote record as surfaced to callers: identical to the stored record
/// except that the raw IP is replaced by its hash.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PublicVoteRecord {
    pub id: String,
    pub event_id: String,
    pub invite_code: String,
    pub allocations: BTreeMap<String, u64>,
    pub total_credits_used: u64,
    pub submitted_at: DateTime<Utc>,
    pub ip_hash: Option<String>,
}

/// A data inconsistency found while scanning the snapshot. Anomalies never
/// abort the computation; the offending contribution is excluded from the
/// tallies and the record itself stays visible in the vote listing so it can
/// be audited.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IntegrityAnomaly {
    pub vote_id: String,
    pub kind: AnomalyKind,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AnomalyKind {
    /// The allocation map references an option id that does not belong to
    /// the event.
    UnknownOption(String),
    /// The declared total does not equal the sum of the allocation map.
    TotalMismatch { declared: u64, computed: u64 },
}

/// Everything one analytics pass produces for an event.
#[derive(PartialEq, Debug, Clone)]
pub struct AnalyticsResult {
    pub event_id: String,
    pub option_aggregates: Vec<OptionAggregate>,
    pub summary: VoteSummary,
    pub network: NetworkGraph,
    pub clusters: Vec<ClusterGroup>,
    pub cluster_summary: ClusterSummary,
    pub timeline: Vec<TimelineBucket>,
    pub votes: Vec<PublicVoteRecord>,
    pub anomalies: Vec<IntegrityAnomaly>,
}

/// Errors that prevent the analytics pass from running at all.
///
/// An event with zero votes is not an error: every stage returns well-formed
/// empty structures for it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AnalyticsErrors {
    /// The store has no event under the requested id.
    MissingEvent,
    /// The graph canvas has a non-positive dimension.
    InvalidCanvas,
}

impl Error for AnalyticsErrors {}

impl Display for AnalyticsErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyticsErrors::MissingEvent => write!(f, "event not found in the store"),
            AnalyticsErrors::InvalidCanvas => write!(f, "canvas dimensions must be positive"),
        }
    }
}
