//! Voting-pattern clustering.
//!
//! Two voters belong to the same cluster when they funded exactly the same
//! subset of options, regardless of how many credits each option received.

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::config::{ClusterGroup, ClusterSummary, VoteRecord};

/// The allocation signature of one record: the ids of the options funded
/// with more than zero credits, sorted and comma-joined.
///
/// Option ids that do not belong to the event are excluded, the same policy
/// the aggregation engine applies. A record that funded nothing has the
/// empty signature, which is a valid cluster of its own.
pub(crate) fn allocation_signature(record: &VoteRecord, known_options: &HashSet<&str>) -> String {
    // The allocation map is a BTreeMap, so the ids come out already sorted.
    let funded: Vec<&str> = record
        .allocations
        .iter()
        .filter(|(id, credits)| **credits > 0 && known_options.contains(id.as_str()))
        .map(|(id, _)| id.as_str())
        .collect();
    funded.join(",")
}

struct ClusterAcc {
    voter_count: u64,
    total_credits: u64,
}

/// Partitions the vote records by allocation signature.
///
/// Groups are sorted descending by voter count; ties keep the order in which
/// the signatures first appeared in the snapshot.
pub(crate) fn analyze_clusters(
    records: &[VoteRecord],
    known_options: &HashSet<&str>,
) -> (Vec<ClusterGroup>, ClusterSummary) {
    let mut seen_order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, ClusterAcc> = HashMap::new();

    for record in records.iter() {
        let signature = allocation_signature(record, known_options);
        debug!("analyze_clusters: record {} signature {:?}", record.id, signature);
        let entry = acc.entry(signature.clone()).or_insert_with(|| {
            seen_order.push(signature);
            ClusterAcc {
                voter_count: 0,
                total_credits: 0,
            }
        });
        entry.voter_count += 1;
        entry.total_credits += record.total_credits_used;
    }

    let total_voters = records.len() as u64;
    let mut groups: Vec<ClusterGroup> = Vec::with_capacity(seen_order.len());
    for signature in seen_order {
        let a = &acc[&signature];
        groups.push(ClusterGroup {
            pattern: signature,
            voter_count: a.voter_count,
            total_credits: a.total_credits,
            avg_credits: a.total_credits as f64 / a.voter_count as f64,
            percentage: a.voter_count as f64 / total_voters as f64 * 100.0,
        });
    }
    // Stable sort: equal counts keep first-seen order.
    groups.sort_by_key(|g| std::cmp::Reverse(g.voter_count));

    let summary = ClusterSummary {
        total_clusters: groups.len() as u64,
        largest_cluster: groups.first().map(|g| g.voter_count).unwrap_or(0),
        diversity: if total_voters == 0 {
            0.0
        } else {
            groups.len() as f64 / total_voters as f64
        },
    };
    (groups, summary)
}
