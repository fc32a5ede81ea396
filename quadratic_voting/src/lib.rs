mod cluster;
mod config;
mod graph;
mod privacy;
mod store;
mod timeline;

pub mod builder;
pub mod quick_start;

use log::{debug, info};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
pub use crate::privacy::hash_ip;
pub use crate::store::{run_analytics_for_event, EventStore};

/// The quadratic transform: the vote weight bought by a credit allocation.
///
/// This is the one definition of the formula in the whole system. Both the
/// live allocation preview ([`builder::Builder::preview_score`]) and the
/// server-side tally go through it, so the two can never drift apart.
pub fn quadratic_score(credits: u64) -> f64 {
    (credits as f64).sqrt()
}

/// Runs the full analytics pass over one immutable event snapshot.
///
/// All stages are pure functions of the inputs: per-option aggregation,
/// the voter/option network graph, allocation-signature clustering and the
/// hourly participation timeline. Integrity anomalies in the records are
/// collected and reported, never repaired; an event with zero votes or zero
/// options computes into well-formed empty structures.
pub fn run_analytics_stats(
    event_id: &str,
    records: &[VoteRecord],
    options: &[EventOption],
    config: &AnalyticsConfig,
) -> Result<AnalyticsResult, AnalyticsErrors> {
    info!(
        "run_analytics_stats: event {}: processing {} vote records over {} options",
        event_id,
        records.len(),
        options.len()
    );
    if !(config.width > 0.0 && config.height > 0.0) {
        return Err(AnalyticsErrors::InvalidCanvas);
    }

    let known_options: HashSet<&str> = options.iter().map(|o| o.id.as_str()).collect();

    let anomalies = scan_anomalies(records, &known_options);
    for anomaly in anomalies.iter() {
        info!("run_analytics_stats: integrity anomaly: {:?}", anomaly);
    }

    let option_aggregates = compute_option_aggregates(records, options);
    let summary = compute_vote_summary(records);
    let network = graph::build_network_graph(records, &option_aggregates, config);
    let (clusters, cluster_summary) = cluster::analyze_clusters(records, &known_options);
    let timeline = timeline::bucket_by_hour(records);

    let votes: Vec<PublicVoteRecord> = records.iter().map(mask_record).collect();

    Ok(AnalyticsResult {
        event_id: event_id.to_string(),
        option_aggregates,
        summary,
        network,
        clusters,
        cluster_summary,
        timeline,
        votes,
        anomalies,
    })
}

/// Flags allocations naming an option the event does not have, and declared
/// totals that disagree with the allocation map. The anomalous records stay
/// in the snapshot; only their invalid contributions are excluded downstream.
fn scan_anomalies(records: &[VoteRecord], known_options: &HashSet<&str>) -> Vec<IntegrityAnomaly> {
    let mut res: Vec<IntegrityAnomaly> = Vec::new();
    for record in records.iter() {
        for option_id in record.allocations.keys() {
            if !known_options.contains(option_id.as_str()) {
                res.push(IntegrityAnomaly {
                    vote_id: record.id.clone(),
                    kind: AnomalyKind::UnknownOption(option_id.clone()),
                });
            }
        }
        let computed: u64 = record.allocations.values().sum();
        if computed != record.total_credits_used {
            res.push(IntegrityAnomaly {
                vote_id: record.id.clone(),
                kind: AnomalyKind::TotalMismatch {
                    declared: record.total_credits_used,
                    computed,
                },
            });
        }
    }
    res
}

/// One aggregate per event option, in the order the options were supplied.
/// Options nobody funded are present with zeroes, never omitted.
fn compute_option_aggregates(
    records: &[VoteRecord],
    options: &[EventOption],
) -> Vec<OptionAggregate> {
    // Pre-seed with every option so zero-vote options appear in the result.
    let mut tally: HashMap<&str, (u64, u64)> = options
        .iter()
        .map(|option| (option.id.as_str(), (0u64, 0u64)))
        .collect();

    for record in records.iter() {
        for (option_id, credits) in record.allocations.iter() {
            if *credits == 0 {
                continue;
            }
            match tally.get_mut(option_id.as_str()) {
                Some(entry) => {
                    entry.0 += credits;
                    entry.1 += 1;
                }
                None => {
                    // Unknown option: already reported by the anomaly scan.
                    debug!(
                        "compute_option_aggregates: record {} allocates {} to unknown option {}",
                        record.id, credits, option_id
                    );
                }
            }
        }
    }

    options
        .iter()
        .map(|option| {
            let (total_credits, vote_count) =
                tally.get(option.id.as_str()).copied().unwrap_or((0, 0));
            OptionAggregate {
                option_id: option.id.clone(),
                title: option.title.clone(),
                total_credits,
                vote_count,
                quadratic_score: quadratic_score(total_credits),
            }
        })
        .collect()
}

fn compute_vote_summary(records: &[VoteRecord]) -> VoteSummary {
    let total_votes = records.len() as u64;
    let unique_voters = records
        .iter()
        .map(|r| r.invite_code.as_str())
        .collect::<HashSet<&str>>()
        .len() as u64;

    if records.is_empty() {
        return VoteSummary {
            total_votes,
            unique_voters,
            avg_credits_used: 0.0,
            max_credits_used: 0,
            min_credits_used: 0,
        };
    }

    let totals: Vec<u64> = records.iter().map(|r| r.total_credits_used).collect();
    let sum: u64 = totals.iter().sum();
    VoteSummary {
        total_votes,
        unique_voters,
        avg_credits_used: sum as f64 / total_votes as f64,
        max_credits_used: *totals.iter().max().unwrap(),
        min_credits_used: *totals.iter().min().unwrap(),
    }
}

fn mask_record(record: &VoteRecord) -> PublicVoteRecord {
    PublicVoteRecord {
        id: record.id.clone(),
        event_id: record.event_id.clone(),
        invite_code: record.invite_code.clone(),
        allocations: record.allocations.clone(),
        total_credits_used: record.total_credits_used,
        submitted_at: record.submitted_at,
        ip_hash: record.ip_address.as_deref().map(privacy::hash_ip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn option(id: &str, title: &str, position: u32) -> EventOption {
        EventOption {
            id: id.to_string(),
            event_id: "ev1".to_string(),
            title: title.to_string(),
            position,
            source: OptionSource::Admin,
        }
    }

    fn record(id: &str, code: &str, allocations: &[(&str, u64)], total: u64) -> VoteRecord {
        VoteRecord {
            id: id.to_string(),
            event_id: "ev1".to_string(),
            invite_code: code.to_string(),
            allocations: allocations
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<String, u64>>(),
            total_credits_used: total,
            submitted_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            ip_address: Some("203.0.113.7".to_string()),
        }
    }

    #[test]
    fn quadratic_score_is_monotone_from_zero() {
        assert_eq!(quadratic_score(0), 0.0);
        let mut prev = 0.0;
        for credits in 0..200u64 {
            let score = quadratic_score(credits);
            assert!(score >= prev);
            prev = score;
        }
        assert!((quadratic_score(100) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn preview_and_tally_share_the_formula() {
        let builder = builder::Builder::new("ev1");
        for credits in [0u64, 1, 36, 99, 100] {
            assert_eq!(builder.preview_score(credits), quadratic_score(credits));
        }
    }

    #[test]
    fn worked_example_two_options_three_votes() {
        let options = vec![option("A", "Option A", 0), option("B", "Option B", 1)];
        let records = vec![
            record("v1", "c1", &[("A", 80), ("B", 20)], 100),
            record("v2", "c2", &[("A", 30), ("B", 50)], 80),
            record("v3", "c3", &[("B", 20)], 20),
        ];
        let res =
            run_analytics_stats("ev1", &records, &options, &AnalyticsConfig::DEFAULT).unwrap();

        assert_eq!(res.option_aggregates.len(), 2);
        let a = &res.option_aggregates[0];
        assert_eq!(a.total_credits, 110);
        assert_eq!(a.vote_count, 2);
        assert!((a.quadratic_score - 10.488).abs() < 1e-3);
        let b = &res.option_aggregates[1];
        assert_eq!(b.total_credits, 90);
        assert_eq!(b.vote_count, 3);
        assert!((b.quadratic_score - 9.487).abs() < 1e-3);

        assert_eq!(res.summary.total_votes, 3);
        assert_eq!(res.summary.unique_voters, 3);
        assert_eq!(res.summary.max_credits_used, 100);
        assert_eq!(res.summary.min_credits_used, 20);
        assert!((res.summary.avg_credits_used - 200.0 / 3.0).abs() < 1e-9);

        assert_eq!(res.clusters.len(), 2);
        assert_eq!(res.clusters[0].pattern, "A,B");
        assert_eq!(res.clusters[0].voter_count, 2);
        assert_eq!(res.clusters[1].pattern, "B");
        assert!((res.cluster_summary.diversity - 2.0 / 3.0).abs() < 1e-9);

        assert_eq!(res.network.edges.len(), 5);
        assert!(res.anomalies.is_empty());
    }

    #[test]
    fn empty_event_is_not_an_error() {
        let res = run_analytics_stats("ev1", &[], &[], &AnalyticsConfig::DEFAULT).unwrap();
        assert!(res.option_aggregates.is_empty());
        assert!(res.network.nodes.is_empty());
        assert!(res.clusters.is_empty());
        assert!(res.timeline.is_empty());
        assert!(res.votes.is_empty());
        assert_eq!(res.cluster_summary.diversity, 0.0);
        assert_eq!(res.summary.avg_credits_used, 0.0);
    }

    #[test]
    fn zero_vote_options_still_appear() {
        let options = vec![option("A", "Option A", 0), option("B", "Option B", 1)];
        let records = vec![record("v1", "c1", &[("A", 49)], 49)];
        let res =
            run_analytics_stats("ev1", &records, &options, &AnalyticsConfig::DEFAULT).unwrap();
        assert_eq!(res.option_aggregates.len(), 2);
        let b = &res.option_aggregates[1];
        assert_eq!(b.total_credits, 0);
        assert_eq!(b.vote_count, 0);
        assert_eq!(b.quadratic_score, 0.0);
    }

    #[test]
    fn credit_conservation_holds_without_anomalies() {
        let options = vec![option("A", "Option A", 0), option("B", "Option B", 1)];
        let records = vec![
            record("v1", "c1", &[("A", 80), ("B", 20)], 100),
            record("v2", "c2", &[("B", 50)], 50),
        ];
        let res =
            run_analytics_stats("ev1", &records, &options, &AnalyticsConfig::DEFAULT).unwrap();
        let aggregated: u64 = res.option_aggregates.iter().map(|a| a.total_credits).sum();
        let declared: u64 = records.iter().map(|r| r.total_credits_used).sum();
        assert_eq!(aggregated, declared);
    }

    #[test]
    fn unknown_option_is_excluded_everywhere_and_reported() {
        let options = vec![option("A", "Option A", 0)];
        let records = vec![record("v1", "c1", &[("A", 30), ("ghost", 70)], 100)];
        let res =
            run_analytics_stats("ev1", &records, &options, &AnalyticsConfig::DEFAULT).unwrap();

        // Tally only sees the known option.
        assert_eq!(res.option_aggregates.len(), 1);
        assert_eq!(res.option_aggregates[0].total_credits, 30);
        // No dangling edge.
        assert_eq!(res.network.edges.len(), 1);
        // The signature drops the unknown id as well.
        assert_eq!(res.clusters[0].pattern, "A");
        // Reported once, and the raw record still lists the allocation.
        assert_eq!(
            res.anomalies,
            vec![IntegrityAnomaly {
                vote_id: "v1".to_string(),
                kind: AnomalyKind::UnknownOption("ghost".to_string()),
            }]
        );
        assert_eq!(res.votes[0].allocations.get("ghost"), Some(&70));
    }

    #[test]
    fn total_mismatch_is_reported_not_repaired() {
        let options = vec![option("A", "Option A", 0)];
        let records = vec![record("v1", "c1", &[("A", 30)], 99)];
        let res =
            run_analytics_stats("ev1", &records, &options, &AnalyticsConfig::DEFAULT).unwrap();
        assert_eq!(
            res.anomalies,
            vec![IntegrityAnomaly {
                vote_id: "v1".to_string(),
                kind: AnomalyKind::TotalMismatch {
                    declared: 99,
                    computed: 30,
                },
            }]
        );
        // Summary stats keep the declared total so the discrepancy is visible.
        assert_eq!(res.summary.max_credits_used, 99);
        assert_eq!(res.votes[0].total_credits_used, 99);
    }

    #[test]
    fn raw_ip_never_reaches_the_result() {
        let options = vec![option("A", "Option A", 0)];
        let records = vec![record("v1", "c1", &[("A", 10)], 10)];
        let res =
            run_analytics_stats("ev1", &records, &options, &AnalyticsConfig::DEFAULT).unwrap();
        let vote = &res.votes[0];
        assert_eq!(vote.ip_hash.as_deref(), Some(hash_ip("203.0.113.7").as_str()));
        assert_ne!(vote.ip_hash.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn invalid_canvas_is_rejected() {
        let config = AnalyticsConfig {
            width: 0.0,
            height: 500.0,
        };
        let res = run_analytics_stats("ev1", &[], &[], &config);
        assert_eq!(res, Err(AnalyticsErrors::InvalidCanvas));
    }
}
