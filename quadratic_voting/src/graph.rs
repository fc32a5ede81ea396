//! Bipartite voter/option network built from a vote-record snapshot.
//!
//! The layout is deterministic: option nodes sit on an inner circle, voter
//! nodes on an outer circle, both placed in input order. Rendering the same
//! snapshot twice yields byte-identical coordinates.

use log::debug;
use std::collections::HashSet;
use std::f64::consts::PI;

use crate::config::{
    AnalyticsConfig, GraphEdge, GraphNode, NetworkGraph, NodeKind, OptionAggregate, VoteRecord,
};

pub(crate) fn build_network_graph(
    records: &[VoteRecord],
    aggregates: &[OptionAggregate],
    config: &AnalyticsConfig,
) -> NetworkGraph {
    let center_x = config.width / 2.0;
    let center_y = config.height / 2.0;
    let option_radius = config.width.min(config.height) / 6.0;
    let voter_radius = config.width.min(config.height) / 3.0;

    let mut nodes: Vec<GraphNode> = Vec::with_capacity(aggregates.len() + records.len());

    let option_count = aggregates.len();
    for (i, agg) in aggregates.iter().enumerate() {
        let angle = 2.0 * PI * i as f64 / option_count as f64;
        nodes.push(GraphNode {
            id: agg.option_id.clone(),
            x: center_x + option_radius * angle.cos(),
            y: center_y + option_radius * angle.sin(),
            kind: NodeKind::Option {
                title: agg.title.clone(),
                total_credits: agg.total_credits,
                vote_count: agg.vote_count,
            },
        });
    }

    let voter_count = records.len();
    for (i, record) in records.iter().enumerate() {
        let angle = 2.0 * PI * i as f64 / voter_count as f64;
        nodes.push(GraphNode {
            id: record.id.clone(),
            x: center_x + voter_radius * angle.cos(),
            y: center_y + voter_radius * angle.sin(),
            kind: NodeKind::Voter {
                credits: record.total_credits_used,
                submitted_at: record.submitted_at,
            },
        });
    }

    let known_options: HashSet<&str> = aggregates.iter().map(|a| a.option_id.as_str()).collect();
    let mut edges: Vec<GraphEdge> = Vec::new();
    for record in records.iter() {
        for (option_id, credits) in record.allocations.iter() {
            if *credits == 0 {
                continue;
            }
            if !known_options.contains(option_id.as_str()) {
                debug!(
                    "build_network_graph: record {} references unknown option {}, no edge",
                    record.id, option_id
                );
                continue;
            }
            edges.push(GraphEdge {
                id: format!("{}_{}", record.id, option_id),
                source: record.id.clone(),
                target: option_id.clone(),
                weight: *credits,
            });
        }
    }

    NetworkGraph { nodes, edges }
}
