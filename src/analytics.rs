use log::{info, warn};

use quadratic_voting::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;

use chrono::{DateTime, Utc};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
pub mod export;
pub mod io_common;
pub mod io_csv;
pub mod io_json;
pub mod io_xlsx;

use crate::analytics::config_reader::EventConfig;

#[derive(Debug, Snafu)]
pub enum QvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook has no usable sheet"))]
    EmptyExcel {},
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening the CSV file"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    LineTooShort { lineno: usize },
    #[snafu(display("Invalid credits value {value:?} at line {lineno}"))]
    InvalidCredits { value: String, lineno: usize },
    #[snafu(display("Invalid timestamp {value:?} for vote {vote_id}"))]
    InvalidTimestamp {
        source: chrono::ParseError,
        value: String,
        vote_id: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type QvResult<T> = Result<T, QvError>;

/// A vote record as parsed by the readers, before validation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedVoteRow {
    pub id: Option<String>,
    pub invite_code: String,
    pub submitted_at: Option<String>,
    pub ip_address: Option<String>,
    pub allocations: Vec<(String, u64)>,
    pub total_credits_used: Option<u64>,
}

/// Turns the parsed rows into validated vote records. Timestamps must be
/// RFC 3339; a missing declared total is derived from the allocation map.
fn validate_rows(rows: &[ParsedVoteRow], config: &EventConfig) -> QvResult<Vec<VoteRecord>> {
    let mut res: Vec<VoteRecord> = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let id = row
            .id
            .clone()
            .unwrap_or_else(|| format!("vote_{}", idx + 1));
        if row.invite_code.is_empty() {
            warn!("validate_rows: vote {} has an empty invite code", id);
        }

        let raw_ts = match &row.submitted_at {
            Some(s) if !s.is_empty() => s,
            _ => {
                whatever!("Vote {} has no submission timestamp", id)
            }
        };
        let submitted_at: DateTime<Utc> = DateTime::parse_from_rfc3339(raw_ts)
            .context(InvalidTimestampSnafu {
                value: raw_ts.clone(),
                vote_id: id.clone(),
            })?
            .with_timezone(&Utc);

        let allocations: BTreeMap<String, u64> = row.allocations.iter().cloned().collect();
        let computed: u64 = allocations.values().sum();
        let total_credits_used = row.total_credits_used.unwrap_or(computed);

        res.push(VoteRecord {
            id,
            event_id: config.event_id.clone(),
            invite_code: row.invite_code.clone(),
            allocations,
            total_credits_used,
            submitted_at,
            ip_address: row.ip_address.clone(),
        });
    }
    Ok(res)
}

fn timestamp_js(ts: &DateTime<Utc>) -> JSValue {
    json!(ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

fn options_to_json(aggregates: &[OptionAggregate]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for agg in aggregates.iter() {
        l.push(json!({
            "optionId": agg.option_id,
            "title": agg.title,
            "totalCredits": agg.total_credits,
            "voteCount": agg.vote_count,
            "quadraticScore": agg.quadratic_score,
        }));
    }
    l
}

fn network_to_json(network: &NetworkGraph) -> JSValue {
    let mut nodes: Vec<JSValue> = Vec::new();
    for node in network.nodes.iter() {
        let js = match &node.kind {
            NodeKind::Option {
                title,
                total_credits,
                vote_count,
            } => json!({
                "id": node.id,
                "type": "option",
                "x": node.x,
                "y": node.y,
                "title": title,
                "totalCredits": total_credits,
                "voteCount": vote_count,
            }),
            NodeKind::Voter {
                credits,
                submitted_at,
            } => json!({
                "id": node.id,
                "type": "voter",
                "x": node.x,
                "y": node.y,
                "credits": credits,
                "submittedAt": timestamp_js(submitted_at),
            }),
        };
        nodes.push(js);
    }

    let mut edges: Vec<JSValue> = Vec::new();
    for edge in network.edges.iter() {
        edges.push(json!({
            "id": edge.id,
            "source": edge.source,
            "target": edge.target,
            "weight": edge.weight,
        }));
    }
    json!({ "nodes": nodes, "edges": edges })
}

fn clusters_to_json(groups: &[ClusterGroup], summary: &ClusterSummary) -> JSValue {
    let mut l: Vec<JSValue> = Vec::new();
    for g in groups.iter() {
        l.push(json!({
            "pattern": g.pattern,
            "voterCount": g.voter_count,
            "totalCredits": g.total_credits,
            "avgCredits": g.avg_credits,
            "percentage": g.percentage,
        }));
    }
    json!({
        "groups": l,
        "totalClusters": summary.total_clusters,
        "largestCluster": summary.largest_cluster,
        "diversity": summary.diversity,
    })
}

fn timeline_to_json(buckets: &[TimelineBucket]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for b in buckets.iter() {
        l.push(json!({
            "bucketStart": timestamp_js(&b.bucket_start),
            "voteCount": b.vote_count,
            "totalCredits": b.total_credits,
        }));
    }
    l
}

fn votes_to_json(votes: &[PublicVoteRecord]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for vote in votes.iter() {
        let mut allocations: JSMap<String, JSValue> = JSMap::new();
        for (option_id, credits) in vote.allocations.iter() {
            allocations.insert(option_id.clone(), json!(credits));
        }
        l.push(json!({
            "id": vote.id,
            "inviteCode": vote.invite_code,
            "allocations": allocations,
            "totalCreditsUsed": vote.total_credits_used,
            "submittedAt": timestamp_js(&vote.submitted_at),
            "ipHash": vote.ip_hash,
        }));
    }
    l
}

fn anomalies_to_json(anomalies: &[IntegrityAnomaly]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for anomaly in anomalies.iter() {
        let js = match &anomaly.kind {
            AnomalyKind::UnknownOption(option_id) => json!({
                "voteId": anomaly.vote_id,
                "kind": "unknownOption",
                "optionId": option_id,
            }),
            AnomalyKind::TotalMismatch { declared, computed } => json!({
                "voteId": anomaly.vote_id,
                "kind": "totalMismatch",
                "declared": declared,
                "computed": computed,
            }),
        };
        l.push(js);
    }
    l
}

fn build_summary_js(config: &EventConfig, res: &AnalyticsResult) -> JSValue {
    json!({
        "event": {
            "id": res.event_id,
            "title": config.title,
        },
        "options": options_to_json(&res.option_aggregates),
        "summary": {
            "totalVotes": res.summary.total_votes,
            "uniqueVoters": res.summary.unique_voters,
            "avgCreditsUsed": res.summary.avg_credits_used,
            "maxCreditsUsed": res.summary.max_credits_used,
            "minCreditsUsed": res.summary.min_credits_used,
        },
        "network": network_to_json(&res.network),
        "clusters": clusters_to_json(&res.clusters, &res.cluster_summary),
        "timeline": timeline_to_json(&res.timeline),
        "votes": votes_to_json(&res.votes),
        "anomalies": anomalies_to_json(&res.anomalies),
    })
}

pub fn read_summary(path: String) -> QvResult<JSValue> {
    let contents = fs::read_to_string(&path).context(OpeningJsonSnafu { path: path.clone() })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_analytics(args: &Args) -> QvResult<()> {
    let config = config_reader::read_event_config(&args.config)?;
    info!("run_analytics: event config: {:?}", config);
    let options = config_reader::event_options(&config)?;

    let input_type = args.input_type.clone().unwrap_or_else(|| "json".to_string());
    let rows = match input_type.as_str() {
        "json" => io_json::read_json_votes(args.input.clone())?,
        "csv" => io_csv::read_csv_votes(args.input.clone())?,
        "xlsx" => io_xlsx::read_xlsx_votes(args.input.clone(), &args.excel_worksheet_name)?,
        x => {
            whatever!("Input type not implemented {:?}", x)
        }
    };
    info!(
        "run_analytics: read {} vote rows from {}",
        rows.len(),
        args.input
    );
    let records = validate_rows(&rows, &config)?;

    let analytics_config = config_reader::analytics_config(&config);
    let result = match run_analytics_stats(&config.event_id, &records, &options, &analytics_config)
    {
        Result::Ok(x) => x,
        Result::Err(x) => {
            whatever!("Analytics error: {:?}", x)
        }
    };

    let result_js = build_summary_js(&config, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    match args.out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingOutputSnafu { path })?;
            info!("run_analytics: summary written to {}", path);
        }
    }

    if let Some(path) = &args.export {
        let report = export::render_csv_report(&result);
        fs::write(path, report).context(WritingOutputSnafu {
            path: path.as_str(),
        })?;
        info!("run_analytics: report written to {}", path);
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}
