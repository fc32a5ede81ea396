// Reading of vote records in the JSON export format.

use log::debug;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::fs;

use crate::analytics::{OpeningJsonSnafu, ParsedVoteRow, ParsingJsonSnafu, QvResult};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JsonVoteRecord {
    pub id: Option<String>,
    #[serde(rename = "inviteCode")]
    pub invite_code: String,
    #[serde(default)]
    pub allocations: BTreeMap<String, u64>,
    #[serde(rename = "totalCreditsUsed")]
    pub total_credits_used: Option<u64>,
    #[serde(rename = "submittedAt")]
    pub submitted_at: String,
    #[serde(rename = "ipAddress")]
    pub ip_address: Option<String>,
}

pub fn read_json_votes(path: String) -> QvResult<Vec<ParsedVoteRow>> {
    let contents = fs::read_to_string(&path).context(OpeningJsonSnafu { path: path.clone() })?;
    let parsed: Vec<JsonVoteRecord> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_json_votes: read {} records from {}", parsed.len(), path);

    let res: Vec<ParsedVoteRow> = parsed
        .into_iter()
        .map(|record| ParsedVoteRow {
            id: record.id,
            invite_code: record.invite_code,
            submitted_at: Some(record.submitted_at),
            ip_address: record.ip_address,
            allocations: record.allocations.into_iter().collect(),
            total_credits_used: record.total_credits_used,
        })
        .collect();
    Ok(res)
}
