//! Primitives shared by the tabular vote readers.
//!
//! CSV and Excel inputs use the same layout: the first row is a header of
//! `invite_code, submitted_at, ip_address` followed by one column per option
//! id; every following row is one vote record.

use snafu::prelude::*;
use std::path::Path;

use crate::analytics::{InvalidCreditsSnafu, LineTooShortSnafu, ParsedVoteRow, QvResult};

/// The number of fixed columns before the option columns start.
pub const FIXED_COLUMNS: usize = 3;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// The option ids declared by the header row, in column order.
pub fn parse_vote_header(cells: &[String]) -> QvResult<Vec<String>> {
    if cells.len() < FIXED_COLUMNS {
        whatever!(
            "The header row needs at least {} columns (invite_code, submitted_at, ip_address), got {}",
            FIXED_COLUMNS,
            cells.len()
        )
    }
    Ok(cells[FIXED_COLUMNS..].to_vec())
}

/// Assembles one data row into a parsed vote. Missing trailing option cells
/// and empty cells count as zero credits.
pub fn parse_vote_row(
    cells: &[String],
    option_ids: &[String],
    lineno: usize,
    default_id: &impl Fn(usize) -> String,
) -> QvResult<ParsedVoteRow> {
    let invite_code = cells
        .first()
        .context(LineTooShortSnafu { lineno })?
        .to_string();
    let submitted_at = match cells.get(1) {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    };
    let ip_address = match cells.get(2) {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    };

    let mut allocations: Vec<(String, u64)> = Vec::new();
    for (i, option_id) in option_ids.iter().enumerate() {
        let raw = match cells.get(FIXED_COLUMNS + i) {
            Some(s) => s.trim(),
            None => "",
        };
        if raw.is_empty() {
            continue;
        }
        let credits = raw.parse::<u64>().ok().context(InvalidCreditsSnafu {
            value: raw.to_string(),
            lineno,
        })?;
        allocations.push((option_id.clone(), credits));
    }

    Ok(ParsedVoteRow {
        id: Some(default_id(lineno)),
        invite_code,
        submitted_at,
        ip_address,
        allocations,
        total_credits_used: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &[&str]) -> Vec<String> {
        row.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_splits_fixed_and_option_columns() {
        let header =
            parse_vote_header(&cells(&["invite_code", "submitted_at", "ip_address", "a", "b"]))
                .unwrap();
        assert_eq!(header, vec!["a".to_string(), "b".to_string()]);
        assert!(parse_vote_header(&cells(&["invite_code"])).is_err());
    }

    #[test]
    fn row_assembly_skips_empty_cells() {
        let option_ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let default_id = make_default_id("votes.csv");
        let row = parse_vote_row(
            &cells(&["code-1", "2024-05-01T10:00:00Z", "", "49", "", "25"]),
            &option_ids,
            2,
            &default_id,
        )
        .unwrap();
        assert_eq!(row.id.as_deref(), Some("votes.csv-00000002"));
        assert_eq!(row.invite_code, "code-1");
        assert_eq!(row.ip_address, None);
        assert_eq!(
            row.allocations,
            vec![("a".to_string(), 49), ("c".to_string(), 25)]
        );
    }

    #[test]
    fn bad_credit_cells_are_rejected() {
        let option_ids = vec!["a".to_string()];
        let default_id = make_default_id("votes.csv");
        let res = parse_vote_row(
            &cells(&["code-1", "2024-05-01T10:00:00Z", "", "many"]),
            &option_ids,
            3,
            &default_id,
        );
        assert!(res.is_err());
    }
}
