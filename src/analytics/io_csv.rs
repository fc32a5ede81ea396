// Primitives for reading CSV vote files.

use log::debug;

use snafu::prelude::*;
use std::fs::File;

use crate::analytics::io_common::{make_default_id, parse_vote_header, parse_vote_row};
use crate::analytics::{CsvLineParseSnafu, CsvOpenSnafu, ParsedVoteRow, QvResult};

pub fn read_csv_votes(path: String) -> QvResult<Vec<ParsedVoteRow>> {
    let default_id = make_default_id(&path);
    let mut records = get_records(&path)?;

    let header_line = match records.next() {
        Some(line_r) => line_r.context(CsvLineParseSnafu {})?,
        None => {
            whatever!("The CSV file {} has no header row", path)
        }
    };
    let option_ids = parse_vote_header(&to_cells(&header_line))?;
    debug!("read_csv_votes: option columns: {:?}", option_ids);

    let mut res: Vec<ParsedVoteRow> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // Line 1 is the header.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_votes: lineno: {:?} row: {:?}", lineno, line);
        let row = parse_vote_row(&to_cells(&line), &option_ids, lineno, &default_id)?;
        res.push(row);
    }
    Ok(res)
}

fn get_records(path: &String) -> QvResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    Ok(rdr.into_records())
}

fn to_cells(line: &csv::StringRecord) -> Vec<String> {
    line.iter().map(|s| s.to_string()).collect()
}
