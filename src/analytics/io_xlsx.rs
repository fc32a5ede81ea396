// Reading of vote records from Excel workbooks.

use log::debug;

use calamine::{open_workbook, Reader, Xlsx};
use snafu::prelude::*;

use crate::analytics::io_common::{make_default_id, parse_vote_header, parse_vote_row};
use crate::analytics::{EmptyExcelSnafu, OpeningExcelSnafu, ParsedVoteRow, QvResult};

pub fn read_xlsx_votes(
    path: String,
    worksheet_name: &Option<String>,
) -> QvResult<Vec<ParsedVoteRow>> {
    let default_id = make_default_id(&path);
    let mut workbook: Xlsx<_> =
        open_workbook(path.clone()).context(OpeningExcelSnafu { path: path.clone() })?;
    let wrange = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu {})?;
    debug!("read_xlsx_votes: header: {:?}", header);
    let header_cells = read_row_cells(header)?;
    let option_ids = parse_vote_header(&header_cells)?;

    let mut res: Vec<ParsedVoteRow> = Vec::new();
    for (idx, row) in rows.enumerate() {
        // Row 1 is the header.
        let lineno = idx + 2;
        debug!("read_xlsx_votes: row: {:?}", row);
        let cells = read_row_cells(row)?;
        res.push(parse_vote_row(&cells, &option_ids, lineno, &default_id)?);
    }
    Ok(res)
}

fn read_row_cells(row: &[calamine::DataType]) -> QvResult<Vec<String>> {
    let mut cells: Vec<String> = Vec::with_capacity(row.len());
    for cell in row {
        cells.push(read_cell(cell)?);
    }
    Ok(cells)
}

fn read_cell(cell: &calamine::DataType) -> QvResult<String> {
    match cell {
        calamine::DataType::String(s) => Ok(s.clone()),
        calamine::DataType::Empty => Ok("".to_string()),
        // Spreadsheets store credit amounts as numbers.
        calamine::DataType::Int(i) => Ok(i.to_string()),
        calamine::DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        _ => whatever!("read_cell: could not understand cell {:?}", cell),
    }
}

#[cfg(test)]
mod tests {
    use super::read_cell;

    #[test]
    fn numeric_cells_render_as_integers() {
        assert_eq!(read_cell(&calamine::DataType::Float(49.0)).unwrap(), "49");
        assert_eq!(read_cell(&calamine::DataType::Int(25)).unwrap(), "25");
        assert_eq!(read_cell(&calamine::DataType::Empty).unwrap(), "");
        assert!(read_cell(&calamine::DataType::Float(1.5)).is_err());
    }
}
