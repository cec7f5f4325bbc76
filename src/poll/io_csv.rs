// Primitives for reading CSV files.

use std::fs::File;

use crate::poll::*;
use log::{debug, info};
use snafu::prelude::*;

/// Reads one response per line, from the voter, option and value columns.
///
/// Lines with an empty value are skipped.
pub fn read_csv_responses(path: &str, source: &ResponseSource) -> PollResult<Vec<Response>> {
    let voter_idx = source.voter_column()?;
    let option_idx = source.option_column()?;
    let value_idx = source.value_column()?;

    let mut res: Vec<Response> = Vec::new();
    let (records, row_offset) = get_records(path, source)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_responses: lineno: {:?} row: {:?}", lineno, line);

        let voter = line
            .get(voter_idx)
            .context(CsvLineTooShortSnafu { lineno })?;
        let option = line
            .get(option_idx)
            .context(CsvLineTooShortSnafu { lineno })?;
        let value_s = line
            .get(value_idx)
            .context(CsvLineTooShortSnafu { lineno })?;
        if value_s.is_empty() {
            debug!("read_csv_responses: lineno {}: no value, skipping", lineno);
            continue;
        }
        let value = value_s.parse::<i64>().ok().context(InvalidValueSnafu {
            lineno,
            value: value_s,
        })?;
        res.push(Response::new(voter, option, value));
    }
    info!("read_csv_responses: {} responses from {}", res.len(), path);
    Ok(res)
}

fn get_records(
    path: &str,
    source: &ResponseSource,
) -> PollResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = source.first_response_row()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    // The index starts at 1 to respect most conventions in the excel world
    for _ in 1..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}
