use crate::poll::io_common::js_text;
use crate::poll::*;
use log::info;
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
struct JsonResponse {
    voter: JSValue,
    option: JSValue,
    value: i64,
}

/// Reads an array of `{ "voter", "option", "value" }` records. Voters and
/// options may be given as strings or numbers.
pub fn read_json_responses(path: &str) -> PollResult<Vec<Response>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let records: Vec<JsonResponse> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;

    let mut res: Vec<Response> = Vec::new();
    for (idx, r) in records.iter().enumerate() {
        let voter = js_text(&r.voter);
        let option = js_text(&r.option);
        match (voter, option) {
            (Some(voter), Some(option)) => res.push(Response::new(&voter, &option, r.value)),
            _ => whatever!("record {}: voter and option must be strings or numbers", idx),
        }
    }
    info!("read_json_responses: {} responses from {}", res.len(), path);
    Ok(res)
}
