use crate::poll::*;
use log::debug;
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "pollTitle")]
    pub poll_title: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "pollDate")]
    pub poll_date: Option<String>,
}

/// The `config` section of the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub poll: String,
    #[serde(rename = "type")]
    pub poll_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub voters: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "voterColumnIndex")]
    pub voter_column_index: Option<JSValue>,
    #[serde(rename = "optionColumnIndex")]
    pub option_column_index: Option<JSValue>,
    #[serde(rename = "valueColumnIndex")]
    pub value_column_index: Option<JSValue>,
    #[serde(rename = "firstResponseRowIndex")]
    pub first_response_row_index: Option<JSValue>,
}

impl ResponseSource {
    /// A CSV or JSON source with all the default columns.
    pub fn new(provider: &str, file_path: &str) -> ResponseSource {
        ResponseSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            voter_column_index: None,
            option_column_index: None,
            value_column_index: None,
            first_response_row_index: None,
        }
    }

    // The column indices are 0-based, the row index is 1-based.

    pub fn voter_column(&self) -> PollResult<usize> {
        Ok(read_js_int_or(&self.voter_column_index, 1)? - 1)
    }

    pub fn option_column(&self) -> PollResult<usize> {
        Ok(read_js_int_or(&self.option_column_index, 2)? - 1)
    }

    pub fn value_column(&self) -> PollResult<usize> {
        Ok(read_js_int_or(&self.value_column_index, 3)? - 1)
    }

    pub fn first_response_row(&self) -> PollResult<usize> {
        read_js_int_or(&self.first_response_row_index, 2)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "pollType")]
    pub poll_type: JSValue,
    pub options: Vec<PollOption>,
    #[serde(rename = "responseSources")]
    pub response_sources: Vec<ResponseSource>,
}

impl PollConfig {
    /// The poll type, given either by name or by its stored code.
    pub fn poll_type(&self) -> PollResult<PollType> {
        match &self.poll_type {
            JSValue::Number(n) => {
                let code = n.as_i64().context(ParsingJsonNumberSnafu {})?;
                PollType::from_code(code as i32).context(TallySnafu {})
            }
            JSValue::String(s) => s.parse::<PollType>().context(TallySnafu {}),
            x => whatever!("pollType must be a name or a code, got {}", x),
        }
    }
}

pub fn read_config(path: &str) -> PollResult<PollConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: PollConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> PollResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}

fn read_js_int_or(x: &Option<JSValue>, default: usize) -> PollResult<usize> {
    match x {
        None => Ok(default),
        Some(_) => read_js_int(x),
    }
}

/// Reads a 1-based index written as a number, a numeric string or an
/// Excel-style column name (A, B, ..., AA, ...).
fn read_js_int(x: &Option<JSValue>) -> PollResult<usize> {
    let idx = match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {})?,
        // Parsing the Excel-style columns
        Some(JSValue::String(s))
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            s.to_ascii_lowercase()
                .chars()
                .try_fold(0usize, |acc, c| {
                    acc.checked_mul(26)?
                        .checked_add(c as usize - 'a' as usize + 1)
                })
                .context(ParsingJsonNumberSnafu {})?
        }
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu {})?,
        _ => None.context(ParsingJsonNumberSnafu {})?,
    };
    ensure!(idx > 0, ParsingJsonNumberSnafu {});
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_indices() {
        assert_eq!(read_js_int(&Some(json!(3))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("4"))).unwrap(), 4);
        assert_eq!(read_js_int(&Some(json!("B"))).unwrap(), 2);
        assert_eq!(read_js_int(&Some(json!("aa"))).unwrap(), 27);
        assert!(read_js_int(&Some(json!(0))).is_err());
        assert!(read_js_int(&Some(json!("1x"))).is_err());
        assert!(read_js_int(&None).is_err());
    }

    #[test]
    fn overlong_column_names_are_refused() {
        assert_eq!(read_js_int(&Some(json!("ZZZZ"))).unwrap(), 475254);
        assert!(read_js_int(&Some(json!("ABCDEFGHIJKLMNOP"))).is_err());
        let source = ResponseSource {
            option_column_index: Some(json!("ZZZZZZZZZZZZZZZZZZZZ")),
            ..ResponseSource::new("csv", "responses.csv")
        };
        assert!(source.option_column().is_err());
    }

    #[test]
    fn source_defaults() {
        let source = ResponseSource::new("csv", "responses.csv");
        assert_eq!(source.voter_column().unwrap(), 0);
        assert_eq!(source.option_column().unwrap(), 1);
        assert_eq!(source.value_column().unwrap(), 2);
        assert_eq!(source.first_response_row().unwrap(), 2);
    }

    #[test]
    fn parses_config() {
        let js = r#"{
            "outputSettings": { "pollTitle": "Theme", "pollDate": "2022-09-18" },
            "pollType": 2,
            "options": [ { "id": "1", "text": "Underground" } ],
            "responseSources": [
                { "provider": "csv", "filePath": "r.csv", "valueColumnIndex": "D" }
            ]
        }"#;
        let config: PollConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.poll_type().unwrap(), PollType::InstantRunoff);
        assert_eq!(config.options[0], PollOption::new("1", "Underground"));
        assert_eq!(config.response_sources[0].value_column().unwrap(), 3);
        assert_eq!(config.output_settings.output_directory, None);
    }

    #[test]
    fn poll_type_by_name() {
        let mut config: PollConfig = serde_json::from_str(
            r#"{ "outputSettings": { "pollTitle": "T" }, "pollType": "star_vote",
                 "options": [], "responseSources": [] }"#,
        )
        .unwrap();
        assert_eq!(config.poll_type().unwrap(), PollType::StarVote);
        config.poll_type = json!("approval");
        assert!(config.poll_type().is_err());
    }
}
