use log::{debug, info, warn};

use poll_tally::reporter::{LogReporter, Tee, TextReporter};
use poll_tally::validation::{submissions_by_voter, validate_submission};
use poll_tally::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::poll::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_json;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PollError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Could not read an index, expected a positive number or a column name"))]
    ParsingJsonNumber {},
    #[snafu(display("The config file has no parent directory"))]
    MissingParentDir {},

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: {value:?} is not a number"))]
    InvalidValue { lineno: usize, value: String },

    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("Tally failed: {source}"))]
    Tally { source: TallyError },
    #[snafu(display("Invalid submission from voter {voter}: {problems}"))]
    InvalidBallot { voter: String, problems: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PollResult<T> = Result<T, PollError>;

/// Everything needed to tally a poll, however it was described.
#[derive(Eq, PartialEq, Debug, Clone)]
struct PollInput {
    title: String,
    date: Option<String>,
    poll_type: PollType,
    options: Vec<PollOption>,
    responses: Vec<Response>,
    // Where the summary goes when --out is not given.
    output_path: Option<String>,
}

fn result_stats_to_json(rs: &TallyResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    let num_rounds = rs.round_stats.len();
    for (idx, round_stat) in rs.round_stats.iter().enumerate() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        if let Some(name) = &round_stat.eliminated {
            tally_results.push(json!({ "eliminated": name }));
        }
        if idx == num_rounds - 1 {
            tally_results.push(json!({ "elected": rs.winner }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

fn build_summary_js(input: &PollInput, rs: &TallyResult) -> JSValue {
    let c = OutputConfig {
        poll: input.title.clone(),
        poll_type: input.poll_type.name().to_string(),
        date: input.date.clone(),
        voters: rs.num_voters,
    };
    json!({
        "config": c,
        "results": result_stats_to_json(rs),
        "winner": rs.winner })
}

fn read_responses(path: &str, source: &ResponseSource) -> PollResult<Vec<Response>> {
    info!("Attempting to read response file {:?}", path);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_responses(path, source),
        "json" => io_json::read_json_responses(path),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn read_poll_type(s: &str) -> PollResult<PollType> {
    s.parse::<PollType>().context(TallySnafu {})
}

fn load_from_config(config_path: &str, args: &Args) -> PollResult<PollInput> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    if args.input.is_some() {
        warn!("--input is ignored when a config file is given");
    }

    let poll_type = match &args.poll_type {
        Some(s) => read_poll_type(s)?,
        None => config.poll_type()?,
    };

    if config.response_sources.is_empty() {
        whatever!("no response sources detected");
    }

    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;
    let mut responses: Vec<Response> = Vec::new();
    for source in config.response_sources.iter() {
        let path = io_common::resolve_path(root_p, &source.file_path);
        let mut file_data = read_responses(&path, source)?;
        responses.append(&mut file_data);
    }

    let output_path = config
        .output_settings
        .output_directory
        .as_ref()
        .map(|dir| io_common::resolve_path(root_p, &format!("{}/summary.json", dir)));

    Ok(PollInput {
        title: config.output_settings.poll_title.clone(),
        date: config.output_settings.poll_date.clone(),
        poll_type,
        options: config.options.clone(),
        responses,
        output_path,
    })
}

fn load_from_input(input_path: &str, args: &Args) -> PollResult<PollInput> {
    let poll_type = match &args.poll_type {
        Some(s) => read_poll_type(s)?,
        None => whatever!("--poll-type is required when no config file is given"),
    };
    let provider = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
    let source = ResponseSource::new(&provider, input_path);
    let responses = read_responses(input_path, &source)?;

    let options = match &args.options {
        Some(names) => names.iter().map(|n| PollOption::new(n, n)).collect(),
        None => io_common::options_from_responses(&responses),
    };

    Ok(PollInput {
        title: input_path.to_string(),
        date: None,
        poll_type,
        options,
        responses,
        output_path: None,
    })
}

/// Checks the submission of every voter. Invalid submissions either stop
/// the run or, with `skip_invalid`, are dropped.
fn check_submissions(input: &PollInput, skip_invalid: bool) -> PollResult<Vec<Response>> {
    let mut rejected: HashSet<VoterId> = HashSet::new();
    for (voter, submission) in submissions_by_voter(&input.responses) {
        let problems = validate_submission(input.poll_type, &input.options, &submission);
        if problems.is_empty() {
            continue;
        }
        let msg = problems
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<String>>()
            .join("; ");
        if !skip_invalid {
            return InvalidBallotSnafu {
                voter: voter.0,
                problems: msg,
            }
            .fail();
        }
        warn!("Skipping the submission of voter {}: {}", voter, msg);
        rejected.insert(voter);
    }
    Ok(input
        .responses
        .iter()
        .filter(|r| !rejected.contains(&r.voter))
        .cloned()
        .collect())
}

fn write_summary(out: &str, pretty_js: &str) -> PollResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing summary to {}", out);
        fs::write(out, pretty_js).context(WritingSummarySnafu { path: out })?;
    }
    Ok(())
}

/// Runs a poll described by the command line arguments and returns its JSON
/// summary.
pub fn run_poll(args: &Args) -> PollResult<JSValue> {
    let input = match (&args.config, &args.input) {
        (Some(config_path), _) => load_from_config(config_path, args)?,
        (None, Some(input_path)) => load_from_input(input_path, args)?,
        (None, None) => whatever!("either --config or --input must be given"),
    };
    info!(
        "Poll {:?}: {} poll with {} options, {} responses",
        input.title,
        input.poll_type,
        input.options.len(),
        input.responses.len()
    );

    let responses = check_submissions(&input, args.skip_invalid)?;
    debug!("responses: {:?}", responses);

    let res = if args.quiet {
        tally_responses(input.poll_type, &input.options, &responses, &mut LogReporter)
    } else {
        let mut reporter = Tee(TextReporter::new(), LogReporter);
        let res = tally_responses(input.poll_type, &input.options, &responses, &mut reporter);
        print!("{}", reporter.0.as_str());
        res
    };
    let result = res.context(TallySnafu {})?;
    info!("res {:?}", result);

    // Assemble the final json
    let result_js = build_summary_js(&input, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = args.out.as_ref().or(input.output_path.as_ref()) {
        write_summary(out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(result_js)
}

#[cfg(test)]
fn test_dir(test_name: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), test_name)
}

#[cfg(test)]
fn run_poll_test(test_name: &str, args: Args) -> PollResult<JSValue> {
    let _ = env_logger::builder().is_test(true).try_init();
    info!("Running test {}", test_name);
    let res = run_poll(&args);
    if let Err(e) = &res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = snafu::ErrorCompat::backtrace(e) {
            eprintln!("trace: {}", bt);
        }
    }
    res
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let dir = test_dir(test_name);
    let args = Args {
        config: Some(format!("{}/{}_config.json", dir, test_name)),
        reference: Some(format!("{}/{}_expected_summary.json", dir, test_name)),
        quiet: true,
        ..Args::default()
    };
    assert!(run_poll_test(test_name, args).is_ok());
}
