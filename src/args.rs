use clap::Parser;

/// This is the tally program for the polls of the PyWeek site.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the poll description in JSON format: title, type, options
    /// and the sources of the responses.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of a poll in JSON format. If provided, the tallied
    /// summary must match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the poll will be written in JSON format to the given
    /// location. Setting this option overrides the output directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the responses, when no --config is given.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or json.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// The poll type, as a name (best_ten, select_many, instant_runoff, poll, star_vote) or a code (0-4).
    /// Overrides the type given in the config.
    #[clap(short = 't', long, value_parser)]
    pub poll_type: Option<String>,

    /// (list of comma-separated values or not specified) The options of the poll, in order, when no --config is
    /// given. If not specified, the options are read from the responses.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub options: Option<Vec<String>>,

    /// Drop the voters whose responses are not a valid submission instead of failing.
    #[clap(long, takes_value = false)]
    pub skip_invalid: bool,

    /// Do not print the tally transcript.
    #[clap(long, takes_value = false)]
    pub quiet: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
