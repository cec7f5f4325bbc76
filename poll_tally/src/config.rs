// ********* Input data structures ***********

use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// Opaque identifier of a voter, as stored by the ballot store.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(pub String);

impl Display for VoterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VoterId {
    fn from(s: &str) -> Self {
        VoterId(s.to_string())
    }
}

/// Opaque identifier of an option inside a poll.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub String);

impl Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OptionId {
    fn from(s: &str) -> Self {
        OptionId(s.to_string())
    }
}

/// One of the choices offered by a poll.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub id: OptionId,
    pub text: String,
}

impl PollOption {
    pub fn new(id: &str, text: &str) -> PollOption {
        PollOption {
            id: OptionId::from(id),
            text: text.to_string(),
        }
    }
}

/// A single ballot record: the value a voter gave to one option.
///
/// The meaning of `value` depends on the poll type: a selection flag for
/// acceptance polls, a rank (1 is preferred) for instant-runoff polls and a
/// score between 0 and 5 for STAR polls.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub voter: VoterId,
    pub option: OptionId,
    pub value: i64,
}

impl Response {
    pub fn new(voter: &str, option: &str, value: i64) -> Response {
        Response {
            voter: VoterId::from(voter),
            option: OptionId::from(option),
            value,
        }
    }
}

/// All the values one voter gave in a poll, keyed by option text.
///
/// Options the voter did not touch are absent.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoterBallot {
    pub voter: VoterId,
    pub values: HashMap<String, i64>,
}

impl VoterBallot {
    pub fn new(voter: &str) -> VoterBallot {
        VoterBallot {
            voter: VoterId::from(voter),
            values: HashMap::new(),
        }
    }

    /// Adds (or replaces) the value for an option.
    pub fn with(mut self, option: &str, value: i64) -> VoterBallot {
        self.values.insert(option.to_string(), value);
        self
    }

    pub fn get(&self, option: &str) -> Option<i64> {
        self.values.get(option).cloned()
    }
}

// ********* Poll types **********

/// The kinds of polls the site runs. The numeric codes are the ones stored
/// with each poll.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollType {
    BestTen,
    SelectMany,
    InstantRunoff,
    Poll,
    StarVote,
}

/// The tally algorithm behind a poll type.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyMethod {
    Acceptance,
    InstantRunoff,
    Star,
}

impl PollType {
    pub const ALL: [PollType; 5] = [
        PollType::BestTen,
        PollType::SelectMany,
        PollType::InstantRunoff,
        PollType::Poll,
        PollType::StarVote,
    ];

    pub fn code(self) -> i32 {
        match self {
            PollType::BestTen => 0,
            PollType::SelectMany => 1,
            PollType::InstantRunoff => 2,
            PollType::Poll => 3,
            PollType::StarVote => 4,
        }
    }

    pub fn from_code(code: i32) -> Result<PollType, TallyError> {
        PollType::ALL
            .iter()
            .find(|pt| pt.code() == code)
            .cloned()
            .ok_or_else(|| TallyError::UnknownPollType {
                name: code.to_string(),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            PollType::BestTen => "best_ten",
            PollType::SelectMany => "select_many",
            PollType::InstantRunoff => "instant_runoff",
            PollType::Poll => "poll",
            PollType::StarVote => "star_vote",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PollType::BestTen => "Ten Single Votes",
            PollType::SelectMany => "Select Many",
            PollType::InstantRunoff => "Instant-Runoff",
            PollType::Poll => "Poll",
            PollType::StarVote => "STAR Vote",
        }
    }

    /// BestTen, SelectMany and Poll only differ in what a voter may submit;
    /// they are counted the same way.
    pub fn method(self) -> TallyMethod {
        match self {
            PollType::BestTen | PollType::SelectMany | PollType::Poll => TallyMethod::Acceptance,
            PollType::InstantRunoff => TallyMethod::InstantRunoff,
            PollType::StarVote => TallyMethod::Star,
        }
    }

    /// The instructions shown to voters next to the ballot.
    pub fn instructions(self, num_choices: usize) -> String {
        match self {
            PollType::BestTen => "Select your ten preferred items from the list.".to_string(),
            PollType::SelectMany => "Select your preferred items from the list.".to_string(),
            PollType::InstantRunoff => format!(
                "Place a number against each option, numbered 1 (for your most preferred choice) \
                 through {} (for your least preferred choice).",
                num_choices
            ),
            PollType::Poll => "Select your preferred item from the list.".to_string(),
            PollType::StarVote => "Please enter a score from 0 to 5 for each option, where 5 is \
                 highly preferred and 0 is highly disliked."
                .to_string(),
        }
    }
}

impl Display for PollType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accepts either the snake_case name or the stored numeric code.
impl FromStr for PollType {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<PollType, TallyError> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i32>() {
            return PollType::from_code(code);
        }
        let normalized = trimmed.to_lowercase().replace('-', "_");
        PollType::ALL
            .iter()
            .find(|pt| pt.name() == normalized)
            .cloned()
            .ok_or_else(|| TallyError::UnknownPollType {
                name: s.to_string(),
            })
    }
}

// ******** Output data structures *********

/// What a round of counting measured.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    /// Single round of acceptance counting.
    Acceptance,
    /// One elimination round of instant-runoff.
    Runoff,
    /// STAR scoring round: the counts are total scores.
    StarScoring,
    /// STAR automatic runoff: the counts are numbers of voters preferring a finalist.
    StarRunoff,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct RoundStats {
    pub round: u32,
    pub kind: RoundKind,
    /// The counts of the round, in reporting order.
    pub tally: Vec<(String, u64)>,
    pub eliminated: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct TallyResult {
    pub winner: String,
    pub num_voters: u64,
    pub round_stats: Vec<RoundStats>,
}

impl TallyResult {
    /// The counts of the last round.
    pub fn final_tally(&self) -> &[(String, u64)] {
        self.round_stats
            .last()
            .map(|rs| rs.tally.as_slice())
            .unwrap_or(&[])
    }

    pub fn eliminated(&self) -> Vec<String> {
        self.round_stats
            .iter()
            .filter_map(|rs| rs.eliminated.clone())
            .collect()
    }
}

/// Errors that prevent a tally from completing.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    #[snafu(display("the poll has no options"))]
    NoOptions,

    #[snafu(display("two options have the same text {option:?}"))]
    DuplicateOption { option: String },

    #[snafu(display("an instant-runoff poll needs at least one voter"))]
    NoVoters,

    #[snafu(display("unknown poll type {name:?}"))]
    UnknownPollType { name: String },

    #[snafu(display("voter {voter} responded to unknown option {option}"))]
    UnknownOption { voter: String, option: String },

    #[snafu(display("voter {voter} gave {option:?} a score of {score}, expected 0 to 5"))]
    ScoreOutOfRange {
        voter: String,
        option: String,
        score: i64,
    },

    #[snafu(display("no winner after {rounds} rounds"))]
    NoConvergence { rounds: u32 },
}
