//! Progress reporting for the tally functions.
//!
//! Every strategy reports what it computes, in order, through a
//! [`TallyReporter`]. A round is always reported completely (header, one
//! line per option, then the elimination or the winner) before the next one
//! starts.

use log::info;
use serde::Serialize;
use std::fmt::Write;

use crate::config::RoundKind;

/// The count of one option in one round.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct OptionTally {
    pub round: u32,
    pub kind: RoundKind,
    pub option: String,
    pub count: u64,
    /// Share of all the voters, for instant-runoff rounds.
    pub percent: Option<f64>,
    /// Average score, for the STAR scoring round.
    pub average: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Winner {
    pub kind: RoundKind,
    pub option: String,
    pub count: u64,
    pub percent: Option<f64>,
}

/// Receives the progress of a tally. All the methods do nothing by default.
pub trait TallyReporter {
    fn round_start(&mut self, _round: u32, _kind: RoundKind) {}

    fn option_tally(&mut self, _tally: &OptionTally) {}

    fn elimination(&mut self, _round: u32, _option: &str) {}

    fn winner(&mut self, _winner: &Winner) {}
}

impl<R: TallyReporter + ?Sized> TallyReporter for &mut R {
    fn round_start(&mut self, round: u32, kind: RoundKind) {
        (**self).round_start(round, kind)
    }
    fn option_tally(&mut self, tally: &OptionTally) {
        (**self).option_tally(tally)
    }
    fn elimination(&mut self, round: u32, option: &str) {
        (**self).elimination(round, option)
    }
    fn winner(&mut self, winner: &Winner) {
        (**self).winner(winner)
    }
}

impl<R: TallyReporter + ?Sized> TallyReporter for Box<R> {
    fn round_start(&mut self, round: u32, kind: RoundKind) {
        (**self).round_start(round, kind)
    }
    fn option_tally(&mut self, tally: &OptionTally) {
        (**self).option_tally(tally)
    }
    fn elimination(&mut self, round: u32, option: &str) {
        (**self).elimination(round, option)
    }
    fn winner(&mut self, winner: &Winner) {
        (**self).winner(winner)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl TallyReporter for NullReporter {}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TallyEvent {
    RoundStart { round: u32, kind: RoundKind },
    OptionTally(OptionTally),
    Elimination { round: u32, option: String },
    Winner(Winner),
}

/// Records all the events, in the order they were reported.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<TallyEvent>,
}

impl EventLog {
    pub fn new() -> EventLog {
        EventLog::default()
    }

    pub fn option_tallies(&self) -> Vec<&OptionTally> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TallyEvent::OptionTally(ot) => Some(ot),
                _ => None,
            })
            .collect()
    }

    pub fn eliminations(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TallyEvent::Elimination { option, .. } => Some(option.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn winner(&self) -> Option<&Winner> {
        self.events.iter().rev().find_map(|e| match e {
            TallyEvent::Winner(w) => Some(w),
            _ => None,
        })
    }
}

impl TallyReporter for EventLog {
    fn round_start(&mut self, round: u32, kind: RoundKind) {
        self.events.push(TallyEvent::RoundStart { round, kind });
    }
    fn option_tally(&mut self, tally: &OptionTally) {
        self.events.push(TallyEvent::OptionTally(tally.clone()));
    }
    fn elimination(&mut self, round: u32, option: &str) {
        self.events.push(TallyEvent::Elimination {
            round,
            option: option.to_string(),
        });
    }
    fn winner(&mut self, winner: &Winner) {
        self.events.push(TallyEvent::Winner(winner.clone()));
    }
}

/// Renders the human readable transcript of a tally, one line per event.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TextReporter {
    out: String,
}

impl TextReporter {
    pub fn new() -> TextReporter {
        TextReporter::default()
    }

    pub fn as_str(&self) -> &str {
        self.out.as_str()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, s: &str) {
        // Writing to a String cannot fail.
        let _ = writeln!(self.out, "{}", s);
    }
}

// Halves go to the even neighbour: 12.5% is shown as 12%.
fn whole_percent(percent: f64) -> f64 {
    percent.round_ties_even()
}

impl TallyReporter for TextReporter {
    fn round_start(&mut self, round: u32, kind: RoundKind) {
        match kind {
            RoundKind::Acceptance => {}
            RoundKind::Runoff => self.line(&format!("[Round {}]", round)),
            RoundKind::StarScoring => self.line("[Scoring round]"),
            RoundKind::StarRunoff => {
                self.line("");
                self.line("[Automatic runoff]");
            }
        }
    }

    fn option_tally(&mut self, tally: &OptionTally) {
        let l = match (tally.kind, tally.percent, tally.average) {
            (RoundKind::Runoff, Some(percent), _) => {
                format!("{:.0}% {}", whole_percent(percent), tally.option)
            }
            (RoundKind::StarScoring, _, Some(average)) => format!(
                "{}: {} stars (average {:.2})",
                tally.option, tally.count, average
            ),
            (RoundKind::StarRunoff, _, _) => {
                format!("{}: preferred by {} voters", tally.option, tally.count)
            }
            _ => format!("{}: {} votes", tally.option, tally.count),
        };
        self.line(&l);
    }

    fn elimination(&mut self, _round: u32, option: &str) {
        self.line("");
        self.line("No candidate has >50% of the vote.");
        self.line(&format!("Trailing candidate {} has been eliminated.", option));
        self.line("");
    }

    fn winner(&mut self, winner: &Winner) {
        self.line("");
        match (winner.kind, winner.percent) {
            (RoundKind::Runoff, Some(percent)) => self.line(&format!(
                "{} has {:.0}% of the vote and is the winner!",
                winner.option,
                whole_percent(percent)
            )),
            _ => self.line(&format!("Winner: {}!", winner.option)),
        }
    }
}

/// Sends every event to the `log` facade.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl TallyReporter for LogReporter {
    fn round_start(&mut self, round: u32, kind: RoundKind) {
        info!("Round {} ({:?})", round, kind);
    }
    fn option_tally(&mut self, tally: &OptionTally) {
        match tally.percent {
            Some(p) => info!("      {} {} ({:.1}%)", tally.count, tally.option, p),
            None => info!("      {} {}", tally.count, tally.option),
        }
    }
    fn elimination(&mut self, round: u32, option: &str) {
        info!("Round {}: {} -> eliminated", round, option);
    }
    fn winner(&mut self, winner: &Winner) {
        info!("{} -> elected", winner.option);
    }
}

/// Forwards every event to two reporters.
#[derive(Debug, Clone, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: TallyReporter, B: TallyReporter> TallyReporter for Tee<A, B> {
    fn round_start(&mut self, round: u32, kind: RoundKind) {
        self.0.round_start(round, kind);
        self.1.round_start(round, kind);
    }
    fn option_tally(&mut self, tally: &OptionTally) {
        self.0.option_tally(tally);
        self.1.option_tally(tally);
    }
    fn elimination(&mut self, round: u32, option: &str) {
        self.0.elimination(round, option);
        self.1.elimination(round, option);
    }
    fn winner(&mut self, winner: &Winner) {
        self.0.winner(winner);
        self.1.winner(winner);
    }
}
