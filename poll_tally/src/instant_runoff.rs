use log::{debug, info};

use crate::config::*;
use crate::grouping::check_options;
use crate::reporter::{OptionTally, TallyReporter, Winner};

/// The option a voter currently supports: among the options still in the
/// running, the one with the lowest positive rank on the ballot.
///
/// Equal ranks resolve to the option that comes first in `in_running`.
/// Returns `None` when the voter ranked none of the remaining options.
fn current_choice<'a>(ballot: &VoterBallot, in_running: &'a [String]) -> Option<&'a String> {
    let mut best: Option<(&String, i64)> = None;
    for candidate in in_running.iter() {
        match ballot.get(candidate) {
            Some(rank) if rank > 0 => {
                if best.map_or(true, |(_, best_rank)| rank < best_rank) {
                    best = Some((candidate, rank));
                }
            }
            _ => {}
        }
    }
    best.map(|(c, _)| c)
}

/// One vote per voter for their current choice. Every option still in the
/// running is listed, in `in_running` order, even without votes.
fn compute_tally(in_running: &[String], ballots: &[VoterBallot]) -> Vec<(String, u64)> {
    let mut tally: Vec<(String, u64)> = in_running.iter().map(|c| (c.clone(), 0)).collect();
    let mut exhausted = 0;
    for ballot in ballots.iter() {
        match current_choice(ballot, in_running) {
            Some(choice) => {
                if let Some(entry) = tally.iter_mut().find(|(c, _)| c == choice) {
                    entry.1 += 1;
                }
            }
            None => {
                exhausted += 1;
            }
        }
    }
    if exhausted > 0 {
        debug!("compute_tally: {} exhausted ballots", exhausted);
    }
    tally
}

/// Orders a round from the most to the fewest votes.
///
/// Ties are broken by sorting in increasing order with a stable sort and
/// then reversing the whole list: among tied options, the one listed later
/// in the tally comes first and the one listed earliest comes last (and is
/// the one eliminated). The PyWeek 31 theme vote had a four-way tie after
/// round 2 that was settled this way.
fn sort_scores(mut tally: Vec<(String, u64)>) -> Vec<(String, u64)> {
    tally.sort_by_key(|(_, count)| *count);
    tally.reverse();
    tally
}

/// The top entry of a sorted tally and the name at the bottom, `None` when
/// no option is left in the running.
fn leader_and_trailing(scores: &[(String, u64)]) -> Option<((String, u64), String)> {
    let leader = scores.first()?.clone();
    let (trailing, _) = scores.last()?;
    Some((leader, trailing.clone()))
}

fn percent_of(count: u64, num_voters: u64) -> f64 {
    100.0 * count as f64 / num_voters as f64
}

/// Takes the rankings as recorded and figures a majority winner according
/// to instant-runoff rules.
///
/// First choices are tallied. If no option has the support of more than
/// half of the voters, the option with the least support is eliminated and
/// its voters count for their next choice in the following round. This is
/// repeated until an option has more than half of the votes, or only one
/// option is left.
///
/// The number of voters is the number of ballots and stays the same in
/// every round, so ballots that ranked none of the remaining options lower
/// the share of everyone else.
pub fn instant_runoff<R: TallyReporter + ?Sized>(
    options: &[String],
    ballots: &[VoterBallot],
    reporter: &mut R,
) -> Result<TallyResult, TallyError> {
    check_options(options)?;
    if ballots.is_empty() {
        return Err(TallyError::NoVoters);
    }
    let num_voters = ballots.len() as u64;
    info!(
        "instant_runoff: {} options, {} voters",
        options.len(),
        num_voters
    );

    let mut in_running: Vec<String> = options.to_vec();
    let mut round_stats: Vec<RoundStats> = Vec::new();
    // Every round removes one option, the last one standing always wins.
    let max_rounds = options.len() as u32;

    for round in 1..=max_rounds {
        let scores = sort_scores(compute_tally(&in_running, ballots));
        info!("Round {}: {:?}", round, scores);

        reporter.round_start(round, RoundKind::Runoff);
        for (name, count) in scores.iter() {
            reporter.option_tally(&OptionTally {
                round,
                kind: RoundKind::Runoff,
                option: name.clone(),
                count: *count,
                percent: Some(percent_of(*count, num_voters)),
                average: None,
            });
        }

        let ((leader, leader_count), eliminated) = match leader_and_trailing(&scores) {
            Some(ends) => ends,
            None => return Err(TallyError::NoConvergence { rounds: round }),
        };
        // Strictly more than half: exactly half is not a majority.
        if 2 * leader_count > num_voters || in_running.len() == 1 {
            info!("Round {}: {} is elected", round, leader);
            reporter.winner(&Winner {
                kind: RoundKind::Runoff,
                option: leader.clone(),
                count: leader_count,
                percent: Some(percent_of(leader_count, num_voters)),
            });
            round_stats.push(RoundStats {
                round,
                kind: RoundKind::Runoff,
                tally: scores,
                eliminated: None,
            });
            return Ok(TallyResult {
                winner: leader,
                num_voters,
                round_stats,
            });
        }

        info!("Round {}: {} is eliminated", round, eliminated);
        reporter.elimination(round, &eliminated);
        round_stats.push(RoundStats {
            round,
            kind: RoundKind::Runoff,
            tally: scores,
            eliminated: Some(eliminated.clone()),
        });
        in_running.retain(|c| *c != eliminated);
    }

    Err(TallyError::NoConvergence { rounds: max_rounds })
}
