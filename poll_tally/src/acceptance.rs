use log::{debug, info};

use crate::config::*;
use crate::grouping::check_options;
use crate::reporter::{OptionTally, TallyReporter, Winner};

/// Counts one vote per voter for every option they selected (any positive
/// value), most votes first.
///
/// All the options start at zero. Ties keep the configured order of the
/// options. Names that are not configured options are appended after them.
pub fn acceptance_scores(options: &[String], ballots: &[VoterBallot]) -> Vec<(String, u64)> {
    let mut tally: Vec<(String, u64)> = options.iter().map(|o| (o.clone(), 0)).collect();
    for ballot in ballots.iter() {
        // Visit the selections in a stable order so that unknown names are
        // appended deterministically.
        let mut selected: Vec<(&String, &i64)> =
            ballot.values.iter().filter(|(_, v)| **v > 0).collect();
        selected.sort();
        for (name, _) in selected {
            match tally.iter_mut().find(|(o, _)| o == name) {
                Some(entry) => entry.1 += 1,
                None => tally.push((name.clone(), 1)),
            }
        }
    }
    // Stable: equal counts stay in configured order.
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
}

/// Tallies a poll where every voter may select one or more options.
///
/// The winner is the option with the most selections. With no responses at
/// all, every option has zero votes and the first configured option wins.
pub fn acceptance_vote<R: TallyReporter + ?Sized>(
    options: &[String],
    ballots: &[VoterBallot],
    reporter: &mut R,
) -> Result<TallyResult, TallyError> {
    check_options(options)?;
    info!(
        "acceptance_vote: {} options, {} voters",
        options.len(),
        ballots.len()
    );

    let scores = acceptance_scores(options, ballots);
    debug!("acceptance_vote: scores: {:?}", scores);

    reporter.round_start(1, RoundKind::Acceptance);
    for (name, count) in scores.iter() {
        reporter.option_tally(&OptionTally {
            round: 1,
            kind: RoundKind::Acceptance,
            option: name.clone(),
            count: *count,
            percent: None,
            average: None,
        });
    }

    let (winner, winner_count) = scores[0].clone();
    reporter.winner(&Winner {
        kind: RoundKind::Acceptance,
        option: winner.clone(),
        count: winner_count,
        percent: None,
    });

    Ok(TallyResult {
        winner,
        num_voters: ballots.len() as u64,
        round_stats: vec![RoundStats {
            round: 1,
            kind: RoundKind::Acceptance,
            tally: scores,
            eliminated: None,
        }],
    })
}
