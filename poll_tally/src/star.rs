use log::{debug, info};
use std::cmp::{Ordering, Reverse};

use crate::config::*;
use crate::grouping::check_options;
use crate::reporter::{OptionTally, TallyReporter, Winner};

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 5;

#[derive(Eq, PartialEq, Debug, Clone)]
struct ScoreLine {
    name: String,
    // Position in the configured options.
    position: usize,
    total: u64,
    five_stars: u64,
}

fn check_scores(options: &[String], ballots: &[VoterBallot]) -> Result<(), TallyError> {
    for ballot in ballots.iter() {
        for name in options.iter() {
            if let Some(score) = ballot.get(name) {
                if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                    return Err(TallyError::ScoreOutOfRange {
                        voter: ballot.voter.0.clone(),
                        option: name.clone(),
                        score,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Scoring round: total score of every option, highest first.
///
/// Options with equal totals are ordered among themselves by the number of
/// the other tied options they beat head-to-head, then by the number of
/// five-star scores, then by configured order.
fn scoring_round(options: &[String], ballots: &[VoterBallot]) -> Vec<ScoreLine> {
    let mut lines: Vec<ScoreLine> = options
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let scores: Vec<i64> = ballots.iter().filter_map(|b| b.get(name)).collect();
            ScoreLine {
                name: name.clone(),
                position,
                total: scores.iter().map(|s| *s as u64).sum(),
                five_stars: scores.iter().filter(|s| **s == MAX_SCORE).count() as u64,
            }
        })
        .collect();
    lines.sort_by_key(|l| (Reverse(l.total), l.position));

    let mut start = 0;
    while start < lines.len() {
        let end = start
            + lines[start..]
                .iter()
                .take_while(|l| l.total == lines[start].total)
                .count();
        if end - start > 1 {
            let tied = &lines[start..end];
            let wins: Vec<(usize, u64)> = tied
                .iter()
                .map(|l| (l.position, head_to_head_wins(l, tied, ballots)))
                .collect();
            debug!("scoring_round: tie at {}: {:?}", tied[0].total, wins);
            lines[start..end].sort_by_key(|l| {
                let won = wins
                    .iter()
                    .find(|(p, _)| *p == l.position)
                    .map(|(_, w)| *w)
                    .unwrap_or(0);
                (Reverse(won), Reverse(l.five_stars), l.position)
            });
        }
        start = end;
    }
    lines
}

/// Number of the `tied` options that `line` beats head-to-head.
fn head_to_head_wins(line: &ScoreLine, tied: &[ScoreLine], ballots: &[VoterBallot]) -> u64 {
    tied.iter()
        .filter(|other| other.position != line.position)
        .filter(|other| {
            let (prefer_line, prefer_other) = preferences(&line.name, &other.name, ballots);
            prefer_line > prefer_other
        })
        .count() as u64
}

/// Number of voters who scored `first` higher than `second`, and the
/// reverse. Voters who gave both the same score have no preference.
fn preferences(first: &str, second: &str, ballots: &[VoterBallot]) -> (u64, u64) {
    let mut prefer_first = 0;
    let mut prefer_second = 0;
    for ballot in ballots.iter() {
        let s1 = ballot.get(first).unwrap_or(0);
        let s2 = ballot.get(second).unwrap_or(0);
        match s1.cmp(&s2) {
            Ordering::Greater => prefer_first += 1,
            Ordering::Less => prefer_second += 1,
            Ordering::Equal => {}
        }
    }
    (prefer_first, prefer_second)
}

/// Tallies a STAR (Score Then Automatic Runoff) poll with a single seat.
///
/// Voters score every option from 0 to 5; a missing score counts as 0.
/// The two options with the highest total score are the finalists (equal
/// totals go to the option that beats the others of the tie head-to-head),
/// and the finalist preferred by more voters wins. A tied runoff goes to the higher
/// total score, then to the one with more five-star scores, then to the
/// finalist that led the scoring round.
///
/// Scores must have been validated when the ballots were submitted; a
/// score outside 0 to 5 is refused.
pub fn star_vote<R: TallyReporter + ?Sized>(
    options: &[String],
    ballots: &[VoterBallot],
    reporter: &mut R,
) -> Result<TallyResult, TallyError> {
    check_options(options)?;
    check_scores(options, ballots)?;
    let num_voters = ballots.len() as u64;
    info!("star_vote: {} options, {} voters", options.len(), num_voters);

    let scores = scoring_round(options, ballots);
    debug!("star_vote: scoring round: {:?}", scores);

    reporter.round_start(1, RoundKind::StarScoring);
    for line in scores.iter() {
        let average = if num_voters > 0 {
            line.total as f64 / num_voters as f64
        } else {
            0.0
        };
        reporter.option_tally(&OptionTally {
            round: 1,
            kind: RoundKind::StarScoring,
            option: line.name.clone(),
            count: line.total,
            percent: None,
            average: Some(average),
        });
    }
    let scoring_stats = RoundStats {
        round: 1,
        kind: RoundKind::StarScoring,
        tally: scores.iter().map(|l| (l.name.clone(), l.total)).collect(),
        eliminated: None,
    };

    if scores.len() == 1 {
        let only = &scores[0];
        info!("star_vote: single option {}, no runoff", only.name);
        reporter.winner(&Winner {
            kind: RoundKind::StarScoring,
            option: only.name.clone(),
            count: only.total,
            percent: None,
        });
        return Ok(TallyResult {
            winner: only.name.clone(),
            num_voters,
            round_stats: vec![scoring_stats],
        });
    }

    let first = &scores[0];
    let second = &scores[1];
    let (prefer_first, prefer_second) = preferences(&first.name, &second.name, ballots);
    info!(
        "star_vote: runoff {} {} - {} {}",
        first.name, prefer_first, prefer_second, second.name
    );

    let first_wins = (prefer_first, first.total, first.five_stars)
        >= (prefer_second, second.total, second.five_stars);
    let ((winner, winner_prefs), (loser, loser_prefs)) = if first_wins {
        ((first, prefer_first), (second, prefer_second))
    } else {
        ((second, prefer_second), (first, prefer_first))
    };

    reporter.round_start(2, RoundKind::StarRunoff);
    for (line, prefs) in [(winner, winner_prefs), (loser, loser_prefs)] {
        reporter.option_tally(&OptionTally {
            round: 2,
            kind: RoundKind::StarRunoff,
            option: line.name.clone(),
            count: prefs,
            percent: None,
            average: None,
        });
    }
    reporter.winner(&Winner {
        kind: RoundKind::StarRunoff,
        option: winner.name.clone(),
        count: winner_prefs,
        percent: None,
    });

    Ok(TallyResult {
        winner: winner.name.clone(),
        num_voters,
        round_stats: vec![
            scoring_stats,
            RoundStats {
                round: 2,
                kind: RoundKind::StarRunoff,
                tally: vec![
                    (winner.name.clone(), winner_prefs),
                    (loser.name.clone(), loser_prefs),
                ],
                eliminated: Some(loser.name.clone()),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{EventLog, NullReporter, TextReporter};

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn scored(voter: &str, scores: &[(&str, i64)]) -> VoterBallot {
        scores
            .iter()
            .fold(VoterBallot::new(voter), |b, (n, s)| b.with(n, *s))
    }

    #[test]
    fn unanimous_five_stars_wins() {
        let ballots: Vec<VoterBallot> = (0..7)
            .map(|i| scored(&i.to_string(), &[("A", 0), ("B", 5), ("C", 0)]))
            .collect();
        let res = star_vote(&names(&["A", "B", "C"]), &ballots, &mut NullReporter).unwrap();
        assert_eq!(res.winner, "B");
    }

    #[test]
    fn runoff_can_overturn_the_scoring_leader() {
        let ballots = vec![
            scored("1", &[("A", 5), ("B", 0), ("C", 0)]),
            scored("2", &[("A", 1), ("B", 2), ("C", 0)]),
            scored("3", &[("A", 1), ("B", 2), ("C", 0)]),
        ];
        let res = star_vote(&names(&["A", "B", "C"]), &ballots, &mut NullReporter).unwrap();
        assert_eq!(
            res.round_stats[0].tally,
            vec![
                ("A".to_string(), 7),
                ("B".to_string(), 4),
                ("C".to_string(), 0)
            ]
        );
        assert_eq!(res.winner, "B");
        assert_eq!(
            res.round_stats[1].tally,
            vec![("B".to_string(), 2), ("A".to_string(), 1)]
        );
        assert_eq!(res.round_stats[1].eliminated, Some("A".to_string()));
    }

    #[test]
    fn tied_runoff_goes_to_higher_score() {
        let ballots = vec![
            scored("1", &[("A", 5), ("B", 4)]),
            scored("2", &[("A", 0), ("B", 2)]),
        ];
        let res = star_vote(&names(&["A", "B"]), &ballots, &mut NullReporter).unwrap();
        assert_eq!(res.winner, "B");
        assert_eq!(
            res.round_stats[1].tally,
            vec![("B".to_string(), 1), ("A".to_string(), 1)]
        );
    }

    #[test]
    fn tied_runoff_and_score_goes_to_five_stars() {
        let ballots = vec![
            scored("1", &[("A", 2), ("B", 4)]),
            scored("2", &[("A", 5), ("B", 3)]),
        ];
        let res = star_vote(&names(&["B", "A"]), &ballots, &mut NullReporter).unwrap();
        assert_eq!(res.winner, "A");
    }

    #[test]
    fn scoring_ties_prefer_five_stars_then_order() {
        let ballots = vec![
            scored("1", &[("A", 5), ("B", 1), ("C", 5), ("D", 4)]),
            scored("2", &[("A", 5), ("B", 4), ("C", 0), ("D", 1)]),
        ];
        let res = star_vote(&names(&["A", "B", "C", "D"]), &ballots, &mut NullReporter).unwrap();
        let order: Vec<&str> = res.round_stats[0]
            .tally
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        // B, C and D all total 5 and split 1-1 against each other; C has a
        // five-star score.
        assert_eq!(order, vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn scoring_ties_go_first_to_head_to_head() {
        let ballots = vec![
            scored("1", &[("A", 4), ("B", 5), ("C", 0)]),
            scored("2", &[("A", 1), ("B", 0), ("C", 2)]),
            scored("3", &[("A", 1), ("B", 0), ("C", 3)]),
        ];
        let res = star_vote(&names(&["A", "B", "C"]), &ballots, &mut NullReporter).unwrap();
        // B and C both total 5. B has the only five-star score but C is
        // preferred to B by two voters out of three, so C is the finalist.
        assert_eq!(
            res.round_stats[0].tally,
            vec![
                ("A".to_string(), 6),
                ("C".to_string(), 5),
                ("B".to_string(), 5)
            ]
        );
        assert_eq!(
            res.round_stats[1].tally,
            vec![("C".to_string(), 2), ("A".to_string(), 1)]
        );
        assert_eq!(res.winner, "C");
    }

    #[test]
    fn tie_for_first_place_uses_head_to_head() {
        let ballots = vec![
            scored("1", &[("A", 5), ("B", 3), ("C", 1)]),
            scored("2", &[("A", 0), ("B", 1), ("C", 2)]),
            scored("3", &[("A", 0), ("B", 1), ("C", 2)]),
        ];
        let res = star_vote(&names(&["A", "B", "C"]), &ballots, &mut NullReporter).unwrap();
        // All three total 5. C beats both others 2-1, B beats A 2-1.
        let order: Vec<&str> = res.round_stats[0]
            .tally
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(order, vec!["C", "B", "A"]);
        assert_eq!(res.winner, "C");
    }

    #[test]
    fn missing_scores_count_as_zero() {
        let ballots = vec![scored("1", &[("B", 3)]), scored("2", &[("A", 1)])];
        let res = star_vote(&names(&["A", "B"]), &ballots, &mut NullReporter).unwrap();
        assert_eq!(res.winner, "B");
        assert_eq!(res.num_voters, 2);
    }

    #[test]
    fn single_option_needs_no_runoff() {
        let mut log = EventLog::new();
        let res = star_vote(&names(&["A"]), &[scored("1", &[("A", 2)])], &mut log).unwrap();
        assert_eq!(res.winner, "A");
        assert_eq!(res.round_stats.len(), 1);
        assert_eq!(log.winner().map(|w| w.kind), Some(RoundKind::StarScoring));
    }

    #[test]
    fn no_voters_picks_first_option() {
        let res = star_vote(&names(&["A", "B", "C"]), &[], &mut NullReporter).unwrap();
        assert_eq!(res.winner, "A");
    }

    #[test]
    fn out_of_range_scores_are_refused() {
        let ballots = vec![scored("v", &[("A", 6)])];
        assert_eq!(
            star_vote(&names(&["A", "B"]), &ballots, &mut NullReporter),
            Err(TallyError::ScoreOutOfRange {
                voter: "v".to_string(),
                option: "A".to_string(),
                score: 6
            })
        );
        let ballots = vec![scored("v", &[("B", -1)])];
        assert!(star_vote(&names(&["A", "B"]), &ballots, &mut NullReporter).is_err());
    }

    #[test]
    fn transcript() {
        let ballots = vec![
            scored("1", &[("A", 5), ("B", 0)]),
            scored("2", &[("A", 1), ("B", 2)]),
        ];
        let mut text = TextReporter::new();
        star_vote(&names(&["A", "B"]), &ballots, &mut text).unwrap();
        assert_eq!(
            text.into_string(),
            "[Scoring round]\n\
             A: 6 stars (average 3.00)\n\
             B: 2 stars (average 1.00)\n\
             \n\
             [Automatic runoff]\n\
             A: preferred by 1 voters\n\
             B: preferred by 1 voters\n\
             \n\
             Winner: A!\n"
        );
    }
}
