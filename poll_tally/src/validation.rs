//! Checks of a single voter's submission, before it is stored.
//!
//! The tally functions assume that every ballot passed these checks.

use snafu::Snafu;
use std::collections::{HashMap, HashSet};

use crate::config::*;
use crate::star::{MAX_SCORE, MIN_SCORE};

/// Most selections allowed in a `BestTen` poll.
pub const BEST_TEN_MAX_SELECTIONS: usize = 10;

/// Why a submission cannot be recorded.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
pub enum BallotProblem {
    #[snafu(display("Unknown choice {option}"))]
    UnknownChoice { option: String },

    #[snafu(display("Select exactly one item (got {selected})"))]
    SingleChoiceRequired { selected: usize },

    #[snafu(display("Can't vote for more than ten choices."))]
    TooManySelections { selected: usize },

    #[snafu(display("Must place a number against all choices"))]
    MissingRank,

    #[snafu(display("Votes must be numbers > 0"))]
    RankNotPositive,

    #[snafu(display("Votes must be numbers <= {max}"))]
    RankTooLarge { max: usize },

    #[snafu(display("Can't vote {rank} twice"))]
    DuplicateRank { rank: i64 },

    #[snafu(display("Must place a score against all choices"))]
    MissingScore,

    #[snafu(display("Scores must be between 0 and 5 (inclusive)"))]
    ScoreOutOfRange,
}

/// Returns every distinct problem with a voter's submission, in the order
/// they were found. An empty list means the submission is valid.
///
/// For selection polls the submission only lists the selected options; for
/// instant-runoff and STAR polls it must carry a value for every option.
pub fn validate_submission(
    poll_type: PollType,
    options: &[PollOption],
    submission: &HashMap<OptionId, i64>,
) -> Vec<BallotProblem> {
    let mut problems: Vec<BallotProblem> = Vec::new();
    let known: HashSet<&OptionId> = options.iter().map(|o| &o.id).collect();

    let mut unknown: Vec<&OptionId> = submission.keys().filter(|k| !known.contains(k)).collect();
    unknown.sort();
    for option in unknown {
        problems.push(BallotProblem::UnknownChoice {
            option: option.0.clone(),
        });
    }

    let selected = submission.values().filter(|v| **v > 0).count();
    match poll_type {
        PollType::Poll => {
            if selected != 1 {
                problems.push(BallotProblem::SingleChoiceRequired { selected });
            }
        }
        PollType::BestTen => {
            if selected > BEST_TEN_MAX_SELECTIONS {
                problems.push(BallotProblem::TooManySelections { selected });
            }
        }
        PollType::SelectMany => {}
        PollType::InstantRunoff => {
            let n = options.len();
            let mut seen: HashSet<i64> = HashSet::new();
            for option in options.iter() {
                let rank = match submission.get(&option.id) {
                    Some(rank) => *rank,
                    None => {
                        problems.push(BallotProblem::MissingRank);
                        continue;
                    }
                };
                if rank <= 0 {
                    problems.push(BallotProblem::RankNotPositive);
                }
                if rank > n as i64 {
                    problems.push(BallotProblem::RankTooLarge { max: n });
                }
                if !seen.insert(rank) {
                    problems.push(BallotProblem::DuplicateRank { rank });
                }
            }
        }
        PollType::StarVote => {
            for option in options.iter() {
                match submission.get(&option.id) {
                    None => problems.push(BallotProblem::MissingScore),
                    Some(score) if !(MIN_SCORE..=MAX_SCORE).contains(score) => {
                        problems.push(BallotProblem::ScoreOutOfRange)
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let mut unique: Vec<BallotProblem> = Vec::new();
    for p in problems {
        if !unique.contains(&p) {
            unique.push(p);
        }
    }
    unique
}

/// Groups the responses of each voter into the submission format checked by
/// [`validate_submission`].
pub fn submissions_by_voter(responses: &[Response]) -> Vec<(VoterId, HashMap<OptionId, i64>)> {
    let mut by_voter: Vec<(VoterId, HashMap<OptionId, i64>)> = Vec::new();
    for r in responses.iter() {
        match by_voter.iter_mut().find(|(v, _)| *v == r.voter) {
            Some((_, sub)) => {
                sub.insert(r.option.clone(), r.value);
            }
            None => {
                let mut sub = HashMap::new();
                sub.insert(r.option.clone(), r.value);
                by_voter.push((r.voter.clone(), sub));
            }
        }
    }
    by_voter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<PollOption> {
        (1..=n)
            .map(|i| PollOption::new(&i.to_string(), &format!("Theme {}", i)))
            .collect()
    }

    fn submission(values: &[(&str, i64)]) -> HashMap<OptionId, i64> {
        values
            .iter()
            .map(|(id, v)| (OptionId::from(*id), *v))
            .collect()
    }

    #[test]
    fn single_choice_poll() {
        let opts = options(3);
        assert!(validate_submission(PollType::Poll, &opts, &submission(&[("2", 1)])).is_empty());
        assert_eq!(
            validate_submission(PollType::Poll, &opts, &submission(&[("1", 1), ("2", 1)])),
            vec![BallotProblem::SingleChoiceRequired { selected: 2 }]
        );
        assert_eq!(
            validate_submission(PollType::Poll, &opts, &submission(&[])),
            vec![BallotProblem::SingleChoiceRequired { selected: 0 }]
        );
    }

    #[test]
    fn best_ten_allows_at_most_ten() {
        let opts = options(12);
        let ten: Vec<(String, i64)> = (1..=10).map(|i| (i.to_string(), 1)).collect();
        let ten_refs: Vec<(&str, i64)> = ten.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert!(validate_submission(PollType::BestTen, &opts, &submission(&ten_refs)).is_empty());

        let eleven: Vec<(String, i64)> = (1..=11).map(|i| (i.to_string(), 1)).collect();
        let eleven_refs: Vec<(&str, i64)> =
            eleven.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(
            validate_submission(PollType::BestTen, &opts, &submission(&eleven_refs)),
            vec![BallotProblem::TooManySelections { selected: 11 }]
        );
        // The same submission is fine when any number of selections is allowed.
        assert!(
            validate_submission(PollType::SelectMany, &opts, &submission(&eleven_refs)).is_empty()
        );
    }

    #[test]
    fn instant_runoff_needs_a_full_ranking() {
        let opts = options(3);
        assert!(validate_submission(
            PollType::InstantRunoff,
            &opts,
            &submission(&[("1", 2), ("2", 3), ("3", 1)])
        )
        .is_empty());

        assert_eq!(
            validate_submission(
                PollType::InstantRunoff,
                &opts,
                &submission(&[("1", 1), ("2", 2)])
            ),
            vec![BallotProblem::MissingRank]
        );
        assert_eq!(
            validate_submission(
                PollType::InstantRunoff,
                &opts,
                &submission(&[("1", 0), ("2", 4), ("3", 4)])
            ),
            vec![
                BallotProblem::RankNotPositive,
                BallotProblem::RankTooLarge { max: 3 },
                BallotProblem::DuplicateRank { rank: 4 },
            ]
        );
    }

    #[test]
    fn star_scores_between_zero_and_five() {
        let opts = options(2);
        assert!(
            validate_submission(PollType::StarVote, &opts, &submission(&[("1", 0), ("2", 5)]))
                .is_empty()
        );
        assert_eq!(
            validate_submission(PollType::StarVote, &opts, &submission(&[("1", 6)])),
            vec![BallotProblem::ScoreOutOfRange, BallotProblem::MissingScore]
        );
    }

    #[test]
    fn unknown_choices_are_reported() {
        let opts = options(2);
        assert_eq!(
            validate_submission(PollType::SelectMany, &opts, &submission(&[("9", 1)])),
            vec![BallotProblem::UnknownChoice {
                option: "9".to_string()
            }]
        );
    }

    #[test]
    fn problems_read_like_form_errors() {
        assert_eq!(
            BallotProblem::DuplicateRank { rank: 2 }.to_string(),
            "Can't vote 2 twice"
        );
        assert_eq!(
            BallotProblem::RankTooLarge { max: 7 }.to_string(),
            "Votes must be numbers <= 7"
        );
    }

    #[test]
    fn groups_submissions_in_first_seen_order() {
        let responses = vec![
            Response::new("bob", "1", 1),
            Response::new("alice", "2", 1),
            Response::new("bob", "2", 2),
        ];
        let subs = submissions_by_voter(&responses);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].0, VoterId::from("bob"));
        assert_eq!(subs[0].1.len(), 2);
    }
}
