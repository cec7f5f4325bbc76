//! The rating summary shown next to a poll.
//!
//! This is a display aggregate, computed independently from the tally: it
//! never decides the winner.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::config::*;

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct RatingSummary {
    pub num_voters: u64,
    /// One value per configured option, in configured order.
    pub tally: Vec<(String, f64)>,
}

impl RatingSummary {
    /// The values, highest first. Equal values keep the configured order.
    pub fn sorted(&self) -> Vec<(String, f64)> {
        let mut res = self.tally.clone();
        res.sort_by(|a, b| b.1.total_cmp(&a.1));
        res
    }
}

/// Summarizes the responses of a poll.
///
/// The value of each option depends on the poll type:
///  - selection polls: the number of responses for the option
///  - instant-runoff: the percentage of voters who ranked it first
///  - STAR: the average score over all the voters
///
/// Responses to options that are not configured still count their voter but
/// are otherwise ignored.
pub fn rating_summary(
    poll_type: PollType,
    options: &[PollOption],
    responses: &[Response],
) -> RatingSummary {
    let voters: HashSet<&VoterId> = responses.iter().map(|r| &r.voter).collect();
    let num_voters = voters.len() as u64;

    let mut counts: HashMap<&OptionId, (u64, i64)> = HashMap::new();
    for r in responses.iter() {
        let entry = counts.entry(&r.option).or_insert((0, 0));
        match poll_type.method() {
            TallyMethod::Acceptance => entry.0 += 1,
            TallyMethod::InstantRunoff => {
                if r.value == 1 {
                    entry.0 += 1
                }
            }
            TallyMethod::Star => entry.1 += r.value,
        }
    }

    let tally = options
        .iter()
        .map(|o| {
            let (count, total) = counts.get(&o.id).cloned().unwrap_or((0, 0));
            let value = match poll_type.method() {
                TallyMethod::Acceptance => count as f64,
                TallyMethod::InstantRunoff if num_voters > 0 => {
                    100.0 * count as f64 / num_voters as f64
                }
                TallyMethod::Star if num_voters > 0 => total as f64 / num_voters as f64,
                _ => 0.0,
            };
            (o.text.clone(), value)
        })
        .collect();

    RatingSummary { num_voters, tally }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes() -> Vec<PollOption> {
        vec![
            PollOption::new("1", "Underground"),
            PollOption::new("2", "Ten Seconds"),
            PollOption::new("3", "Mirror"),
        ]
    }

    #[test]
    fn selection_counts_responses() {
        let responses = vec![
            Response::new("a", "1", 1),
            Response::new("a", "3", 1),
            Response::new("b", "3", 1),
        ];
        let summary = rating_summary(PollType::BestTen, &themes(), &responses);
        assert_eq!(summary.num_voters, 2);
        assert_eq!(
            summary.tally,
            vec![
                ("Underground".to_string(), 1.0),
                ("Ten Seconds".to_string(), 0.0),
                ("Mirror".to_string(), 2.0)
            ]
        );
        assert_eq!(summary.sorted()[0], ("Mirror".to_string(), 2.0));
    }

    #[test]
    fn instant_runoff_uses_first_preferences() {
        let responses = vec![
            Response::new("a", "1", 1),
            Response::new("a", "2", 2),
            Response::new("b", "2", 1),
            Response::new("b", "1", 2),
            Response::new("c", "2", 1),
            Response::new("d", "3", 1),
        ];
        let summary = rating_summary(PollType::InstantRunoff, &themes(), &responses);
        assert_eq!(summary.num_voters, 4);
        assert_eq!(
            summary.sorted(),
            vec![
                ("Ten Seconds".to_string(), 50.0),
                ("Underground".to_string(), 25.0),
                ("Mirror".to_string(), 25.0)
            ]
        );
    }

    #[test]
    fn star_averages_scores() {
        let responses = vec![
            Response::new("a", "1", 5),
            Response::new("a", "2", 2),
            Response::new("b", "1", 3),
        ];
        let summary = rating_summary(PollType::StarVote, &themes(), &responses);
        assert_eq!(
            summary.tally,
            vec![
                ("Underground".to_string(), 4.0),
                ("Ten Seconds".to_string(), 1.0),
                ("Mirror".to_string(), 0.0)
            ]
        );
    }

    #[test]
    fn no_responses() {
        let summary = rating_summary(PollType::InstantRunoff, &themes(), &[]);
        assert_eq!(summary.num_voters, 0);
        assert!(summary.tally.iter().all(|(_, v)| *v == 0.0));
    }
}
