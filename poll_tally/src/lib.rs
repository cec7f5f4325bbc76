/*!
Tallying of the polls run on the PyWeek site (theme voting, general polls).

A poll offers a list of options. Each voter gives a value to some or all of
the options, and the value means different things depending on the
[`PollType`]:

* `BestTen`, `SelectMany`, `Poll`: a positive value selects the option. The
  option selected by most voters wins.
* `InstantRunoff`: the value is a rank, 1 for the preferred option. The
  options with the fewest first preferences are eliminated one per round
  until one of them has the support of more than half of the voters.
* `StarVote`: the value is a score from 0 to 5. The two options with the
  best total go to an automatic runoff.

```
use poll_tally::reporter::TextReporter;
use poll_tally::*;

let options = vec![
    PollOption::new("1", "Underground"),
    PollOption::new("2", "Mirror"),
];
let responses = vec![
    Response::new("alice", "1", 1),
    Response::new("alice", "2", 2),
    Response::new("bob", "2", 1),
    Response::new("bob", "1", 2),
    Response::new("carol", "2", 1),
];
let mut transcript = TextReporter::new();
let result = tally_responses(PollType::InstantRunoff, &options, &responses, &mut transcript)?;
assert_eq!(result.winner, "Mirror");
# Ok::<(), TallyError>(())
```
*/

mod config;
use log::info;

pub mod acceptance;
pub mod grouping;
pub mod instant_runoff;
pub mod reporter;
pub mod star;
pub mod summary;
pub mod validation;

pub use crate::config::*;

use crate::reporter::TallyReporter;

/// Runs the tally of a poll over ballots that are already grouped by voter.
///
/// `options` are the option names, in configured order. Ties are broken
/// using this order.
pub fn tally<R: TallyReporter + ?Sized>(
    poll_type: PollType,
    options: &[String],
    ballots: &[VoterBallot],
    reporter: &mut R,
) -> Result<TallyResult, TallyError> {
    info!(
        "tally: {} poll ({:?} method), {} ballots",
        poll_type,
        poll_type.method(),
        ballots.len()
    );
    match poll_type.method() {
        TallyMethod::Acceptance => acceptance::acceptance_vote(options, ballots, reporter),
        TallyMethod::InstantRunoff => instant_runoff::instant_runoff(options, ballots, reporter),
        TallyMethod::Star => star::star_vote(options, ballots, reporter),
    }
}

/// Groups the raw responses of a poll by voter, then runs the tally.
pub fn tally_responses<R: TallyReporter + ?Sized>(
    poll_type: PollType,
    options: &[PollOption],
    responses: &[Response],
    reporter: &mut R,
) -> Result<TallyResult, TallyError> {
    let ballots = grouping::responses_by_voter(options, responses)?;
    tally(
        poll_type,
        &grouping::option_names(options),
        &ballots,
        reporter,
    )
}
