use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

use snafu::prelude::*;

use crate::config::*;

/// The display text of the options, in configured order.
pub fn option_names(options: &[PollOption]) -> Vec<String> {
    options.iter().map(|o| o.text.clone()).collect()
}

/// Checks the option names a tally runs on: there must be at least one,
/// and ballots refer to options by name so no two may be the same.
pub fn check_options(options: &[String]) -> Result<(), TallyError> {
    if options.is_empty() {
        return Err(TallyError::NoOptions);
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for name in options.iter() {
        if !seen.insert(name.as_str()) {
            return Err(TallyError::DuplicateOption {
                option: name.clone(),
            });
        }
    }
    Ok(())
}

/// Groups the flat list of responses into one ballot per voter, keyed by
/// option text.
///
/// The order of the returned ballots must not be relied upon. A later
/// response for the same voter and option replaces an earlier one. Two
/// options with the same text are refused, their responses could not be
/// told apart.
pub fn responses_by_voter(
    options: &[PollOption],
    responses: &[Response],
) -> Result<Vec<VoterBallot>, TallyError> {
    let mut texts: HashSet<&str> = HashSet::new();
    for o in options.iter() {
        ensure!(
            texts.insert(o.text.as_str()),
            DuplicateOptionSnafu {
                option: o.text.clone()
            }
        );
    }
    let names: HashMap<&OptionId, &String> = options.iter().map(|o| (&o.id, &o.text)).collect();

    let mut by_voter: BTreeMap<VoterId, HashMap<String, i64>> = BTreeMap::new();
    for r in responses.iter() {
        let name = names
            .get(&r.option)
            .ok_or_else(|| TallyError::UnknownOption {
                voter: r.voter.0.clone(),
                option: r.option.0.clone(),
            })?;
        by_voter
            .entry(r.voter.clone())
            .or_default()
            .insert((*name).clone(), r.value);
    }
    debug!(
        "responses_by_voter: {} responses from {} voters",
        responses.len(),
        by_voter.len()
    );

    Ok(by_voter
        .into_iter()
        .map(|(voter, values)| VoterBallot { voter, values })
        .collect())
}
