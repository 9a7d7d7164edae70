//! Radio-button merging and majority-vote consensus for repeated ratings.
//!
//! The tie-break is deliberately not a plain majority vote:
//! - tally choices and rank them by descending count, ties in label order
//!   (`broken_links`, `no`, `unsure`, `yes`);
//! - if every distinct choice has the same count (and there are at least two),
//!   the consensus is `unsure`, otherwise the first-ranked choice;
//! - if that consensus is `unsure`, the runner-up has the same count and the counts
//!   are not uniform, the runner-up wins instead.
//!
//! The score is always the count of the reported choice over the rater count.

use crate::error::WrangleError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Answer choice. Ordering is label order, which is also the tie order in a tally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Choice {
    BrokenLinks,
    No,
    Unsure,
    Yes,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::BrokenLinks => "broken_links",
            Choice::No => "no",
            Choice::Unsure => "unsure",
            Choice::Yes => "yes",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broken_links" => Ok(Choice::BrokenLinks),
            "no" => Ok(Choice::No),
            "unsure" => Ok(Choice::Unsure),
            "yes" => Ok(Choice::Yes),
            other => Err(format!("unknown choice `{}`", other)),
        }
    }
}

/// One rater's radio buttons for a question. `broken_links` is `None`
/// when the form had no such button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RadioFlags {
    pub yes: bool,
    pub no: bool,
    pub unsure: bool,
    pub broken_links: Option<bool>,
}

/// First set flag in priority order yes, no, unsure, broken_links.
/// Nothing set: `no` for optional questions, `None` otherwise.
pub fn resolve_radios(flags: &RadioFlags, optional: bool) -> Option<Choice> {
    if flags.yes {
        Some(Choice::Yes)
    } else if flags.no {
        Some(Choice::No)
    } else if flags.unsure {
        Some(Choice::Unsure)
    } else if flags.broken_links == Some(true) {
        Some(Choice::BrokenLinks)
    } else if optional {
        Some(Choice::No)
    } else {
        None
    }
}

/// Like [`resolve_radios`] but an unanswered required question is an error.
pub fn merge_radios(flags: &RadioFlags, topic: &str, optional: bool, row: usize) -> Result<Choice, WrangleError> {
    resolve_radios(flags, optional).ok_or_else(|| WrangleError::UndefinedResponse { topic: topic.to_string(), row })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Consensus {
    pub choice: Choice,
    pub score: f64,
}

/// Choices with their counts, by descending count, ties in label order.
pub fn tally(answers: &[Choice]) -> Vec<(Choice, usize)> {
    let mut counts: BTreeMap<Choice, usize> = BTreeMap::new();
    for a in answers {
        *counts.entry(*a).or_insert(0) += 1;
    }
    let mut v: Vec<(Choice, usize)> = counts.into_iter().collect();
    // stable: equal counts keep label order
    v.sort_by(|a, b| b.1.cmp(&a.1));
    v
}

fn all_equal(counts: &[(Choice, usize)]) -> bool {
    match counts.first() {
        Some((_, first)) => counts.iter().all(|(_, c)| c == first),
        None => false,
    }
}

/// Consensus for one item's question over `rater_count` ratings.
/// Returns `None` only for an empty answer set.
pub fn majority_vote(answers: &[Choice], rater_count: usize) -> Option<Consensus> {
    let votes = tally(answers);
    let (top_choice, top_count) = *votes.first()?;
    let denom = rater_count.max(1) as f64;
    let uniform = all_equal(&votes);

    let mut choice = if votes.len() > 1 && uniform { Choice::Unsure } else { top_choice };
    let mut score = top_count as f64 / denom;

    if choice == Choice::Unsure && votes.len() > 1 && votes[0].1 == votes[1].1 && !uniform {
        choice = votes[1].0;
        score = votes[1].1 as f64 / denom;
    }
    Some(Consensus { choice, score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use Choice::*;

    fn vote(a: &[Choice]) -> Consensus {
        majority_vote(a, a.len()).unwrap()
    }

    #[test]
    fn radios_priority_order() {
        let all = RadioFlags { yes: true, no: true, unsure: true, broken_links: Some(true) };
        assert_eq!(resolve_radios(&all, false), Some(Yes));
        let f = RadioFlags { no: true, unsure: true, ..Default::default() };
        assert_eq!(resolve_radios(&f, false), Some(No));
        let f = RadioFlags { broken_links: Some(true), ..Default::default() };
        assert_eq!(resolve_radios(&f, false), Some(BrokenLinks));
    }

    #[test]
    fn unanswered_radios() {
        let none = RadioFlags::default();
        assert_eq!(merge_radios(&none, "myth_supports", true, 0).unwrap(), No);
        let err = merge_radios(&none, "myth", false, 4).unwrap_err();
        assert!(matches!(err, WrangleError::UndefinedResponse { ref topic, row: 4 } if topic == "myth"));
    }

    #[test]
    fn unique_top_wins() {
        let c = vote(&[Yes, Yes, No]);
        assert_eq!(c.choice, Yes);
        assert!((c.score - 2.0 / 3.0).abs() < 1e-12);
        let c = vote(&[Unsure, No, Unsure]);
        assert_eq!(c.choice, Unsure);
    }

    #[test]
    fn unanimous_scores_one() {
        for ch in [Yes, No, Unsure, BrokenLinks] {
            let c = vote(&[ch, ch, ch]);
            assert_eq!(c.choice, ch);
            assert_eq!(c.score, 1.0);
        }
    }

    #[test]
    fn uniform_tie_is_unsure() {
        let c = vote(&[Yes, No, Unsure]);
        assert_eq!(c.choice, Unsure);
        assert!((c.score - 1.0 / 3.0).abs() < 1e-12);

        let c = vote(&[Yes, No, Yes, No]);
        assert_eq!(c, Consensus { choice: Unsure, score: 0.5 });
    }

    #[test]
    fn unsure_tied_on_top_yields_to_runner_up() {
        // unsure=2, yes=2, no=1: label order puts unsure first, runner-up yes wins
        let c = vote(&[Unsure, Yes, Unsure, Yes, No]);
        assert_eq!(c, Consensus { choice: Yes, score: 0.4 });
    }

    #[test]
    fn substantive_first_in_tie_is_kept() {
        // no=2, unsure=2, yes=1: `no` ranks first and is not unsure
        let c = vote(&[No, Unsure, No, Unsure, Yes]);
        assert_eq!(c, Consensus { choice: No, score: 0.4 });
        // no=2, yes=2, unsure=1
        let c = vote(&[Yes, No, Yes, No, Unsure]);
        assert_eq!(c, Consensus { choice: No, score: 0.4 });
    }

    #[test]
    fn score_uses_configured_rater_count() {
        let c = majority_vote(&[Yes, Yes], 4).unwrap();
        assert_eq!(c.score, 0.5);
        assert!(majority_vote(&[], 3).is_none());
    }

    #[test]
    fn tally_orders_ties_by_label() {
        assert_eq!(tally(&[Yes, No, Unsure, No]), vec![(No, 2), (Unsure, 1), (Yes, 1)]);
    }
}
