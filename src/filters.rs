//! Compiled phrase predicate over a text column.
//!
//! OR mode uses a single alternation bounded by start/end of text or whitespace, so
//! a phrase glued to punctuation (`love!`) does not match unless punctuation was
//! stripped beforehand. AND mode checks each phrase on its own with `\b` boundaries,
//! so order and overlap do not matter.

use crate::query::{PhraseConditional, PhraseQuery};
use anyhow::{Context, Result};
use regex::Regex;

#[derive(Clone, Debug)]
pub enum PhraseMatcher {
    Any(Regex),
    All(Vec<Regex>),
}

impl PhraseMatcher {
    pub fn new(q: &PhraseQuery) -> Result<Self> {
        match q.conditional {
            PhraseConditional::Or => {
                let alts: Vec<String> = q.phrases.iter().map(|p| regex::escape(p)).collect();
                let pat = format!(r"(^|\s)({})(\s|$)", alts.join("|"));
                let re = Regex::new(&pat).with_context(|| format!("compile phrase regex {}", pat))?;
                Ok(PhraseMatcher::Any(re))
            }
            PhraseConditional::And => {
                let res = q
                    .phrases
                    .iter()
                    .map(|p| {
                        let pat = format!(r"\b{}\b", regex::escape(p));
                        Regex::new(&pat).with_context(|| format!("compile phrase regex {}", pat))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(PhraseMatcher::All(res))
            }
        }
    }

    /// Case-insensitive: the text is lowered before matching (phrases already are).
    pub fn is_match(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        match self {
            PhraseMatcher::Any(re) => re.is_match(&lowered),
            PhraseMatcher::All(res) => res.iter().all(|re| re.is_match(&lowered)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(phrases: &[&str], cond: PhraseConditional) -> PhraseMatcher {
        PhraseMatcher::new(&PhraseQuery::new(phrases.iter().copied(), cond).unwrap()).unwrap()
    }

    #[test]
    fn or_mode_requires_whitespace_boundaries() {
        let m = matcher(&["love"], PhraseConditional::Or);
        assert!(m.is_match("I love this"));
        assert!(m.is_match("LOVE"));
        assert!(!m.is_match("beloved"));
        assert!(!m.is_match("I love, this"));
    }

    #[test]
    fn or_mode_matches_any_phrase() {
        let m = matcher(&["efforts", "cut the field"], PhraseConditional::Or);
        assert!(m.is_match("they will Cut The Field soon"));
        assert!(m.is_match("efforts"));
        assert!(!m.is_match("cut  the field"));
        assert!(!m.is_match("nothing here"));
    }

    #[test]
    fn and_mode_needs_every_phrase_in_any_order() {
        let m = matcher(&["already", "cut the field"], PhraseConditional::And);
        assert!(m.is_match("They already cut the field."));
        assert!(m.is_match("cut the field? Already!"));
        assert!(!m.is_match("already done"));
        assert!(!m.is_match("cut the field"));
        assert!(!m.is_match("alreadyx cut the field"));
    }

    #[test]
    fn phrases_are_literal() {
        let m = matcher(&["a.b"], PhraseConditional::Or);
        assert!(m.is_match("see a.b now"));
        assert!(!m.is_match("see axb now"));
    }
}
