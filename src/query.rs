//! Phrase query specification and normalization helpers used by the filters.

use crate::error::WrangleError;
use std::fmt;
use std::str::FromStr;

/// How multiple phrases combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PhraseConditional {
    And,
    #[default]
    Or,
}

impl FromStr for PhraseConditional {
    type Err = WrangleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(WrangleError::Config(format!("phrase conditional must be AND or OR, got `{}`", other))),
        }
    }
}

impl fmt::Display for PhraseConditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

/// Phrases to search for, stored lowercase and whitespace-trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhraseQuery {
    pub phrases: Vec<String>,
    pub conditional: PhraseConditional,
}

impl PhraseQuery {
    /// An empty phrase list (or one made only of blank phrases) is a configuration error.
    pub fn new<I, S>(phrases: I, conditional: PhraseConditional) -> Result<Self, WrangleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| normalize_phrase(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        if phrases.is_empty() {
            return Err(WrangleError::Config("at least one phrase is required".into()));
        }
        Ok(Self { phrases, conditional })
    }
}

#[inline]
pub fn normalize_phrase(s: &str) -> String {
    s.trim().to_lowercase()
}
