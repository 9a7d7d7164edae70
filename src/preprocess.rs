//! Text normalization applied to the target column before phrase matching.

use crate::error::WrangleError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Declaration order is the order steps are applied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Preprocessing {
    Lowercase,
    Contractions,
    Punctuation,
    Stopwords,
    Stemmed,
}

impl Preprocessing {
    pub fn defaults() -> Vec<Preprocessing> {
        vec![Preprocessing::Lowercase, Preprocessing::Contractions, Preprocessing::Punctuation]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lowercase => "lowercase",
            Self::Contractions => "contractions",
            Self::Punctuation => "punctuation",
            Self::Stopwords => "stopwords",
            Self::Stemmed => "stemmed",
        }
    }
}

impl FromStr for Preprocessing {
    type Err = WrangleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowercase" => Ok(Self::Lowercase),
            "contractions" => Ok(Self::Contractions),
            "punctuation" => Ok(Self::Punctuation),
            "stopwords" => Ok(Self::Stopwords),
            "stemmed" => Ok(Self::Stemmed),
            other => Err(WrangleError::Config(format!("unknown preprocessing choice `{}`", other))),
        }
    }
}

impl fmt::Display for Preprocessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CONTRACTIONS: &[(&str, &str)] = &[
    ("won't", "will not"),
    ("can't", "cannot"),
    ("shan't", "shall not"),
    ("ain't", "is not"),
    ("let's", "let us"),
    ("y'all", "you all"),
    ("n't", " not"),
    ("'re", " are"),
    ("'ve", " have"),
    ("'ll", " will"),
    ("'d", " would"),
    ("'m", " am"),
];

fn stop_words() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| {
        [
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into",
            "is", "it", "its", "of", "on", "or", "so", "such", "that", "the", "their", "then",
            "there", "these", "they", "this", "to", "was", "were", "will", "with", "i", "me",
            "my", "we", "our", "you", "your", "he", "she", "him", "her", "his", "them", "what",
            "which", "who", "whom", "am", "been", "being", "have", "has", "had", "do", "does",
            "did", "from", "up", "down", "out", "off", "over", "under", "again", "just", "than",
            "too", "very",
        ]
        .into_iter()
        .collect()
    })
}

/// Apply the chosen steps in canonical order. Duplicates are ignored.
pub fn preprocess(text: &str, choices: &[Preprocessing]) -> String {
    let mut steps = choices.to_vec();
    steps.sort();
    steps.dedup();

    let mut out = text.to_string();
    for step in steps {
        out = match step {
            Preprocessing::Lowercase => out.to_lowercase(),
            Preprocessing::Contractions => expand_contractions(&out),
            Preprocessing::Punctuation => strip_punctuation(&out),
            Preprocessing::Stopwords => out
                .split_whitespace()
                .filter(|w| !stop_words().contains(w.to_lowercase().as_str()))
                .collect::<Vec<_>>()
                .join(" "),
            Preprocessing::Stemmed => out.split_whitespace().map(stem).collect::<Vec<_>>().join(" "),
        };
    }
    out
}

fn expand_contractions(s: &str) -> String {
    let mut out = s.replace('\u{2019}', "'");
    for (from, to) in CONTRACTIONS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out
}

/// Non-alphanumeric, non-whitespace chars become spaces; runs of whitespace collapse.
fn strip_punctuation(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Light suffix stripping for plurals and common verb endings.
fn stem(word: &str) -> String {
    let w = word;
    let n = w.chars().count();
    let strip = |suffix: &str, keep_min: usize| -> Option<String> {
        if w.ends_with(suffix) && n >= suffix.len() + keep_min {
            Some(w[..w.len() - suffix.len()].to_string())
        } else {
            None
        }
    };
    if let Some(base) = strip("sses", 2) { return base + "ss"; }
    if let Some(base) = strip("ies", 2) { return base + "i"; }
    if w.ends_with("ss") { return w.to_string(); }
    strip("ing", 3)
        .or_else(|| strip("ed", 3))
        .or_else(|| strip("ly", 3))
        .or_else(|| strip("s", 3))
        .unwrap_or_else(|| w.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline() {
        let out = preprocess("We CAN'T stop, won't stop!!", &Preprocessing::defaults());
        assert_eq!(out, "we cannot stop will not stop");
    }

    #[test]
    fn order_is_canonical_not_caller_given() {
        let a = preprocess("Hello, World", &[Preprocessing::Punctuation, Preprocessing::Lowercase]);
        let b = preprocess("Hello, World", &[Preprocessing::Lowercase, Preprocessing::Punctuation]);
        assert_eq!(a, b);
        assert_eq!(a, "hello world");
    }

    #[test]
    fn stopwords_and_stems() {
        let out = preprocess("the dogs are running to the parks", &[Preprocessing::Stopwords]);
        assert_eq!(out, "dogs running parks");
        let out = preprocess("dogs running parks classes", &[Preprocessing::Stemmed]);
        assert_eq!(out, "dog runn park class");
    }

    #[test]
    fn parse_choices() {
        assert_eq!("Stemmed".parse::<Preprocessing>().unwrap(), Preprocessing::Stemmed);
        assert!("lemmatize".parse::<Preprocessing>().is_err());
    }
}
