use crate::preprocess::Preprocessing;
use crate::query::PhraseConditional;
use std::path::{Path, PathBuf};
use time::Date;

/// Options for the phrase-sampling job, with builder chaining.
#[derive(Clone, Debug)]
pub struct SampleOptions {
    pub input: String,                      // local path or gs:// URL
    pub output_dir: PathBuf,
    pub phrases: Vec<String>,
    pub conditional: PhraseConditional,
    pub limit: Option<usize>,               // None keeps every match
    pub lang: Option<String>,               // keep rows whose `lang` equals this
    pub target_attr: String,                // text column searched
    pub additional_cols: Vec<String>,       // kept only if present in the schema
    pub preprocessing: Vec<Preprocessing>,
    pub dataset: Option<String>,            // filename component
    pub start_date: Option<Date>,           // filename component + row bound
    pub end_date: Option<Date>,
    pub parallelism: Option<usize>,         // Some(N) to set rayon threads
    pub progress: bool,
    pub read_buffer_bytes: usize,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            input: String::new(),
            output_dir: PathBuf::from("output"),
            phrases: Vec::new(),
            conditional: PhraseConditional::Or,
            limit: None,
            lang: None,
            target_attr: "full_text".to_string(),
            additional_cols: Vec::new(),
            preprocessing: Preprocessing::defaults(),
            dataset: None,
            start_date: None,
            end_date: None,
            parallelism: None,
            progress: true,
            read_buffer_bytes: 256 * 1024,
        }
    }
}

impl SampleOptions {
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phrases = phrases.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_conditional(mut self, c: PhraseConditional) -> Self {
        self.conditional = c;
        self
    }
    /// A limit of 0 means no limit.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&n| n > 0);
        self
    }
    pub fn with_lang(mut self, lang: Option<String>) -> Self {
        self.lang = lang.map(|l| l.trim().to_lowercase()).filter(|l| !l.is_empty());
        self
    }
    pub fn with_target_attr(mut self, attr: impl Into<String>) -> Self {
        self.target_attr = attr.into();
        self
    }
    pub fn with_additional_cols<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_cols = cols.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_preprocessing(mut self, choices: Vec<Preprocessing>) -> Self {
        self.preprocessing = choices;
        self
    }
    pub fn with_dataset(mut self, dataset: Option<String>) -> Self {
        self.dataset = dataset;
        self
    }
    pub fn with_date_range(mut self, start: Option<Date>, end: Option<Date>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
}

/// One MTurk question encoded as a set of radio-button boolean columns
/// named `{prefix}{topic}_{choice}.on`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionSpec {
    pub topic: String,
    pub label_col: String,  // output column holding the consensus choice
    pub score_col: String,  // output column holding the agreement score
    pub optional: bool,     // no answer means `no`
}

impl QuestionSpec {
    pub fn new(topic: impl Into<String>, optional: bool) -> Self {
        let topic = topic.into();
        Self {
            label_col: format!("is_{}", topic),
            score_col: format!("{}_score", topic),
            topic,
            optional,
        }
    }
}

/// Options for reconciling MTurk results, with builder chaining.
#[derive(Clone, Debug)]
pub struct ReconcileOptions {
    pub rater_count: usize,
    pub task_col: String,
    pub item_id_col: String,
    pub text_col: String,
    pub answer_prefix: String,
    pub output_id_col: String,
    pub output_text_col: String,
    pub questions: Vec<QuestionSpec>,
    pub progress: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            rater_count: 3,
            task_col: "HITId".to_string(),
            item_id_col: "Input.id_str".to_string(),
            text_col: "Input.full_text_censored".to_string(),
            answer_prefix: "Answer.".to_string(),
            output_id_col: "tweet_id".to_string(),
            output_text_col: "text".to_string(),
            questions: vec![QuestionSpec::new("myth", false), QuestionSpec::new("myth_supports", true)],
            progress: true,
        }
    }
}

impl ReconcileOptions {
    pub fn with_rater_count(mut self, n: usize) -> Self {
        self.rater_count = n;
        self
    }
    pub fn with_task_col(mut self, col: impl Into<String>) -> Self {
        self.task_col = col.into();
        self
    }
    pub fn with_item_cols(mut self, id_col: impl Into<String>, text_col: impl Into<String>) -> Self {
        self.item_id_col = id_col.into();
        self.text_col = text_col.into();
        self
    }
    pub fn with_answer_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.answer_prefix = prefix.into();
        self
    }
    pub fn with_questions(mut self, questions: Vec<QuestionSpec>) -> Self {
        self.questions = questions;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    /// Fixed output header: id, text, then label/score per question.
    pub fn output_header(&self) -> Vec<String> {
        let mut h = vec![self.output_id_col.clone(), self.output_text_col.clone()];
        for q in &self.questions {
            h.push(q.label_col.clone());
            h.push(q.score_col.clone());
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_header_matches_labeled_layout() {
        let h = ReconcileOptions::default().output_header();
        assert_eq!(h, vec!["tweet_id", "text", "is_myth", "myth_score", "is_myth_supports", "myth_supports_score"]);
    }

    #[test]
    fn lang_is_normalized() {
        let o = SampleOptions::default().with_lang(Some(" EN ".into()));
        assert_eq!(o.lang.as_deref(), Some("en"));
        let o = SampleOptions::default().with_lang(Some("".into()));
        assert_eq!(o.lang, None);
    }
}
