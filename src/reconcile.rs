//! Reconcile MTurk results (`<base>-results.csv`, R ratings per task) into one
//! consensus row per item (`<base>-labeled.csv`).

use crate::config::{QuestionSpec, ReconcileOptions};
use crate::error::WrangleError;
use crate::progress::ProgressScope;
use crate::util::{init_tracing_once, with_suffix};
use crate::vote::{majority_vote, merge_radios, Choice, Consensus, RadioFlags};
use anyhow::{Context, Result};
use csv::{QuoteStyle, StringRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const RESULTS_SUFFIX: &str = "-results.csv";
pub const LABELED_SUFFIX: &str = "-labeled.csv";

/// One reconciled item: consensus per configured question, in question order.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledItem {
    pub item_id: String,
    pub text: String,
    pub answers: Vec<Consensus>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub source: PathBuf,
    pub target: PathBuf,
    pub items: usize,
}

/// Column positions of one question's radio buttons.
struct RadioCols {
    yes: usize,
    no: usize,
    unsure: usize,
    broken_links: Option<usize>,
}

impl RadioCols {
    fn resolve(headers: &StringRecord, prefix: &str, q: &QuestionSpec) -> Result<Self, WrangleError> {
        let name = |choice: &str| format!("{}{}_{}.on", prefix, q.topic, choice);
        let required = |choice: &str| {
            let col = name(choice);
            column_index(headers, &col).ok_or(WrangleError::MissingColumn(col))
        };
        Ok(Self {
            yes: required("yes")?,
            no: required("no")?,
            unsure: required("unsure")?,
            broken_links: column_index(headers, &name("broken_links")),
        })
    }

    fn flags(&self, rec: &StringRecord) -> RadioFlags {
        let get = |i: usize| parse_flag(rec.get(i).unwrap_or(""));
        RadioFlags {
            yes: get(self.yes),
            no: get(self.no),
            unsure: get(self.unsure),
            broken_links: self.broken_links.map(get),
        }
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require_column(headers: &StringRecord, name: &str) -> Result<usize, WrangleError> {
    column_index(headers, name).ok_or_else(|| WrangleError::MissingColumn(name.to_string()))
}

/// MTurk exports radio state as `true`/`false`.
fn parse_flag(s: &str) -> bool {
    let t = s.trim();
    t.eq_ignore_ascii_case("true") || t == "1"
}

/// Scores print like floats even when whole (`1.0`, `0.6666666666666666`).
pub fn format_score(score: f64) -> String {
    if score.is_finite() && score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        format!("{}", score)
    }
}

/// Merge, validate and aggregate ratings already in memory.
///
/// Validation order: every required question answered, no empty answer cells,
/// every task rated exactly `rater_count` times. Any failure aborts the whole file.
pub fn reconcile_records(headers: &StringRecord, records: &[StringRecord], opts: &ReconcileOptions) -> Result<Vec<LabeledItem>> {
    if opts.rater_count == 0 {
        return Err(WrangleError::Config("rater count must be at least 1".into()).into());
    }
    let task_idx = require_column(headers, &opts.task_col)?;
    let id_idx = require_column(headers, &opts.item_id_col)?;
    let text_idx = require_column(headers, &opts.text_col)?;
    let radios = opts
        .questions
        .iter()
        .map(|q| RadioCols::resolve(headers, &opts.answer_prefix, q))
        .collect::<Result<Vec<_>, _>>()?;

    // per row, per question
    let mut merged: Vec<Vec<Choice>> = Vec::with_capacity(records.len());
    for (row, rec) in records.iter().enumerate() {
        let choices = opts
            .questions
            .iter()
            .zip(&radios)
            .map(|(q, cols)| merge_radios(&cols.flags(rec), &q.topic, q.optional, row))
            .collect::<Result<Vec<_>, _>>()?;
        merged.push(choices);
    }

    let answer_cols: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with(&opts.answer_prefix))
        .collect();
    for (row, rec) in records.iter().enumerate() {
        for (idx, name) in &answer_cols {
            if rec.get(*idx).map(|v| v.trim().is_empty()).unwrap_or(true) {
                return Err(WrangleError::NullAnswer { column: name.to_string(), row }.into());
            }
        }
    }

    let mut group_sizes: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in records {
        *group_sizes.entry(rec.get(task_idx).unwrap_or("")).or_insert(0) += 1;
    }
    if let Some((task, found)) = group_sizes.iter().find(|(_, n)| **n != opts.rater_count) {
        return Err(WrangleError::RaterCount {
            task: task.to_string(),
            expected: opts.rater_count,
            found: *found,
        }
        .into());
    }

    // stable sort keeps each task's ratings in file order
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|a, b| records[*a].get(task_idx).cmp(&records[*b].get(task_idx)));

    let groups = order.chunks(opts.rater_count);
    let progress = ProgressScope::count(opts.progress, "Converting MTurk results", groups.len() as u64);
    let mut items = Vec::with_capacity(groups.len());
    for group in groups {
        let first = &records[group[0]];
        let answers = (0..opts.questions.len())
            .map(|qi| {
                let votes: Vec<Choice> = group.iter().map(|&r| merged[r][qi]).collect();
                majority_vote(&votes, opts.rater_count)
                    .ok_or_else(|| anyhow::anyhow!("empty rating group"))
            })
            .collect::<Result<Vec<_>>>()?;
        items.push(LabeledItem {
            item_id: first.get(id_idx).unwrap_or("").to_string(),
            text: first.get(text_idx).unwrap_or("").to_string(),
            answers,
        });
        progress.inc_items(1);
    }
    progress.finish("Converted");
    Ok(items)
}

/// Fully quoted; embedded quotes are doubled.
pub fn write_labeled(path: &Path, items: &[LabeledItem], opts: &ReconcileOptions) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    w.write_record(opts.output_header())?;
    for item in items {
        let mut rec = vec![item.item_id.clone(), item.text.clone()];
        for c in &item.answers {
            rec.push(c.choice.to_string());
            rec.push(format_score(c.score));
        }
        w.write_record(&rec)?;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// Read `<base>-results.csv`, reconcile, write `<base>-labeled.csv`.
/// The output file is only created once every check has passed.
pub fn reconcile_file(base: &Path, opts: &ReconcileOptions) -> Result<ReconcileReport> {
    init_tracing_once();
    let source = with_suffix(base, RESULTS_SUFFIX);
    let target = with_suffix(base, LABELED_SUFFIX);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&source)
        .with_context(|| format!("open {}", source.display()))?;
    let headers = rdr.headers()?.clone();
    let records = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("read {}", source.display()))?;

    tracing::info!("Converting MTurk results at {}...", source.display());
    let items = reconcile_records(&headers, &records, opts).with_context(|| format!("reconcile {}", source.display()))?;
    write_labeled(&target, &items, opts)?;
    tracing::info!(items = items.len(), "Converted and saved to {}", target.display());

    Ok(ReconcileReport { source, target, items: items.len() })
}

/// Process every base path in order; the first failure stops the batch.
pub fn reconcile_all<P: AsRef<Path>>(bases: &[P], opts: &ReconcileOptions) -> Result<Vec<ReconcileReport>> {
    let mut reports = Vec::with_capacity(bases.len());
    for base in bases {
        reports.push(reconcile_file(base.as_ref(), opts)?);
    }
    tracing::info!("Done converting {} MTurk results files.", reports.len());
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &[&str] = &[
        "HITId", "AssignmentId", "Input.id_str", "Input.full_text_censored",
        "Answer.myth_yes.on", "Answer.myth_no.on", "Answer.myth_unsure.on",
        "Answer.myth_supports_yes.on", "Answer.myth_supports_no.on", "Answer.myth_supports_unsure.on",
    ];

    fn rec(hit: &str, id: &str, myth: &str, supports: &str) -> StringRecord {
        let flag = |want: &str, choice: &str| if want == choice { "true" } else { "false" };
        StringRecord::from(vec![
            hit, "a", id, "some text",
            flag(myth, "yes"), flag(myth, "no"), flag(myth, "unsure"),
            flag(supports, "yes"), flag(supports, "no"), flag(supports, "unsure"),
        ])
    }

    fn opts() -> ReconcileOptions {
        ReconcileOptions::default().with_progress(false)
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(1.0), "1.0");
        assert_eq!(format_score(2.0 / 3.0), "0.6666666666666666");
        assert_eq!(format_score(1.0 / 3.0), "0.3333333333333333");
    }

    #[test]
    fn groups_by_task_after_sorting() {
        let h = StringRecord::from(HEADER.to_vec());
        let rows = vec![
            rec("H2", "200", "no", "-"),
            rec("H1", "100", "yes", "yes"),
            rec("H2", "200", "no", "-"),
            rec("H1", "100", "yes", "no"),
            rec("H1", "100", "no", "no"),
            rec("H2", "200", "unsure", "-"),
        ];
        let items = reconcile_records(&h, &rows, &opts()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_id, "100");
        assert_eq!(items[0].answers[0].choice, Choice::Yes);
        assert_eq!(items[0].answers[1].choice, Choice::No);
        assert_eq!(items[1].item_id, "200");
        assert_eq!(items[1].answers[0].choice, Choice::No);
        // optional question left blank by every rater
        assert_eq!(items[1].answers[1], Consensus { choice: Choice::No, score: 1.0 });
    }

    #[test]
    fn wrong_group_size_names_counts() {
        let h = StringRecord::from(HEADER.to_vec());
        let rows = vec![rec("H1", "1", "yes", "no"), rec("H1", "1", "yes", "no")];
        let err = reconcile_records(&h, &rows, &opts()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not equal to 3"), "{msg}");
        assert!(msg.contains("found 2"), "{msg}");
    }

    #[test]
    fn unanswered_required_question_fails() {
        let h = StringRecord::from(HEADER.to_vec());
        let rows = vec![rec("H1", "1", "yes", "no"), rec("H1", "1", "-", "no"), rec("H1", "1", "yes", "no")];
        let err = reconcile_records(&h, &rows, &opts()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WrangleError>(),
            Some(WrangleError::UndefinedResponse { row: 1, .. })
        ));
    }

    #[test]
    fn empty_answer_cell_fails() {
        let h = StringRecord::from(HEADER.to_vec());
        let mut bad: Vec<String> = rec("H1", "1", "yes", "no").iter().map(String::from).collect();
        bad[5] = String::new();
        let rows = vec![rec("H1", "1", "yes", "no"), StringRecord::from(bad), rec("H1", "1", "yes", "no")];
        let err = reconcile_records(&h, &rows, &opts()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WrangleError>(),
            Some(WrangleError::NullAnswer { row: 1, .. })
        ));
    }

    #[test]
    fn missing_radio_column_fails() {
        let h = StringRecord::from(vec!["HITId", "Input.id_str", "Input.full_text_censored", "Answer.myth_yes.on"]);
        let err = reconcile_records(&h, &[], &opts()).unwrap_err();
        assert!(err.to_string().contains("Answer.myth_no.on"));
    }
}
