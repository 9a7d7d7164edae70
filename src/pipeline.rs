use crate::concurrency::{install_parallelism, par_retain};
use crate::config::SampleOptions;
use crate::date::{format_date, tweet_date};
use crate::error::WrangleError;
use crate::filters::PhraseMatcher;
use crate::loader::JsonLoader;
use crate::preprocess::{preprocess, Preprocessing};
use crate::query::{PhraseConditional, PhraseQuery};
use crate::storage::ObjectStore;
use crate::table::{cell_str, Row, Table};
use crate::util::{init_tracing_once, output_filename};
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use time::Date;

/// Columns every sample carries, ahead of the target text column.
pub const DEFAULT_COLUMNS: [&str; 2] = ["id_str", "date"];

/// Outcome of one sampling run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SampleReport {
    pub output: PathBuf,
    pub loaded: usize,
    pub matched: usize,
    pub written: usize,
}

/// Filters posts by phrase, optionally subsamples, projects columns and writes a CSV.
#[derive(Clone, Debug, Default)]
pub struct PhraseSampler {
    pub(crate) opts: SampleOptions,
}

impl PhraseSampler {
    pub fn new() -> Self {
        Self { opts: SampleOptions::default() }
    }

    pub fn from_options(opts: SampleOptions) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn input(mut self, input: impl Into<String>) -> Self { self.opts = self.opts.with_input(input); self }
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn phrases<I, S>(mut self, phrases: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.opts = self.opts.with_phrases(phrases); self }
    pub fn conditional(mut self, c: PhraseConditional) -> Self { self.opts = self.opts.with_conditional(c); self }
    pub fn limit(mut self, limit: Option<usize>) -> Self { self.opts = self.opts.with_limit(limit); self }
    pub fn lang(mut self, lang: Option<String>) -> Self { self.opts = self.opts.with_lang(lang); self }
    pub fn target_attr(mut self, attr: impl Into<String>) -> Self { self.opts = self.opts.with_target_attr(attr); self }
    pub fn additional_cols<I, S>(mut self, cols: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.opts = self.opts.with_additional_cols(cols); self }
    pub fn preprocessing(mut self, choices: Vec<Preprocessing>) -> Self { self.opts = self.opts.with_preprocessing(choices); self }
    pub fn dataset(mut self, dataset: Option<String>) -> Self { self.opts = self.opts.with_dataset(dataset); self }
    pub fn date_range(mut self, start: Option<Date>, end: Option<Date>) -> Self { self.opts = self.opts.with_date_range(start, end); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }

    pub fn options(&self) -> &SampleOptions {
        &self.opts
    }

    /// `{start}_{end}_{dataset}_Sample_{limit}_{target}.csv` under the output dir.
    pub fn output_path(&self) -> PathBuf {
        let o = &self.opts;
        output_filename(
            &o.output_dir,
            &[
                o.start_date.map(format_date),
                o.end_date.map(format_date),
                o.dataset.clone(),
                Some("Sample".to_string()),
                o.limit.filter(|&l| l > 0).map(|l| l.to_string()),
                Some(o.target_attr.clone()),
            ],
        )
    }

    /// Run with an unseeded thread-local RNG.
    pub fn run(&self, store: Option<&dyn ObjectStore>) -> Result<SampleReport> {
        self.run_with_rng(store, &mut rand::rng())
    }

    pub fn run_with_rng<R: Rng + ?Sized>(&self, store: Option<&dyn ObjectStore>, rng: &mut R) -> Result<SampleReport> {
        init_tracing_once();
        let o = &self.opts;

        // configuration checks happen before any data is read
        if o.input.trim().is_empty() {
            return Err(WrangleError::Config("input is required".into()).into());
        }
        let query = PhraseQuery::new(&o.phrases, o.conditional)?;
        let matcher = PhraseMatcher::new(&query)?;
        install_parallelism(o.parallelism);

        let output = self.output_path();
        tracing::info!(output = %output.display(), conditional = %o.conditional, "sampling phrases {:?}", query.phrases);

        let mut loader = JsonLoader::new().io_read_buffer(o.read_buffer_bytes).progress(o.progress);
        if let Some(s) = store {
            loader = loader.store(s);
        }
        let mut table = loader.load(&o.input)?;
        let loaded = table.len();

        if let Some(lang) = &o.lang {
            table.retain(|r| cell_str(r, "lang").map(|l| l.eq_ignore_ascii_case(lang)).unwrap_or(false));
            tracing::debug!(lang = %lang, rows = table.len(), "after language filter");
        }

        ensure_date_column(&mut table);
        if o.start_date.is_some() || o.end_date.is_some() {
            let (lo, hi) = (o.start_date, o.end_date);
            table.retain(|r| {
                match cell_str(r, "date").as_deref().and_then(tweet_date) {
                    Some(d) => lo.map_or(true, |lo| d >= lo) && hi.map_or(true, |hi| d <= hi),
                    None => false,
                }
            });
        }

        if !table.is_empty() && !table.has_column(&o.target_attr) {
            return Err(WrangleError::MissingColumn(o.target_attr.clone()).into());
        }

        let target = o.target_attr.as_str();
        let steps = o.preprocessing.as_slice();
        par_retain(&mut table, |r| match cell_str(r, target) {
            Some(text) => matcher.is_match(&preprocess(&text, steps)),
            None => false,
        });
        let matched = table.len();
        tracing::info!(loaded, matched, "phrase filter done");

        sample_rows(&mut table.rows, o.limit, rng);
        let cols = project_columns(&table, target, &o.additional_cols);
        let projected = table.select(&cols);

        write_csv(&projected, &output)?;
        tracing::info!(rows = projected.len(), "output file: {}", output.display());

        Ok(SampleReport { output, loaded, matched, written: projected.len() })
    }
}

/// Uniform sample without replacement: shuffle, then keep the first `limit`.
/// `None`, `Some(0)`, or a limit at or above the row count, keeps every row
/// (still shuffled when limited).
pub fn sample_rows<T, R: Rng + ?Sized>(rows: &mut Vec<T>, limit: Option<usize>, rng: &mut R) {
    if let Some(limit) = limit.filter(|&n| n > 0) {
        rows.shuffle(rng);
        rows.truncate(limit);
    }
}

/// `id_str`, `date`, the target column, then each extra column that exists in the schema.
pub fn project_columns(table: &Table, target: &str, additional: &[String]) -> Vec<String> {
    let mut cols: Vec<String> = DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
    cols.push(target.to_string());
    for extra in additional {
        if table.has_column(extra) {
            cols.push(extra.clone());
        } else {
            tracing::debug!(column = %extra, "dropping unknown column");
        }
    }
    Table::dedup_columns(cols)
}

/// Derive a `YYYY-MM-DD` `date` column from `created_at` when the input has none.
pub fn ensure_date_column(table: &mut Table) {
    if table.has_column("date") || !table.has_column("created_at") {
        return;
    }
    for row in table.rows.iter_mut() {
        let d = cell_str(row, "created_at").as_deref().and_then(tweet_date);
        row.insert("date".to_string(), d.map(|d| Value::String(format_date(d))).unwrap_or(Value::Null));
    }
    table.add_column("date".to_string());
}

/// Comma-delimited with a header row. Nested values are written as compact JSON.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let mut w = csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    w.write_record(&table.columns)?;
    for row in &table.rows {
        w.write_record(table.columns.iter().map(|c| csv_cell(row, c)))?;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

fn csv_cell(row: &Row, col: &str) -> String {
    cell_str(row, col).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn sampling_limits() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut v: Vec<u32> = (0..10).collect();
        sample_rows(&mut v, Some(3), &mut rng);
        assert_eq!(v.len(), 3);
        let mut s = v.clone();
        s.sort();
        s.dedup();
        assert_eq!(s.len(), 3, "no replacement");

        let mut v: Vec<u32> = (0..4).collect();
        sample_rows(&mut v, Some(10), &mut rng);
        assert_eq!(v.len(), 4);

        let mut v: Vec<u32> = (0..4).collect();
        sample_rows(&mut v, None, &mut rng);
        assert_eq!(v, vec![0, 1, 2, 3]);

        let mut v: Vec<u32> = (0..4).collect();
        sample_rows(&mut v, Some(0), &mut rng);
        assert_eq!(v, vec![0, 1, 2, 3]);
    }

    #[test]
    fn projection_drops_unknown_columns() {
        let t = Table::from_rows(vec![json!({"id_str": "1", "date": "2020-01-01", "full_text": "x", "lang": "en"})
            .as_object()
            .cloned()
            .unwrap()]);
        let cols = project_columns(&t, "full_text", &["lang".into(), "nope".into(), "date".into()]);
        assert_eq!(cols, vec!["id_str", "date", "full_text", "lang"]);
    }

    #[test]
    fn date_derived_from_created_at() {
        let mut t = Table::from_rows(vec![json!({"created_at": "Wed Oct 10 20:19:24 +0000 2018"})
            .as_object()
            .cloned()
            .unwrap()]);
        ensure_date_column(&mut t);
        assert_eq!(t.rows[0]["date"], json!("2018-10-10"));
        assert!(t.has_column("date"));
    }

    #[test]
    fn output_path_follows_convention() {
        let s = PhraseSampler::new()
            .output_dir("out")
            .dataset(Some("election2020".into()))
            .limit(Some(5));
        assert_eq!(s.output_path(), PathBuf::from("out/election2020_Sample_5_full_text.csv"));
    }
}
