//! Sample tweets containing specific phrases.
//!
//! ```bash
//! sample_phrases --input "data/election2020/#2020election_20190616.json" \
//!     --output output/ --phrases "already" "cut the field" \
//!     --limit 5 --lang en --phrase_conditional AND
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use time::Date;
use tweetwrangle::{
    init_tracing_once, parse_date_arg, GcsClient, ObjectStore, PhraseConditional, PhraseSampler, Preprocessing,
    StorageConfig,
};

#[derive(Parser, Debug)]
#[command(name = "sample_phrases")]
#[command(about = "Sample tweets whose text contains one or more phrases")]
struct Args {
    /// Local JSON(-lines) file, directory of such files, or gs://bucket/object.json.gz
    #[arg(long)]
    input: String,

    /// Output directory for the sample CSV
    #[arg(long)]
    output: PathBuf,

    /// One or more words or phrases to search in the target attribute
    #[arg(long, num_args = 1.., required = true)]
    phrases: Vec<String>,

    /// Number of tweets to return (random sample)
    #[arg(long)]
    limit: Option<usize>,

    /// Conditional expression for phrases
    #[arg(long = "phrase_conditional", default_value = "OR", value_parser = parse_conditional)]
    phrase_conditional: PhraseConditional,

    /// Keep only tweets in this language
    #[arg(long)]
    lang: Option<String>,

    /// Additional attributes to include in the output
    #[arg(long = "additional_col_attributes", num_args = 1..)]
    additional_col_attributes: Vec<String>,

    /// Text preprocessing applied before matching
    #[arg(
        long = "preprocessing_choices",
        num_args = 1..,
        default_values_t = Preprocessing::defaults(),
        value_parser = parse_preprocessing
    )]
    preprocessing_choices: Vec<Preprocessing>,

    /// Text attribute to search
    #[arg(long = "target_attr", default_value = "full_text")]
    target_attr: String,

    /// Dataset name used in the output filename
    #[arg(long)]
    dataset: Option<String>,

    /// First day (YYYY-MM-DD) to keep
    #[arg(long = "start_date", value_parser = parse_date_arg)]
    start_date: Option<Date>,

    /// Last day (YYYY-MM-DD) to keep
    #[arg(long = "end_date", value_parser = parse_date_arg)]
    end_date: Option<Date>,

    /// Worker threads for matching (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Disable progress bars
    #[arg(long = "no-progress")]
    no_progress: bool,

    /// Print the run report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn parse_conditional(s: &str) -> Result<PhraseConditional, String> {
    s.parse().map_err(|e: tweetwrangle::WrangleError| e.to_string())
}

fn parse_preprocessing(s: &str) -> Result<Preprocessing, String> {
    s.parse().map_err(|e: tweetwrangle::WrangleError| e.to_string())
}

fn main() -> Result<()> {
    init_tracing_once();
    let args = Args::parse();

    let mut sampler = PhraseSampler::new()
        .input(&args.input)
        .output_dir(&args.output)
        .phrases(args.phrases)
        .conditional(args.phrase_conditional)
        .limit(args.limit)
        .lang(args.lang)
        .additional_cols(args.additional_col_attributes)
        .preprocessing(args.preprocessing_choices)
        .target_attr(args.target_attr)
        .dataset(args.dataset)
        .date_range(args.start_date, args.end_date)
        .progress(!args.no_progress);
    if let Some(n) = args.threads {
        sampler = sampler.parallelism(n);
    }

    // the storage client lives exactly as long as this run
    let gcs = if args.input.starts_with("gs://") {
        Some(GcsClient::new(StorageConfig::from_env())?)
    } else {
        None
    };
    let store = gcs.as_ref().map(|c| c as &dyn ObjectStore);

    let report = sampler.run(store)?;
    if args.json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }
    println!("output file: {}", report.output.display());
    println!("loaded {} / matched {} / written {}", report.loaded, report.matched, report.written);
    Ok(())
}
