//! Convert MTurk results to `[tweet_id, text, label, score]` rows.
//!
//! ```bash
//! label_mturk_results --input_fp data/myth_disinfectants_sample-440 data/myth_5g_sample-300
//! ```
//! Each base path `P` is read from `P-results.csv` and written to `P-labeled.csv`.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tweetwrangle::{init_tracing_once, reconcile_all, ReconcileOptions};

#[derive(Parser, Debug)]
#[command(name = "label_mturk_results")]
#[command(about = "Converts MTurk results to consensus labels per tweet")]
struct Args {
    /// Base file path(s); `-results.csv` / `-labeled.csv` are appended
    #[arg(short = 'i', long = "input_fp", num_args = 1.., required = true)]
    input_fp: Vec<PathBuf>,

    /// Number of workers per task
    #[arg(long, default_value_t = 3)]
    raters: usize,

    /// Disable progress bars
    #[arg(long = "no-progress")]
    no_progress: bool,

    /// Print the per-file reports as one JSON array instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing_once();
    let args = Args::parse();

    let opts = ReconcileOptions::default()
        .with_rater_count(args.raters)
        .with_progress(!args.no_progress);

    let reports = reconcile_all(args.input_fp.as_slice(), &opts)?;
    if args.json {
        println!("{}", serde_json::to_string(&reports)?);
        return Ok(());
    }
    for r in &reports {
        println!("{} -> {} ({} items)", r.source.display(), r.target.display(), r.items);
    }
    println!("Done converting {} MTurk results files.", reports.len());
    Ok(())
}
