mod config;
mod date;
mod error;
mod paths;
mod table;

mod compression;
mod ndjson;
mod loader;
mod storage;

mod query;
mod filters;
mod preprocess;
mod concurrency;
mod progress;
mod util;
mod pipeline;

mod vote;
mod reconcile;

pub use crate::config::{QuestionSpec, ReconcileOptions, SampleOptions};
pub use crate::error::WrangleError;
pub use crate::table::{cell_str, Row, Table};

// Data loading: local files, directories and cloud blobs.
pub use crate::loader::{read_json, JsonLoader};
pub use crate::ndjson::{detect_format, read_records, JsonFormat, NdjsonReader};
pub use crate::paths::Source;
pub use crate::storage::{GcsClient, ObjectStore, StorageConfig};

// Phrase sampling.
pub use crate::filters::PhraseMatcher;
pub use crate::pipeline::{ensure_date_column, project_columns, sample_rows, PhraseSampler, SampleReport};
pub use crate::preprocess::{preprocess, Preprocessing};
pub use crate::query::{PhraseConditional, PhraseQuery};
pub use crate::date::parse_date_arg;

// Annotation reconciliation.
pub use crate::reconcile::{format_score, reconcile_all, reconcile_file, reconcile_records, LabeledItem, ReconcileReport};
pub use crate::vote::{majority_vote, merge_radios, resolve_radios, tally, Choice, Consensus, RadioFlags};

pub use crate::util::init_tracing_once;
