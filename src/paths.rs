use crate::error::WrangleError;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Where a loader reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A local file or a directory of JSON(-lines) files.
    Local(PathBuf),
    /// A gzip-compressed JSON-lines blob in cloud storage (`gs://bucket/object.json.gz`).
    Gcs { bucket: String, object: String },
}

impl Source {
    /// Anything starting with `gs://` must name a bucket and a `.json.gz` object.
    pub fn parse(s: &str) -> Result<Self, WrangleError> {
        let Some(rest) = s.strip_prefix("gs://") else {
            return Ok(Source::Local(PathBuf::from(s)));
        };
        if !s.ends_with(".json.gz") {
            return Err(WrangleError::CloudPath(s.to_string()));
        }
        match rest.split_once('/') {
            Some((bucket, object)) if !bucket.is_empty() && !object.is_empty() => Ok(Source::Gcs {
                bucket: bucket.to_string(),
                object: object.to_string(),
            }),
            _ => Err(WrangleError::CloudPath(s.to_string())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local(p) => write!(f, "{}", p.display()),
            Source::Gcs { bucket, object } => write!(f, "gs://{}/{}", bucket, object),
        }
    }
}

fn data_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.(json|jsonl|ndjson)(\.gz|\.zst)?$").expect("static regex"))
}

/// Regular JSON(-lines) files directly inside `dir`, sorted by file name.
/// Hidden files are ignored.
pub fn discover_data_files(dir: &Path) -> Vec<PathBuf> {
    let re = data_file_re();
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| !name.starts_with('.') && re.is_match(name))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}
