#![allow(dead_code)]

use anyhow::{anyhow, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tweetwrangle::ObjectStore;

/// Write JSONL lines to a plain file.
pub fn write_jsonl(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Gzip JSONL lines into memory, as a cloud blob would be stored.
pub fn gzip_lines(lines: &[String]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap()
}

/// A tweet record shaped like the collection exports.
pub fn tweet(id: &str, text: &str, lang: &str) -> String {
    json!({
        "id_str": id,
        "created_at": "Sun Jun 16 12:00:00 +0000 2019",
        "full_text": text,
        "lang": lang,
        "user": { "screen_name": format!("user{}", id) },
        "retweet_count": 3
    })
    .to_string()
}

/// Small tweet corpus:
/// - 1: "I love this" (en)
/// - 2: "beloved candidate" (en)
/// - 3: "They already cut the field" (en)
/// - 4: "cut the field, already!" (en)
/// - 5: "already voted" (en)
/// - 6: "j'adore, love it" (fr)
pub fn make_tweets_basic() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.keep();
    let lines = vec![
        tweet("1", "I love this", "en"),
        tweet("2", "beloved candidate", "en"),
        tweet("3", "They already cut the field", "en"),
        tweet("4", "cut the field, already!", "en"),
        tweet("5", "already voted", "en"),
        tweet("6", "j'adore, love it", "fr"),
    ];
    let path = base.join("#2020election_20190616.json");
    write_jsonl(&path, &lines);
    path
}

/// In-memory object store keyed by `bucket/object`.
#[derive(Default)]
pub struct MemoryStore {
    pub blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn with_blob(mut self, bucket: &str, object: &str, bytes: Vec<u8>) -> Self {
        self.blobs.insert(format!("{}/{}", bucket, object), bytes);
        self
    }
}

impl ObjectStore for MemoryStore {
    fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>> {
        self.blobs
            .get(&format!("{}/{}", bucket, object))
            .cloned()
            .ok_or_else(|| anyhow!("no such object gs://{}/{}", bucket, object))
    }
}

/// Radio encoding of one rating row for the default myth questions.
/// `supports` of `""` leaves the optional question unanswered.
pub fn mturk_row(hit: &str, worker: &str, id: &str, text: &str, myth: &str, supports: &str) -> Vec<String> {
    let flag = |want: &str, choice: &str| (if want == choice { "true" } else { "false" }).to_string();
    vec![
        hit.to_string(),
        worker.to_string(),
        id.to_string(),
        text.to_string(),
        flag(myth, "yes"),
        flag(myth, "no"),
        flag(myth, "unsure"),
        flag(myth, "broken_links"),
        flag(supports, "yes"),
        flag(supports, "no"),
        flag(supports, "unsure"),
    ]
}

pub const MTURK_HEADER: [&str; 11] = [
    "HITId",
    "WorkerId",
    "Input.id_str",
    "Input.full_text_censored",
    "Answer.myth_yes.on",
    "Answer.myth_no.on",
    "Answer.myth_unsure.on",
    "Answer.myth_broken_links.on",
    "Answer.myth_supports_yes.on",
    "Answer.myth_supports_no.on",
    "Answer.myth_supports_unsure.on",
];

/// Write `<base>-results.csv` and return `base`.
pub fn write_results(dir: &Path, name: &str, rows: &[Vec<String>]) -> PathBuf {
    let base = dir.join(name);
    let path = PathBuf::from(format!("{}-results.csv", base.display()));
    let mut w = csv::Writer::from_path(&path).unwrap();
    w.write_record(MTURK_HEADER).unwrap();
    for r in rows {
        w.write_record(r).unwrap();
    }
    w.flush().unwrap();
    base
}

/// Read a text file line-by-line (non-empty lines).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    BufReader::new(f).lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Read a CSV with headers into records.
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut r = csv::Reader::from_path(path).unwrap();
    let headers = r.headers().unwrap().iter().map(String::from).collect();
    let rows = r
        .records()
        .map(|rec| rec.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}
