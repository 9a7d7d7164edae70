//! Materialize JSON(-lines) records from a local file, a local directory,
//! or a gzip blob in cloud storage.

use crate::compression::{gunzip_bytes, open_decoded};
use crate::error::WrangleError;
use crate::ndjson::read_records;
use crate::paths::{discover_data_files, Source};
use crate::progress::make_count_progress;
use crate::storage::ObjectStore;
use crate::table::Table;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Reader configuration. The object store is only required for `gs://` sources.
#[derive(Clone, Copy)]
pub struct JsonLoader<'a> {
    store: Option<&'a dyn ObjectStore>,
    nrows: Option<usize>,
    read_buffer_bytes: usize,
    progress: bool,
}

impl Default for JsonLoader<'_> {
    fn default() -> Self {
        Self { store: None, nrows: None, read_buffer_bytes: 256 * 1024, progress: false }
    }
}

impl<'a> JsonLoader<'a> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn store(mut self, store: &'a dyn ObjectStore) -> Self { self.store = Some(store); self }
    pub fn nrows(mut self, n: Option<usize>) -> Self { self.nrows = n; self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.read_buffer_bytes = bytes.max(8 * 1024); self }
    pub fn progress(mut self, yes: bool) -> Self { self.progress = yes; self }

    /// Parse `location` (local path or `gs://` URL) and load it.
    pub fn load(&self, location: &str) -> Result<Table> {
        let source = Source::parse(location)?;
        self.load_source(&source)
    }

    pub fn load_source(&self, source: &Source) -> Result<Table> {
        let table = match source {
            Source::Local(path) => self.load_local(path)?,
            Source::Gcs { bucket, object } => self.load_gcs(bucket, object)?,
        };
        tracing::info!(source = %source, rows = table.len(), "loaded records");
        Ok(table)
    }

    fn load_local(&self, path: &Path) -> Result<Table> {
        let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        if meta.is_file() {
            self.load_file(path, self.nrows)
        } else if meta.is_dir() {
            self.load_dir(path)
        } else {
            Err(WrangleError::Path(path.to_path_buf()).into())
        }
    }

    fn load_file(&self, path: &Path, nrows: Option<usize>) -> Result<Table> {
        let rdr = open_decoded(path, self.read_buffer_bytes)?;
        read_records(rdr, &path.display().to_string(), nrows)
            .with_context(|| format!("read {}", path.display()))
    }

    /// Concatenate every data file in the directory, in discovery order.
    fn load_dir(&self, dir: &Path) -> Result<Table> {
        let files = discover_data_files(dir);
        if files.is_empty() {
            tracing::warn!("No JSON files found in {}", dir.display());
        } else {
            tracing::info!("Loading {} files from {}", files.len(), dir.display());
        }

        let pb = if self.progress { Some(make_count_progress(files.len() as u64, "Loading files")) } else { None };

        let mut table = Table::new();
        for file in &files {
            let remaining = self.nrows.map(|n| n.saturating_sub(table.len()));
            if remaining == Some(0) { break; }
            table.extend(self.load_file(file, remaining)?);
            if let Some(pb) = &pb { pb.inc(1); }
        }
        if let Some(pb) = pb { pb.finish_with_message("Loading done"); }
        Ok(table)
    }

    fn load_gcs(&self, bucket: &str, object: &str) -> Result<Table> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("an object store is required to read gs://{}/{}", bucket, object))?;
        let compressed = store.download(bucket, object)?;
        let raw = gunzip_bytes(&compressed).with_context(|| format!("decompress gs://{}/{}", bucket, object))?;
        read_records(Cursor::new(raw), &format!("gs://{}/{}", bucket, object), self.nrows)
    }
}

/// Convenience wrapper over [`JsonLoader`] with defaults.
pub fn read_json(location: &str, store: Option<&dyn ObjectStore>) -> Result<Table> {
    let mut loader = JsonLoader::new();
    if let Some(s) = store {
        loader = loader.store(s);
    }
    loader.load(location)
}
