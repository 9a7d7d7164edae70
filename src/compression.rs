//! Transparent decompression for local inputs and in-memory blobs.

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use zstd::stream::read::Decoder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    Plain,
    Gzip,
    Zstd,
}

impl Codec {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Codec::Gzip,
            Some("zst") => Codec::Zstd,
            _ => Codec::Plain,
        }
    }
}

/// Open a local file and wrap it in the decoder its suffix calls for.
pub fn open_decoded(path: &Path, read_buf_bytes: usize) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let cap = read_buf_bytes.max(8 * 1024);
    let rdr: Box<dyn BufRead> = match Codec::from_path(path) {
        Codec::Plain => Box::new(BufReader::with_capacity(cap, file)),
        Codec::Gzip => Box::new(BufReader::with_capacity(cap, MultiGzDecoder::new(file))),
        Codec::Zstd => {
            let mut decoder = Decoder::new(file)?;
            // large windows are common on corpus dumps
            decoder.window_log_max(31)?;
            Box::new(BufReader::with_capacity(cap, decoder))
        }
    };
    Ok(rdr)
}

/// Fully decompress a gzip blob held in memory, every member of it.
pub fn gunzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len() * 4);
    MultiGzDecoder::new(bytes)
        .read_to_end(&mut out)
        .context("gzip decode")?;
    Ok(out)
}
