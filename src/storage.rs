//! Cloud object storage handle. Constructed once per batch run and passed by reference.

use anyhow::{anyhow, Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Object names go into a single path segment, so `/`, `#` and friends must be escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Whole-object download from a bucket.
pub trait ObjectStore: Send + Sync {
    fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>>;
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://storage.googleapis.com".to_string(),
            access_token: None,
        }
    }
}

impl StorageConfig {
    /// `GCS_ENDPOINT` overrides the API host, `GCS_ACCESS_TOKEN` supplies a bearer token.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(ep) = std::env::var("GCS_ENDPOINT") {
            if !ep.trim().is_empty() {
                cfg.endpoint = ep.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(tok) = std::env::var("GCS_ACCESS_TOKEN") {
            if !tok.trim().is_empty() {
                cfg.access_token = Some(tok.trim().to_string());
            }
        }
        cfg
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

/// Google Cloud Storage over the JSON API (`alt=media` downloads).
pub struct GcsClient {
    http: reqwest::blocking::Client,
    cfg: StorageConfig,
}

impl GcsClient {
    pub fn new(cfg: StorageConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self { http, cfg })
    }

    pub fn object_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.cfg.endpoint,
            utf8_percent_encode(bucket, PATH_SEGMENT),
            utf8_percent_encode(object, PATH_SEGMENT)
        )
    }
}

impl ObjectStore for GcsClient {
    fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>> {
        let url = self.object_url(bucket, object);
        tracing::debug!(%url, "downloading blob");
        let mut req = self.http.get(&url);
        if let Some(tok) = &self.cfg.access_token {
            req = req.bearer_auth(tok);
        }
        let resp = req
            .send()
            .with_context(|| format!("request gs://{}/{}", bucket, object))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("download gs://{}/{} failed: HTTP {}", bucket, object, status));
        }
        let bytes = resp
            .bytes()
            .with_context(|| format!("read body of gs://{}/{}", bucket, object))?;
        tracing::info!(bucket, object, bytes = bytes.len(), "downloaded blob");
        Ok(bytes.to_vec())
    }
}
