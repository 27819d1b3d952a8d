//! Mapping between catalog `url` values and object-store keys.
//!
//! Two URL shapes exist in the `videos` table:
//! - legacy: `https://<legacy-host>/<key>` (the old S3 bucket host)
//! - current: `https://<download-host>/file/<bucket>/<key>` (B2 friendly URLs)
//!
//! Reading accepts both. Writing uses the single scheme chosen at startup.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_LEGACY_BASE: &str = "https://uspa-video-library.s3.us-east-2.amazonaws.com/";
pub const DEFAULT_DOWNLOAD_HOST: &str = "f005.backblazeb2.com";

/// Which URL shape newly imported rows are written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlScheme {
    #[default]
    Legacy,
    Current,
}

impl FromStr for UrlScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "s3" | "aws" => Ok(UrlScheme::Legacy),
            "current" | "b2" | "backblaze" => Ok(UrlScheme::Current),
            other => Err(anyhow!("unknown url scheme '{other}' (expected legacy|current)")),
        }
    }
}

impl fmt::Display for UrlScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlScheme::Legacy => f.write_str("legacy"),
            UrlScheme::Current => f.write_str("current"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageUrls {
    legacy_base: String,
    download_host: String,
    bucket: String,
    write_scheme: UrlScheme,
}

impl StorageUrls {
    pub fn new(
        legacy_base: &str,
        download_host: &str,
        bucket: &str,
        write_scheme: UrlScheme,
    ) -> Result<Self> {
        let parsed = url::Url::parse(legacy_base.trim())
            .with_context(|| format!("invalid legacy url base: {legacy_base}"))?;
        if parsed.host_str().is_none() {
            return Err(anyhow!("legacy url base has no host: {legacy_base}"));
        }
        let mut legacy_base = legacy_base.trim().to_string();
        if !legacy_base.ends_with('/') {
            legacy_base.push('/');
        }

        let download_host = download_host
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_ascii_lowercase();
        if download_host.is_empty() {
            return Err(anyhow!("download host must be non-empty"));
        }

        let bucket = bucket.trim().trim_matches('/').to_string();
        if bucket.is_empty() || bucket.contains('/') {
            return Err(anyhow!("bucket must be a single path segment, got '{bucket}'"));
        }

        Ok(Self {
            legacy_base,
            download_host,
            bucket,
            write_scheme,
        })
    }

    pub fn write_scheme(&self) -> UrlScheme {
        self.write_scheme
    }

    /// Build the catalog url for a storage key using the configured write scheme.
    pub fn url_for_key(&self, key: &str) -> String {
        match self.write_scheme {
            UrlScheme::Legacy => format!("{}{}", self.legacy_base, key),
            UrlScheme::Current => {
                format!("https://{}/file/{}/{}", self.download_host, self.bucket, key)
            }
        }
    }

    /// Resolve a stored catalog url back to the storage key it points at.
    ///
    /// Returns `None` for empty, malformed or externally hosted urls.
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let url = url.trim();
        if let Some(key) = url.strip_prefix(self.legacy_base.as_str()) {
            return non_empty(key);
        }

        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))?;
        let (host, path) = rest.split_once('/')?;
        let host = host.to_ascii_lowercase();

        if host.ends_with(".amazonaws.com") {
            return non_empty(path);
        }
        if host == self.download_host || host.contains("backblaze") {
            let after_file = path.strip_prefix("file/")?;
            let (_bucket, key) = after_file.split_once('/')?;
            return non_empty(key);
        }
        None
    }
}

fn non_empty(key: &str) -> Option<String> {
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}
