use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::instrument;

use super::videos::{CatalogRecord, VideoUrlRow, VIDEOS_TABLE};
use super::CatalogStore;
use crate::config::CatalogConfig;

fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}

/// Supabase PostgREST client for the `videos` table.
///
/// Endpoints used:
/// - GET  /rest/v1/videos?select=id,url&order=id.asc&offset=..&limit=..
/// - POST /rest/v1/videos (Prefer: return=minimal)
#[derive(Debug, Clone)]
pub struct PostgrestCatalog {
    base_url: String,
    http: Client,
    api_key: String,
}

impl PostgrestCatalog {
    pub fn new(cfg: &CatalogConfig) -> Result<Self> {
        let base_url = rest_base(&cfg.rest_url);
        let http = Client::builder()
            .user_agent(concat!("video-catalog-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            base_url,
            http,
            api_key: cfg.api_key.clone(),
        })
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base_url, VIDEOS_TABLE)
    }
}

/// `https://x.supabase.co` → `https://x.supabase.co/rest/v1`; already-suffixed URLs are kept.
fn rest_base(project_url: &str) -> String {
    let trimmed = project_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/rest/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/rest/v1")
    }
}

#[async_trait]
impl CatalogStore for PostgrestCatalog {
    fn name(&self) -> &'static str {
        "rest"
    }

    #[instrument(skip(self))]
    async fn fetch_url_page(&self, offset: i64, limit: i64) -> Result<Vec<VideoUrlRow>> {
        let url = self.table_url();
        let query = [
            ("select", "id,url".to_string()),
            ("order", "id.asc".to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        let resp = self
            .authed(self.http.get(&url))
            .header("Accept", "application/json")
            .query(&query)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
            return Err(anyhow!(
                "catalog select failed: {status} offset={offset} body={body}"
            ));
        }
        resp.json::<Vec<VideoUrlRow>>()
            .await
            .context("catalog select returned unexpected json")
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert_video(&self, record: &CatalogRecord) -> Result<()> {
        let url = self.table_url();
        let resp = self
            .authed(self.http.post(&url))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
            return Err(anyhow!("catalog insert failed: {status} body={body}"));
        }
        Ok(())
    }
}
