//! Access to the `videos` catalog table.

use anyhow::Result;
use async_trait::async_trait;

pub mod catalog_keys;
pub mod db;
pub mod postgrest;
pub mod videos;

use videos::{CatalogRecord, VideoUrlRow};

/// Read/insert access to the `videos` table, independent of transport.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// One page of `id, url`, ordered by `id`.
    async fn fetch_url_page(&self, offset: i64, limit: i64) -> Result<Vec<VideoUrlRow>>;

    /// Insert a single new row.
    async fn insert_video(&self, record: &CatalogRecord) -> Result<()>;
}
