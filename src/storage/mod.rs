//! Object-store side of the reconciliation: list every object in the bucket
//! and keep only primary video files.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub mod s3;

/// Extensions treated as primary video objects. Matched case-sensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObject {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a bucket listing.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<StorageObject>,
    /// Continuation token for the next page; `None` once the listing is exhausted.
    pub next_token: Option<String>,
}

/// Paginated bucket listing.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Fetch the page that follows `token` (`None` = first page).
    async fn list_page(&self, token: Option<String>) -> Result<ObjectPage>;
}

/// Whether a key names a primary video (not a derived thumbnail or a folder marker).
pub fn is_primary_video_key(key: &str) -> bool {
    if key.ends_with('/') {
        return false;
    }
    if key.to_ascii_lowercase().contains("thumb") {
        return false;
    }
    let file_name = key.rsplit('/').next().unwrap_or(key);
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => VIDEO_EXTENSIONS
            .iter()
            .any(|known| ext == *known),
        _ => false,
    }
}

/// Walk every page of `source` and collect primary video objects by key.
///
/// Pages are requested strictly one after another. Any listing error aborts
/// the walk; a partial snapshot is never returned.
pub async fn enumerate_videos(source: &dyn ObjectSource) -> Result<HashMap<String, StorageObject>> {
    let mut videos: HashMap<String, StorageObject> = HashMap::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;
    let mut seen = 0usize;

    loop {
        let page = source.list_page(token.take()).await?;
        pages += 1;
        seen += page.objects.len();
        for obj in page.objects {
            if is_primary_video_key(&obj.key) {
                videos.insert(obj.key.clone(), obj);
            }
        }
        debug!(page = pages, kept = videos.len(), "object listing page processed");
        match page.next_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => break,
        }
    }

    info!(pages, objects_seen = seen, videos = videos.len(), "object store enumeration complete");
    Ok(videos)
}
