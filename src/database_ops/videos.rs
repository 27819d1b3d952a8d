//! Row model of the `videos` table as written by imports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const VIDEOS_TABLE: &str = "videos";

/// `videos.title` is a varchar(255).
pub const TITLE_MAX_CHARS: usize = 255;

/// Provenance tag for rows created from object-store listings. The thumbnail
/// backfill job selects on this value.
pub const VIDEO_TYPE_OBJECT_STORE: &str = "s3";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail: String,
    pub category: String,
    pub subcategory: String,
    pub tags: String,
    pub duration: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub views: i64,
    pub video_type: String,
    pub local_file: String,
    pub event: String,
    pub team: String,
    pub round_num: String,
    pub jump_num: String,
}

/// The `id, url` projection read during key extraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoUrlRow {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}
