use anyhow::Result;
use chrono::{DateTime, Utc};

use super::ids::IdAllocator;
use crate::database_ops::videos::{CatalogRecord, TITLE_MAX_CHARS, VIDEO_TYPE_OBJECT_STORE};
use crate::metadata::VideoMetadata;
use crate::normalization::storage_url::StorageUrls;

const DESCRIPTION_PREFIX: &str = "Imported from B2";

/// Assembles full `videos` rows for storage keys.
pub struct RecordBuilder<'a> {
    urls: &'a StorageUrls,
    ids: IdAllocator,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(urls: &'a StorageUrls, ids: IdAllocator) -> Self {
        Self { urls, ids }
    }

    pub fn build(
        &mut self,
        key: &str,
        meta: &VideoMetadata,
        created_at: DateTime<Utc>,
    ) -> Result<CatalogRecord> {
        let id = self.ids.next_id()?;
        let (description, tags) = if meta.event.is_empty() {
            (format!("{DESCRIPTION_PREFIX} storage"), String::new())
        } else {
            (
                format!("{DESCRIPTION_PREFIX}: {}", meta.event),
                meta.event.replace(' ', ","),
            )
        };

        Ok(CatalogRecord {
            id,
            title: truncate_chars(&meta.title, TITLE_MAX_CHARS),
            description,
            url: self.urls.url_for_key(key),
            thumbnail: String::new(),
            category: meta.category.as_str().to_string(),
            subcategory: meta.subcategory.clone(),
            tags,
            duration: None,
            created_at,
            views: 0,
            video_type: VIDEO_TYPE_OBJECT_STORE.to_string(),
            local_file: String::new(),
            event: meta.event.clone(),
            team: meta.team.clone(),
            round_num: meta.round_num.clone(),
            jump_num: meta.jump_num.clone(),
        })
    }
}

/// First `max` characters of `s` (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataParser;
    use crate::normalization::category::Category;
    use crate::normalization::storage_url::{UrlScheme, DEFAULT_DOWNLOAD_HOST, DEFAULT_LEGACY_BASE};
    use std::collections::HashSet;

    fn urls(scheme: UrlScheme) -> StorageUrls {
        StorageUrls::new(DEFAULT_LEGACY_BASE, DEFAULT_DOWNLOAD_HOST, "uspa-videos", scheme).unwrap()
    }

    #[test]
    fn builds_nationals_row() {
        let urls = urls(UrlScheme::Legacy);
        let mut builder = RecordBuilder::new(&urls, IdAllocator::new(HashSet::new()));
        let key = "2018_USPA_Nationals/3_163_1601_6.mp4";
        let meta = MetadataParser::basic().parse(key);
        let now = Utc::now();
        let rec = builder.build(key, &meta, now).unwrap();

        assert_eq!(rec.id.len(), 8);
        assert_eq!(
            rec.url,
            "https://uspa-video-library.s3.us-east-2.amazonaws.com/2018_USPA_Nationals/3_163_1601_6.mp4"
        );
        assert_eq!(rec.title, "2018 USPA Nationals - 3 163 1601 6");
        assert_eq!(rec.description, "Imported from B2: 2018 USPA Nationals");
        assert_eq!(rec.tags, "2018,USPA,Nationals");
        assert_eq!(rec.category, "fs");
        assert_eq!((rec.round_num.as_str(), rec.jump_num.as_str(), rec.team.as_str()), ("3", "163", "1601"));
        assert_eq!(rec.thumbnail, "");
        assert_eq!(rec.duration, None);
        assert_eq!(rec.views, 0);
        assert_eq!(rec.video_type, "s3");
        assert_eq!(rec.created_at, now);
    }

    #[test]
    fn eventless_rows_use_generic_description_and_no_tags() {
        let urls = urls(UrlScheme::Current);
        let mut builder = RecordBuilder::new(&urls, IdAllocator::new(HashSet::new()));
        let meta = VideoMetadata {
            title: "abc123".into(),
            ..Default::default()
        };
        let rec = builder.build("uncategorized/abc123.mp4", &meta, Utc::now()).unwrap();
        assert_eq!(rec.description, "Imported from B2 storage");
        assert_eq!(rec.tags, "");
        assert_eq!(rec.category, Category::Uncategorized.as_str());
        assert_eq!(
            rec.url,
            "https://f005.backblazeb2.com/file/uspa-videos/uncategorized/abc123.mp4"
        );
    }

    #[test]
    fn long_titles_are_truncated_not_rejected() {
        let urls = urls(UrlScheme::Legacy);
        let mut builder = RecordBuilder::new(&urls, IdAllocator::new(HashSet::new()));
        let meta = VideoMetadata {
            title: "é".repeat(300),
            ..Default::default()
        };
        let rec = builder.build("x.mp4", &meta, Utc::now()).unwrap();
        assert_eq!(rec.title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn truncate_chars_handles_short_input() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }
}
