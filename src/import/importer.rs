use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};

use super::builder::{truncate_chars, RecordBuilder};
use crate::database_ops::videos::CatalogRecord;
use crate::database_ops::CatalogStore;
use crate::metadata::MetadataParser;

const PREVIEW_TITLE_CHARS: usize = 50;

/// What a dry run would have inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreview {
    pub key: String,
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub attempted: usize,
    pub imported: usize,
    pub failed: usize,
    pub dry_run: bool,
    pub previews: Vec<ImportPreview>,
}

/// Parses, builds and inserts one row per key. A failing key is logged and
/// counted; the remaining keys are still processed.
pub struct Importer<'a> {
    store: &'a dyn CatalogStore,
    parser: &'a MetadataParser,
    builder: RecordBuilder<'a>,
    dry_run: bool,
}

impl<'a> Importer<'a> {
    pub fn new(
        store: &'a dyn CatalogStore,
        parser: &'a MetadataParser,
        builder: RecordBuilder<'a>,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            parser,
            builder,
            dry_run,
        }
    }

    pub async fn run(&mut self, keys: &[String]) -> ImportSummary {
        let mut summary = ImportSummary {
            dry_run: self.dry_run,
            ..Default::default()
        };
        let total = keys.len();

        for (i, key) in keys.iter().enumerate() {
            println!("[{}/{}] {}", i + 1, total, key);
            summary.attempted += 1;
            match self.import_one(key).await {
                Ok(record) => {
                    summary.imported += 1;
                    if self.dry_run {
                        summary.previews.push(ImportPreview {
                            key: key.clone(),
                            id: record.id,
                            title: record.title,
                        });
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(key = %key, error = %format!("{e:#}"), "import failed");
                }
            }
        }

        info!(
            attempted = summary.attempted,
            imported = summary.imported,
            failed = summary.failed,
            dry_run = summary.dry_run,
            "import run finished"
        );
        summary
    }

    async fn import_one(&mut self, key: &str) -> Result<CatalogRecord> {
        let meta = self.parser.parse(key);
        let record = self.builder.build(key, &meta, Utc::now())?;

        if self.dry_run {
            println!(
                "  [DRY RUN] Would import: {} - {}",
                record.id,
                truncate_chars(&record.title, PREVIEW_TITLE_CHARS)
            );
            return Ok(record);
        }

        self.store.insert_video(&record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::catalog_keys::collect_catalog_keys;
    use crate::database_ops::testing::MemoryCatalog;
    use crate::import::IdAllocator;
    use crate::normalization::storage_url::{
        StorageUrls, UrlScheme, DEFAULT_DOWNLOAD_HOST, DEFAULT_LEGACY_BASE,
    };
    use crate::reconcile::{reconcile, ReconcileOptions};
    use std::collections::HashSet;

    fn urls() -> StorageUrls {
        StorageUrls::new(DEFAULT_LEGACY_BASE, DEFAULT_DOWNLOAD_HOST, "uspa-videos", UrlScheme::Legacy)
            .unwrap()
    }

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn dry_run_previews_without_writing() {
        let store = MemoryCatalog::default();
        let parser = MetadataParser::basic();
        let urls = urls();
        let builder = RecordBuilder::new(&urls, IdAllocator::new(HashSet::new()));
        let mut importer = Importer::new(&store, &parser, builder, true);

        let summary = importer
            .run(&keys(&["a/1_2_3_4.mp4", "b/clip.mp4", "uncategorized/abc123.mp4"]))
            .await;

        assert_eq!(store.inserted_count(), 0);
        assert_eq!(summary.previews.len(), 3);
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.failed, 0);
        assert!(summary.dry_run);
        assert_eq!(summary.previews[2].title, "abc123");
    }

    #[tokio::test]
    async fn failed_insert_does_not_stop_the_batch() {
        let urls = urls();
        let store = MemoryCatalog {
            reject_urls: vec![urls.url_for_key("b.mp4")],
            ..Default::default()
        };
        let parser = MetadataParser::basic();
        let builder = RecordBuilder::new(&urls, IdAllocator::new(HashSet::new()));
        let mut importer = Importer::new(&store, &parser, builder, false);

        let summary = importer.run(&keys(&["a.mp4", "b.mp4", "c.mp4"])).await;

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.previews.is_empty());
        let inserted: Vec<String> = store
            .inserted
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect();
        assert_eq!(inserted, vec![urls.url_for_key("a.mp4"), urls.url_for_key("c.mp4")]);
    }

    #[tokio::test]
    async fn rerun_after_import_finds_nothing_missing() {
        let urls = urls();
        let store = MemoryCatalog::with_rows(vec![(
            "old00001",
            Some("https://f005.backblazeb2.com/file/uspa-videos/fs/old.mp4"),
        )]);
        let parser = MetadataParser::basic();
        let enumerated = ["fs/old.mp4", "fs/new1.mp4", "fs/new2.mp4"];

        let snap = collect_catalog_keys(&store, &urls).await.unwrap();
        let (missing, _) = reconcile(enumerated, &snap.keys, &ReconcileOptions::default());
        assert_eq!(missing, vec!["fs/new1.mp4", "fs/new2.mp4"]);

        let builder = RecordBuilder::new(&urls, IdAllocator::new(snap.ids.clone()));
        let summary = Importer::new(&store, &parser, builder, false).run(&missing).await;
        assert_eq!(summary.imported, 2);

        let snap = collect_catalog_keys(&store, &urls).await.unwrap();
        let (missing, report) = reconcile(enumerated, &snap.keys, &ReconcileOptions::default());
        assert!(missing.is_empty());
        assert_eq!(report.missing, 0);
        assert_eq!(snap.ids.len(), 3);
    }
}
