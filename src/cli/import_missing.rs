//! Import videos that exist in the object store but have no `videos` row.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{AppConfig, CatalogBackend, CatalogConfig, ConfigOverrides};
use crate::database_ops::catalog_keys::collect_catalog_keys;
use crate::database_ops::db::Db;
use crate::database_ops::postgrest::PostgrestCatalog;
use crate::database_ops::CatalogStore;
use crate::import::{IdAllocator, ImportSummary, Importer, RecordBuilder};
use crate::metadata::{ClassifierKind, MetadataParser};
use crate::reconcile::{reconcile, ReconcileOptions};
use crate::storage::s3::S3ObjectSource;
use crate::storage::{enumerate_videos, ObjectSource};

#[derive(Debug, Clone, Default)]
pub struct ImportMissingConfig {
    /// Report what would be imported without writing.
    pub dry_run: bool,
    /// Import at most this many keys (after sorting); `None` = all.
    pub limit: Option<usize>,
    /// Case-insensitive substring keys must contain.
    pub filter: Option<String>,
    pub classifier: ClassifierKind,
    pub overrides: ConfigOverrides,
}

pub async fn run(cfg: ImportMissingConfig) -> Result<ImportSummary> {
    let app = AppConfig::from_env(&cfg.overrides)?;
    let parser = MetadataParser::new(cfg.classifier)?;

    println!("Connecting to object store and catalog...");
    let source = S3ObjectSource::new(&app.object_store);
    let store = open_catalog(&app.catalog).await?;

    execute(&app, &source, store.as_ref(), &parser, &cfg).await
}

pub async fn open_catalog(cfg: &CatalogConfig) -> Result<Box<dyn CatalogStore>> {
    match cfg.backend {
        CatalogBackend::Rest => Ok(Box::new(PostgrestCatalog::new(cfg)?)),
        CatalogBackend::Postgres => {
            let url = cfg
                .database_url
                .as_deref()
                .context("postgres backend selected but no DATABASE_URL configured")?;
            Ok(Box::new(Db::connect(url, cfg.max_connections).await?))
        }
    }
}

/// The reconciliation/import workflow against already-opened stores.
pub async fn execute(
    app: &AppConfig,
    source: &dyn ObjectSource,
    store: &dyn CatalogStore,
    parser: &MetadataParser,
    cfg: &ImportMissingConfig,
) -> Result<ImportSummary> {
    info!(
        bucket = %app.object_store.bucket,
        backend = store.name(),
        classifier = parser.delegate_name(),
        write_scheme = %app.urls.write_scheme(),
        dry_run = cfg.dry_run,
        "starting reconciliation"
    );

    println!("Fetching videos from object store...");
    let videos = enumerate_videos(source)
        .await
        .context("object store enumeration failed")?;
    println!("  Found {} videos in object store", videos.len());

    println!("Fetching videos from catalog...");
    let snapshot = collect_catalog_keys(store, &app.urls)
        .await
        .context("catalog key extraction failed")?;
    println!("  Found {} videos in catalog", snapshot.keys.len());

    let opts = ReconcileOptions {
        filter: cfg.filter.clone(),
        limit: cfg.limit,
    };
    let (missing, report) = reconcile(videos.keys().map(String::as_str), &snapshot.keys, &opts);
    println!("\nVideos in object store but not in catalog: {}", report.missing);
    if let Some(filter) = opts.filter.as_deref().filter(|f| !f.is_empty()) {
        println!("After filter '{}': {} videos", filter, report.after_filter);
    }

    if missing.is_empty() {
        println!("No videos to import!");
        return Ok(ImportSummary {
            dry_run: cfg.dry_run,
            ..Default::default()
        });
    }
    if report.selected < report.after_filter {
        println!("Limited to: {} videos", report.selected);
    }
    if cfg.dry_run {
        println!("\n=== DRY RUN MODE ===\n");
    }

    let builder = RecordBuilder::new(&app.urls, IdAllocator::new(snapshot.ids));
    let summary = Importer::new(store, parser, builder, cfg.dry_run)
        .run(&missing)
        .await;

    let rule = "=".repeat(60);
    println!("\n{rule}");
    if summary.dry_run {
        println!("DRY RUN Complete: {} would be imported", summary.imported);
    } else {
        println!(
            "Complete: {} imported, {} failed",
            summary.imported, summary.failed
        );
    }
    println!("{rule}");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::testing::MemoryCatalog;
    use crate::storage::testing::FakeObjectSource;
    use std::collections::HashMap;

    fn app() -> AppConfig {
        let env: HashMap<&str, &str> = HashMap::from([
            ("B2_ENDPOINT", "https://s3.us-west-004.backblazeb2.com"),
            ("B2_KEY_ID", "id"),
            ("B2_APPLICATION_KEY", "secret"),
            ("B2_BUCKET", "uspa-videos"),
            ("SUPABASE_URL", "https://p.supabase.co"),
            ("SUPABASE_KEY", "k"),
        ]);
        AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()), &ConfigOverrides::default())
            .unwrap()
    }

    fn source() -> FakeObjectSource {
        FakeObjectSource::new(vec![
            vec!["2018_USPA_Nationals/3_163_1601_6.mp4", "fs/4way_r1.mp4", "fs/4way_r1_thumb.mp4"],
            vec!["cf/open/cf2_r1.mp4", "uncategorized/abc123.mp4", "docs/readme.txt"],
        ])
    }

    #[tokio::test]
    async fn dry_run_touches_nothing() {
        let app = app();
        let store = MemoryCatalog::with_rows(vec![(
            "known001",
            Some("https://uspa-video-library.s3.us-east-2.amazonaws.com/fs/4way_r1.mp4"),
        )]);
        let cfg = ImportMissingConfig {
            dry_run: true,
            ..Default::default()
        };
        let summary = execute(&app, &source(), &store, &MetadataParser::basic(), &cfg)
            .await
            .unwrap();

        assert_eq!(store.inserted_count(), 0);
        assert_eq!(summary.previews.len(), 3);
        let keys: Vec<&str> = summary.previews.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "2018_USPA_Nationals/3_163_1601_6.mp4",
                "cf/open/cf2_r1.mp4",
                "uncategorized/abc123.mp4"
            ]
        );
    }

    #[tokio::test]
    async fn live_run_inserts_filtered_and_limited_keys() {
        let app = app();
        let store = MemoryCatalog::default();
        let cfg = ImportMissingConfig {
            filter: Some("FS".into()),
            limit: Some(1),
            ..Default::default()
        };
        let parser = MetadataParser::new(ClassifierKind::Rich).unwrap();
        let summary = execute(&app, &source(), &store, &parser, &cfg).await.unwrap();

        assert_eq!(summary.imported, 1);
        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(
            inserted[0].url,
            "https://uspa-video-library.s3.us-east-2.amazonaws.com/fs/4way_r1.mp4"
        );
        assert_eq!(inserted[0].category, "fs");
        assert_eq!(inserted[0].subcategory, "fs_4way_fs");
    }

    #[tokio::test]
    async fn nothing_missing_is_a_clean_no_op() {
        let app = app();
        let source = FakeObjectSource::new(vec![vec!["a.mp4"]]);
        let store = MemoryCatalog::with_rows(vec![(
            "x1",
            Some("https://f005.backblazeb2.com/file/uspa-videos/a.mp4"),
        )]);
        let summary = execute(
            &app,
            &source,
            &store,
            &MetadataParser::basic(),
            &ImportMissingConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(summary.attempted, 0);
        assert_eq!(store.inserted_count(), 0);
    }

    #[tokio::test]
    async fn enumeration_failure_aborts_before_any_write() {
        let app = app();
        let source = FakeObjectSource::new(vec![vec!["a.mp4"], vec!["b.mp4"]]).failing_on(1);
        let store = MemoryCatalog::default();
        let err = execute(
            &app,
            &source,
            &store,
            &MetadataParser::basic(),
            &ImportMissingConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(format!("{err:#}").contains("object store enumeration failed"));
        assert_eq!(store.inserted_count(), 0);
        assert!(store.page_requests.lock().unwrap().is_empty());
    }
}
