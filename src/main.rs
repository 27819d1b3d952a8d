use anyhow::Result;
use clap::Parser;
use video_catalog_sync::cli::import_missing::{run, ImportMissingConfig};
use video_catalog_sync::config::{CatalogBackend, ConfigOverrides};
use video_catalog_sync::metadata::ClassifierKind;
use video_catalog_sync::normalization::storage_url::UrlScheme;
use video_catalog_sync::util::logging::{init_tracing, DEFAULT_FILTER};

#[derive(Parser, Debug)]
#[command(
    name = "video-catalog-sync",
    version,
    about = "Import object-store videos that are missing from the catalog"
)]
struct Cli {
    /// Show what would be imported without writing
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Maximum number of videos to import (0 = all)
    #[arg(long, default_value_t = 0)]
    limit: usize,
    /// Only import keys containing this text (case-insensitive)
    #[arg(long)]
    filter: Option<String>,
    /// Filename classifier run ahead of the folder heuristic (rich|basic)
    #[arg(long, default_value = "rich")]
    classifier: ClassifierKind,
    /// URL scheme for new rows (legacy|current); overrides CATALOG_URL_SCHEME
    #[arg(long)]
    url_scheme: Option<UrlScheme>,
    /// Catalog backend (rest|postgres); overrides CATALOG_BACKEND
    #[arg(long)]
    backend: Option<CatalogBackend>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(DEFAULT_FILTER)?;
    let cli = Cli::parse();

    let cfg = ImportMissingConfig {
        dry_run: cli.dry_run,
        limit: (cli.limit > 0).then_some(cli.limit),
        filter: cli.filter,
        classifier: cli.classifier,
        overrides: ConfigOverrides {
            backend: cli.backend,
            url_scheme: cli.url_scheme,
        },
    };
    run(cfg).await?;
    Ok(())
}
