use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Row};
use tracing::{info, instrument};

use super::videos::{CatalogRecord, VideoUrlRow};
use super::CatalogStore;

/// Direct Postgres access to the catalog.
#[derive(Clone)]
pub struct Db {
    pub pool: PgPool,
}

impl Db {
    // SECURITY: never include raw DSNs in tracing spans (they may contain credentials).
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let mut connect_options =
            PgConnectOptions::from_str(database_url).context("invalid database url")?;

        if database_url.contains("sslmode=require") {
            connect_options = connect_options.ssl_mode(PgSslMode::Require);
        }

        // PgBouncer txn mode safe
        connect_options = connect_options.statement_cache_capacity(0);

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await
            .context("failed to connect to catalog database")?;
        info!("connected to db");
        Ok(Self { pool })
    }
}

#[async_trait]
impl CatalogStore for Db {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_url_page(&self, offset: i64, limit: i64) -> Result<Vec<VideoUrlRow>> {
        let rows = sqlx::query("SELECT id::text AS id, url FROM videos ORDER BY id LIMIT $1 OFFSET $2")
            .persistent(false)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("select id,url from videos (offset={offset})"))?;

        rows.iter()
            .map(|r| -> Result<VideoUrlRow> {
                Ok(VideoUrlRow {
                    id: r.try_get("id")?,
                    url: r.try_get("url")?,
                })
            })
            .collect()
    }

    async fn insert_video(&self, record: &CatalogRecord) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO videos (
                id, title, description, url, thumbnail, category, subcategory, tags,
                duration, created_at, views, video_type, local_file,
                event, team, round_num, jump_num
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"#,
        )
        .persistent(false)
        .bind(&record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.url)
        .bind(&record.thumbnail)
        .bind(&record.category)
        .bind(&record.subcategory)
        .bind(&record.tags)
        .bind(record.duration)
        .bind(record.created_at)
        .bind(record.views)
        .bind(&record.video_type)
        .bind(&record.local_file)
        .bind(&record.event)
        .bind(&record.team)
        .bind(&record.round_num)
        .bind(&record.jump_num)
        .execute(&self.pool)
        .await
        .with_context(|| format!("insert video {}", record.id))?;
        Ok(())
    }
}
