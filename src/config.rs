//! Startup configuration, resolved once from the environment and passed by
//! reference to every component.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::normalization::storage_url::{
    StorageUrls, UrlScheme, DEFAULT_DOWNLOAD_HOST, DEFAULT_LEGACY_BASE,
};
use crate::util::env as env_util;

const OBJECT_STORE_KEYS: [&str; 4] = ["B2_ENDPOINT", "B2_KEY_ID", "B2_APPLICATION_KEY", "B2_BUCKET"];
const REST_KEYS: [&str; 2] = ["SUPABASE_URL", "SUPABASE_KEY"];
const DATABASE_URL_KEYS: [&str; 2] = ["DATABASE_URL", "SUPABASE_DB_URL"];

/// Keys echoed (redacted) in the preflight snapshot.
const SNAPSHOT_KEYS: [&str; 11] = [
    "B2_ENDPOINT",
    "B2_KEY_ID",
    "B2_APPLICATION_KEY",
    "B2_BUCKET",
    "B2_REGION",
    "SUPABASE_URL",
    "SUPABASE_KEY",
    "DATABASE_URL",
    "CATALOG_BACKEND",
    "CATALOG_URL_SCHEME",
    "LEGACY_VIDEO_URL_BASE",
];

/// Where the `videos` table is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogBackend {
    /// Supabase PostgREST over HTTPS.
    #[default]
    Rest,
    /// Direct Postgres connection through sqlx.
    Postgres,
}

impl FromStr for CatalogBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" | "postgrest" | "supabase" => Ok(CatalogBackend::Rest),
            "postgres" | "postgresql" | "pg" => Ok(CatalogBackend::Postgres),
            other => Err(anyhow!("unknown catalog backend '{other}' (expected rest|postgres)")),
        }
    }
}

impl fmt::Display for CatalogBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogBackend::Rest => f.write_str("rest"),
            CatalogBackend::Postgres => f.write_str("postgres"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub key_id: String,
    pub application_key: String,
    pub bucket: String,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub backend: CatalogBackend,
    /// Supabase project URL (rest backend).
    pub rest_url: String,
    /// Supabase service/anon key (rest backend).
    pub api_key: String,
    /// Postgres DSN (postgres backend).
    pub database_url: Option<String>,
    pub http_timeout_secs: u64,
    pub max_connections: u32,
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<CatalogBackend>,
    pub url_scheme: Option<UrlScheme>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub object_store: ObjectStoreConfig,
    pub catalog: CatalogConfig,
    pub urls: StorageUrls,
}

impl AppConfig {
    /// Resolve configuration from the process environment (after loading `.env`).
    pub fn from_env(overrides: &ConfigOverrides) -> Result<Self> {
        env_util::init_env();
        Self::from_lookup(env_util::env_opt, overrides)
    }

    /// Resolve configuration from any key/value source.
    ///
    /// Missing required keys are reported together in one error.
    pub fn from_lookup<F>(lookup: F, overrides: &ConfigOverrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = match overrides.backend {
            Some(b) => b,
            None => get("CATALOG_BACKEND")
                .map(|raw| raw.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        let mut required: Vec<&str> = OBJECT_STORE_KEYS.to_vec();
        let database_url = DATABASE_URL_KEYS.iter().find_map(|k| get(*k));
        match backend {
            CatalogBackend::Rest => required.extend(REST_KEYS),
            CatalogBackend::Postgres if database_url.is_none() => required.push("DATABASE_URL"),
            CatalogBackend::Postgres => {}
        }
        env_util::preflight_check_with("video-catalog-sync", &required, &SNAPSHOT_KEYS, &get)?;

        let endpoint = normalize_endpoint(&get("B2_ENDPOINT").unwrap_or_default())?;
        let region = get("B2_REGION").unwrap_or_else(|| region_from_endpoint(&endpoint));
        let object_store = ObjectStoreConfig {
            endpoint,
            key_id: get("B2_KEY_ID").unwrap_or_default(),
            application_key: get("B2_APPLICATION_KEY").unwrap_or_default(),
            bucket: get("B2_BUCKET").unwrap_or_default(),
            region,
        };

        let rest_url = get("SUPABASE_URL")
            .map(|raw| normalize_endpoint(&raw))
            .transpose()?
            .unwrap_or_default();
        let catalog = CatalogConfig {
            backend,
            rest_url,
            api_key: get("SUPABASE_KEY").unwrap_or_default(),
            database_url,
            http_timeout_secs: parse_or(get("HTTP_TIMEOUT_SECS"), 30),
            max_connections: parse_or(get("DB_MAX_CONNS"), 2),
        };

        let write_scheme = match overrides.url_scheme {
            Some(s) => s,
            None => get("CATALOG_URL_SCHEME")
                .map(|raw| raw.parse())
                .transpose()?
                .unwrap_or_default(),
        };
        let urls = StorageUrls::new(
            &get("LEGACY_VIDEO_URL_BASE").unwrap_or_else(|| DEFAULT_LEGACY_BASE.to_string()),
            &get("B2_DOWNLOAD_HOST").unwrap_or_else(|| DEFAULT_DOWNLOAD_HOST.to_string()),
            &object_store.bucket,
            write_scheme,
        )?;

        Ok(Self {
            object_store,
            catalog,
            urls,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Accept bare hosts (`s3.us-west-004.backblazeb2.com`) as well as full URLs.
fn normalize_endpoint(raw: &str) -> Result<String> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let parsed =
        url::Url::parse(&candidate).with_context(|| format!("invalid endpoint url: {raw}"))?;
    if parsed.host_str().is_none() {
        return Err(anyhow!("endpoint url has no host: {raw}"));
    }
    Ok(candidate.trim_end_matches('/').to_string())
}

/// B2 endpoints embed the region: `https://s3.<region>.backblazeb2.com`.
fn region_from_endpoint(endpoint: &str) -> String {
    url::Url::parse(endpoint)
        .ok()
        .and_then(|u| {
            let host = u.host_str()?.to_ascii_lowercase();
            let mut parts = host.split('.');
            match (parts.next(), parts.next()) {
                (Some("s3"), Some(region)) if host.ends_with(".backblazeb2.com") => {
                    Some(region.to_string())
                }
                _ => None,
            }
        })
        .unwrap_or_else(|| "us-east-1".to_string())
}
