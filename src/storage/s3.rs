use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use tracing::instrument;

use super::{ObjectPage, ObjectSource, StorageObject};
use crate::config::ObjectStoreConfig;

/// ListObjectsV2 caps a page at 1000 keys.
pub const MAX_KEYS_PER_PAGE: i32 = 1000;

/// S3-compatible bucket listing (Backblaze B2, MinIO, AWS).
///
/// Requests are SigV4-signed with static credentials and use path-style
/// addressing, which every S3-compatible provider accepts.
#[derive(Debug, Clone)]
pub struct S3ObjectSource {
    client: Client,
    bucket: String,
}

impl S3ObjectSource {
    pub fn new(cfg: &ObjectStoreConfig) -> Self {
        let credentials = Credentials::new(
            cfg.key_id.clone(),
            cfg.application_key.clone(),
            None,
            None,
            "video-catalog-sync",
        );
        let conf = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(cfg.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectSource for S3ObjectSource {
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list_page(&self, token: Option<String>) -> Result<ObjectPage> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(MAX_KEYS_PER_PAGE)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| {
                anyhow!(
                    "list_objects_v2 failed for bucket {}: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                )
            })?;

        let objects = resp
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?.to_string();
                let last_modified = obj
                    .last_modified()
                    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos()));
                Some(StorageObject {
                    key,
                    size: obj.size().unwrap_or(0).max(0) as u64,
                    last_modified,
                })
            })
            .collect();

        let next_token = if resp.is_truncated().unwrap_or(false) {
            resp.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            next_token,
        })
    }
}
