use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, info};

use super::CatalogStore;
use crate::normalization::storage_url::StorageUrls;

pub const CATALOG_BATCH_SIZE: i64 = 1000;

/// Point-in-time view of what the catalog already covers.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Storage keys referenced by at least one row.
    pub keys: HashSet<String>,
    /// Every row id seen, used to keep new ids unique.
    pub ids: HashSet<String>,
    pub rows: usize,
    /// Rows whose url did not resolve to a storage key.
    pub unresolved: usize,
}

/// Page through `videos` and collect the storage key behind every url.
pub async fn collect_catalog_keys(
    store: &dyn CatalogStore,
    urls: &StorageUrls,
) -> Result<CatalogSnapshot> {
    let mut snapshot = CatalogSnapshot::default();
    let mut offset: i64 = 0;

    loop {
        let batch = store.fetch_url_page(offset, CATALOG_BATCH_SIZE).await?;
        if batch.is_empty() {
            break;
        }
        let batch_len = batch.len();
        snapshot.rows += batch_len;

        for row in batch {
            match row.url.as_deref().and_then(|u| urls.key_from_url(u)) {
                Some(key) => {
                    snapshot.keys.insert(key);
                }
                None => snapshot.unresolved += 1,
            }
            snapshot.ids.insert(row.id);
        }
        debug!(offset, batch = batch_len, keys = snapshot.keys.len(), "catalog page processed");

        if (batch_len as i64) < CATALOG_BATCH_SIZE {
            break;
        }
        offset += CATALOG_BATCH_SIZE;
    }

    info!(
        backend = store.name(),
        rows = snapshot.rows,
        keys = snapshot.keys.len(),
        unresolved = snapshot.unresolved,
        "catalog key extraction complete"
    );
    Ok(snapshot)
}
