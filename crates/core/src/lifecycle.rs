//! Store provisioning and retirement.
//!
//! The lifecycle controller owns which store names exist; the strategies
//! never create or delete stores. Provisioning fetches the configured static
//! asset list into the static store; retirement deletes stores left behind by
//! prior versions (same prefix, no longer in the current set). Stores outside
//! the configured prefix are never touched.

use url::Url;

use crate::cache::{Request, StoreSet};
use crate::config::EngineConfig;
use crate::engine::Fetcher;
use crate::Error;

/// Fetch every configured static asset into the static store.
///
/// Fails on the first asset that cannot be fetched or stored; provisioning
/// is expected to run with connectivity, before the engine serves requests.
pub async fn provision(stores: &StoreSet, fetcher: &dyn Fetcher, config: &EngineConfig) -> Result<(), Error> {
    for asset in &config.static_assets {
        let url = Url::parse(asset).map_err(|e| Error::Network(format!("invalid asset url {asset}: {e}")))?;
        let req = Request::get(url);
        let resp = fetcher.fetch(&req).await?;
        stores.put(&config.static_store, &req.key(), &resp).await?;
    }

    tracing::info!(
        store = config.static_store,
        assets = config.static_assets.len(),
        "provisioned static store"
    );

    Ok(())
}

/// Delete stores from prior versions.
///
/// A store is stale when its name starts with the configured prefix but is
/// not one of the three current store names. Returns the names of the
/// retired stores.
pub async fn retire_stale(stores: &StoreSet, config: &EngineConfig) -> Result<Vec<String>, Error> {
    let current = config.current_stores();
    let mut retired = Vec::new();

    for name in stores.store_names().await? {
        if name.starts_with(&config.store_prefix) && !current.contains(&name.as_str()) {
            let deleted = stores.delete_store(&name).await?;
            tracing::warn!(store = name, entries = deleted, "retired stale store");
            retired.push(name);
        }
    }

    Ok(retired)
}
