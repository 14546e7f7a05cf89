/// Offline support for the networked roster source
///
/// This module handles:
/// - Versioned on-disk response caching (cache.rs)
/// - Network access behind a swappable trait (fetch.rs)
/// - Routing each request to its caching policy (dispatcher.rs)

pub mod cache;
pub mod dispatcher;
pub mod fetch;

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub use cache::AssetCache;
pub use dispatcher::Dispatcher;
pub use fetch::{Fetcher, HttpFetcher};

use crate::error::{Result, RosterError};
use crate::state::settings::{self, Settings};

/// Build the dispatcher for `settings`, installing and activating its cache
///
/// Install runs until it has completed once for the cache generation. A
/// failed install is logged and retried on the next launch; the dispatcher
/// is still usable in the meantime.
pub async fn prepare(settings: &Settings, fetcher: Arc<dyn Fetcher>) -> Result<Dispatcher> {
    prepare_in(&settings::offline_cache_dir(), settings, fetcher).await
}

async fn prepare_in(
    cache_root: &Path,
    settings: &Settings,
    fetcher: Arc<dyn Fetcher>,
) -> Result<Dispatcher> {
    let base_url = settings
        .roster_url
        .as_deref()
        .ok_or_else(|| RosterError::ManifestMissing("no roster URL configured".into()))?;
    // Url::join drops the last path segment unless it ends in '/'
    let base_url = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    let base = reqwest::Url::parse(&base_url)
        .map_err(|e| RosterError::ManifestMissing(format!("bad roster URL {base_url}: {e}")))?;

    let cache = AssetCache::open(cache_root, &settings.cache_version)?;
    let dispatcher = Dispatcher::new(fetcher, cache).with_base(base);

    if !dispatcher.is_installed()? {
        if let Err(e) = dispatcher.install(&settings.assets).await {
            warn!("⚠️  Offline install incomplete: {}", e);
        }
    }

    let removed = dispatcher.activate()?;
    if !removed.is_empty() {
        info!("🧹 Activated {}, removed {} old caches", settings.cache_version, removed.len());
    }

    Ok(dispatcher)
}
