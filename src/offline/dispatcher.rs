/// Request dispatcher for the offline layer
///
/// Every request goes through one ordered rule list; the first rule whose
/// pattern matches the url picks the caching policy:
/// - XML documents (the roster) are network-first with cache fallback
/// - everything else is cache-first, going to the network only on a miss

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::AssetCache;
use super::fetch::Fetcher;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Serve from cache; fetch (without storing) only on a miss
    CacheFirst,
    /// Always try the network; refresh the cache on success, fall back on failure
    NetworkFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Substring the url must contain ("" matches everything)
    pub pattern: &'static str,
    pub policy: Policy,
}

/// Most specific pattern first
pub const DEFAULT_RULES: [Rule; 2] = [
    Rule {
        pattern: ".xml",
        policy: Policy::NetworkFirst,
    },
    Rule {
        pattern: "",
        policy: Policy::CacheFirst,
    },
];

pub struct Dispatcher {
    fetcher: Arc<dyn Fetcher>,
    cache: AssetCache,
    base: Option<reqwest::Url>,
    rules: Vec<Rule>,
}

impl Dispatcher {
    pub fn new(fetcher: Arc<dyn Fetcher>, cache: AssetCache) -> Self {
        Dispatcher {
            fetcher,
            cache,
            base: None,
            rules: DEFAULT_RULES.to_vec(),
        }
    }

    /// Resolve relative urls ("./index.html") against `base`
    pub fn with_base(mut self, base: reqwest::Url) -> Self {
        self.base = Some(base);
        self
    }

    /// Absolute form of `url`, used both for fetching and as the cache key
    pub fn resolve(&self, url: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(url)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| url.to_string()),
            None => url.to_string(),
        }
    }

    /// The policy of the first rule matching `url`
    pub fn policy_for(&self, url: &str) -> Policy {
        self.rules
            .iter()
            .find(|rule| url.contains(rule.pattern))
            .map(|rule| rule.policy)
            .unwrap_or(Policy::CacheFirst)
    }

    /// Serve one request according to its policy
    pub async fn handle(&self, url: &str) -> Result<Vec<u8>> {
        let url = self.resolve(url);

        match self.policy_for(&url) {
            Policy::CacheFirst => {
                if let Some(body) = self.cache.match_url(&url)? {
                    debug!("Cache hit: {}", url);
                    return Ok(body);
                }
                self.fetcher.fetch(&url).await
            }
            Policy::NetworkFirst => match self.fetcher.fetch(&url).await {
                Ok(body) => {
                    if let Err(e) = self.cache.put(&url, &body) {
                        warn!("⚠️  Could not cache {}: {}", url, e);
                    }
                    Ok(body)
                }
                Err(network_err) => {
                    warn!("⚠️  Network failed for {}, trying cache: {}", url, network_err);
                    match self.cache.match_url(&url)? {
                        Some(body) => Ok(body),
                        None => Err(network_err),
                    }
                }
            },
        }
    }

    /// Pre-fetch and store every asset
    ///
    /// All-or-nothing: nothing is stored unless every fetch succeeds.
    pub async fn install(&self, assets: &[String]) -> Result<usize> {
        let mut fetched = Vec::with_capacity(assets.len());
        for asset in assets {
            let url = self.resolve(asset);
            let body = self.fetcher.fetch(&url).await?;
            fetched.push((url, body));
        }

        for (url, body) in &fetched {
            self.cache.put(url, body)?;
        }
        self.cache.mark_installed()?;

        info!("📦 Installed {} assets into {}", assets.len(), self.cache.name());
        Ok(assets.len())
    }

    /// Whether `install` has completed for the current generation
    pub fn is_installed(&self) -> Result<bool> {
        self.cache.is_installed()
    }

    /// Drop every cache generation except the current one
    pub fn activate(&self) -> Result<Vec<String>> {
        self.cache.delete_other_generations()
    }
}
