/// Versioned on-disk response cache
///
/// Each cache generation is a directory named after its version string:
///   <root>/<version>/index.json   url -> stored file
///   <root>/<version>/0000.bin     response bodies
///
/// The index also records whether the install step for the generation
/// ever completed, independent of what else has been stored in it.
///
/// Activation removes every generation except the current one.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    file: String,
    /// Unix timestamp of the last store
    stored_at: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheIndex {
    entries: BTreeMap<String, CacheEntry>,
    /// Set once every listed asset has been stored
    #[serde(default)]
    installed: bool,
}

/// One named cache generation
#[derive(Debug, Clone)]
pub struct AssetCache {
    root: PathBuf,
    name: String,
}

impl AssetCache {
    /// Open (or create) the generation `name` under `root`
    pub fn open(root: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self> {
        let cache = AssetCache {
            root: root.into(),
            name: name.into(),
        };
        fs::create_dir_all(cache.dir())?;
        Ok(cache)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    fn load_index(&self) -> Result<CacheIndex> {
        let path = self.dir().join(INDEX_FILE);
        if !path.exists() {
            return Ok(CacheIndex::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_index(&self, index: &CacheIndex) -> Result<()> {
        let json = serde_json::to_string_pretty(index)?;
        fs::write(self.dir().join(INDEX_FILE), json)?;
        Ok(())
    }

    /// Store a response body, replacing any earlier one for the same url
    pub fn put(&self, url: &str, body: &[u8]) -> Result<()> {
        let mut index = self.load_index()?;

        let file = match index.entries.get(url) {
            Some(entry) => entry.file.clone(),
            None => format!("{:04}.bin", index.entries.len()),
        };
        fs::write(self.dir().join(&file), body)?;

        index.entries.insert(
            url.to_string(),
            CacheEntry {
                file,
                stored_at: Utc::now().timestamp(),
            },
        );
        self.save_index(&index)?;

        debug!("Cached {} ({} bytes) in {}", url, body.len(), self.name);
        Ok(())
    }

    /// Look up a stored response body; a miss is `Ok(None)`
    pub fn match_url(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let index = self.load_index()?;
        match index.entries.get(url) {
            Some(entry) => Ok(Some(fs::read(self.dir().join(&entry.file))?)),
            None => Ok(None),
        }
    }

    /// Number of stored responses
    pub fn len(&self) -> Result<usize> {
        Ok(self.load_index()?.entries.len())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Record that the install step for this generation completed
    pub fn mark_installed(&self) -> Result<()> {
        let mut index = self.load_index()?;
        index.installed = true;
        self.save_index(&index)
    }

    pub fn is_installed(&self) -> Result<bool> {
        Ok(self.load_index()?.installed)
    }

    /// Delete every sibling generation not named like this one
    ///
    /// Returns the names that were removed.
    pub fn delete_other_generations(&self) -> Result<Vec<String>> {
        let mut removed = Vec::new();

        for name in cache_names(&self.root)? {
            if name != self.name {
                fs::remove_dir_all(self.root.join(&name))?;
                info!("🧹 Removed stale cache {}", name);
                removed.push(name);
            }
        }

        removed.sort();
        Ok(removed)
    }
}

/// Names of every cache generation present under `root`
pub fn cache_names(root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    Ok(names)
}
