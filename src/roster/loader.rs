/// Roster loading from a local folder or through the offline dispatcher
///
/// Both sources produce the same `LoadedRoster`: the groups ready for
/// rendering plus a `DetailCache` of raw detail documents that lives
/// until the next load replaces it.

use futures::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::detail::parse_detail;
use super::manifest::group_roster;
use crate::error::{Result, RosterError};
use crate::offline::{self, Dispatcher, HttpFetcher};
use crate::state::data::{Group, LocomotiveDetail, RosterManifest};
use crate::state::settings::Settings;

/// File name of the roster manifest (matched case-insensitively)
pub const MANIFEST_FILE: &str = "roster.xml";

/// Path of the roster directory relative to the served app
const ROSTER_DIR: &str = "./roster/";

/// Raw detail documents keyed by file name
#[derive(Debug, Clone, Default)]
pub struct DetailCache {
    documents: HashMap<String, String>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(file_name.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Parse the detail document for `file_name` on demand
    pub fn detail(&self, file_name: &str) -> Result<LocomotiveDetail> {
        let text = self
            .documents
            .get(file_name)
            .ok_or_else(|| RosterError::DetailFetchFailed {
                file_name: file_name.to_string(),
                reason: "Loco file not found.".to_string(),
            })?;
        parse_detail(file_name, text)
    }
}

/// A fully loaded roster, ready for the view
#[derive(Debug, Clone, Default)]
pub struct LoadedRoster {
    pub groups: Vec<Group>,
    pub details: DetailCache,
    /// Distinct locomotives in the manifest
    pub locomotive_count: usize,
}

impl LoadedRoster {
    fn new(manifest: RosterManifest, details: DetailCache) -> Self {
        LoadedRoster {
            groups: group_roster(&manifest),
            details,
            locomotive_count: manifest.locomotives.len(),
        }
    }

    pub fn status_line(&self) -> String {
        format!(
            "{} locomotives in {} groups",
            self.locomotive_count,
            self.groups.len()
        )
    }
}

/// Load roster.xml and every other XML file found under `folder`
pub async fn load_from_folder(folder: PathBuf) -> Result<LoadedRoster> {
    info!("🔍 Scanning folder: {}", folder.display());

    let scan_root = folder.clone();
    let xml_files = tokio::task::spawn_blocking(move || find_xml_files(&scan_root))
        .await
        .map_err(|e| RosterError::Io(std::io::Error::other(e)))?;

    let manifest_path = xml_files
        .iter()
        .find(|p| is_manifest(p))
        .cloned()
        .ok_or_else(|| RosterError::ManifestMissing(folder.display().to_string()))?;

    let detail_paths: Vec<&PathBuf> = xml_files.iter().filter(|p| !is_manifest(p)).collect();
    let reads = detail_paths.iter().map(|path| tokio::fs::read_to_string(path));
    let contents = join_all(reads).await;

    let mut details = DetailCache::new();
    for (path, content) in detail_paths.iter().zip(contents) {
        let file_name = file_name_of(path);
        match content {
            Ok(text) => details.insert(file_name, text),
            Err(e) => warn!(
                "⚠️  {}",
                RosterError::DetailFetchFailed {
                    file_name,
                    reason: e.to_string()
                }
            ),
        }
    }

    let manifest_text = tokio::fs::read_to_string(&manifest_path)
        .await
        .map_err(|e| RosterError::ManifestMissing(format!("{}: {}", manifest_path.display(), e)))?;

    let roster = LoadedRoster::new(RosterManifest::parse(&manifest_text), details);
    info!("✅ Loaded {} with {} detail files", roster.status_line(), roster.details.len());
    Ok(roster)
}

/// Fetch roster.xml, then every detail document it names, concurrently
pub async fn load_from_network(dispatcher: &Dispatcher) -> Result<LoadedRoster> {
    let manifest_url = format!("{ROSTER_DIR}{MANIFEST_FILE}");
    let manifest_body = dispatcher
        .handle(&manifest_url)
        .await
        .map_err(|e| RosterError::ManifestMissing(e.to_string()))?;
    let manifest = RosterManifest::parse(&String::from_utf8_lossy(&manifest_body));

    let mut file_names: Vec<&str> = Vec::new();
    for loco in &manifest.locomotives {
        if !loco.file_name.is_empty() && !file_names.contains(&loco.file_name.as_str()) {
            file_names.push(&loco.file_name);
        }
    }

    let fetches = file_names
        .iter()
        .map(|name| async move {
            let url = format!("{ROSTER_DIR}{name}");
            (*name, dispatcher.handle(&url).await)
        });
    let results = join_all(fetches).await;

    let mut details = DetailCache::new();
    for (file_name, result) in results {
        match result {
            Ok(body) => details.insert(file_name, String::from_utf8_lossy(&body)),
            Err(e) => warn!(
                "⚠️  {}",
                RosterError::DetailFetchFailed {
                    file_name: file_name.to_string(),
                    reason: e.to_string()
                }
            ),
        }
    }

    let roster = LoadedRoster::new(manifest, details);
    info!("✅ Synced {} with {} detail files", roster.status_line(), roster.details.len());
    Ok(roster)
}

/// Prepare the offline layer for `settings` and load the served roster
pub async fn sync_roster(settings: Settings) -> Result<LoadedRoster> {
    let dispatcher = offline::prepare(&settings, Arc::new(HttpFetcher::new())).await?;
    load_from_network(&dispatcher).await
}

fn find_xml_files(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("xml"))
                .unwrap_or(false)
        })
        .collect();

    // Shallowest roster.xml wins if there are several
    files.sort_by_key(|p| p.components().count());
    files
}

fn is_manifest(path: &Path) -> bool {
    file_name_of(path).eq_ignore_ascii_case(MANIFEST_FILE)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::dispatcher::tests::FakeNetwork;
    use crate::offline::AssetCache;

    const ROSTER: &str = r#"<roster-config>
  <roster>
    <locomotive id="UP 844" fileName="UP_844.xml" roadName="Union Pacific" model="FEF-3">
      <keyvaluepair><key>RosterGroup:Steam</key><value>yes</value></keyvaluepair>
    </locomotive>
    <locomotive id="BNSF 5350" fileName="BNSF_5350.xml" roadName="BNSF" model="SD70MAC"/>
  </roster>
  <rosterGroup><group>Steam</group></rosterGroup>
</roster-config>"#;

    const UP_844: &str = r#"<locomotive-config><locomotive id="UP 844" mfg="Rivarossi">
        <decoder model="DH166D" family="series 6"/>
    </locomotive></locomotive-config>"#;

    #[tokio::test]
    async fn test_load_from_folder() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Roster.XML"), ROSTER).unwrap();
        std::fs::write(tmp.path().join("UP_844.xml"), UP_844).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let roster = load_from_folder(tmp.path().to_path_buf()).await.unwrap();

        assert_eq!(roster.locomotive_count, 2);
        assert_eq!(roster.groups.len(), 2);
        assert_eq!(roster.groups.iter().map(|g| g.members.len()).sum::<usize>(), 2);
        assert_eq!(roster.details.len(), 1);
        assert_eq!(roster.status_line(), "2 locomotives in 2 groups");

        let detail = roster.details.detail("UP_844.xml").unwrap();
        assert_eq!(detail.decoder_label, "Digitrax DH166D");
    }

    #[tokio::test]
    async fn test_missing_detail_file_is_reported_on_demand() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("roster.xml"), ROSTER).unwrap();

        let roster = load_from_folder(tmp.path().to_path_buf()).await.unwrap();
        let err = roster.details.detail("BNSF_5350.xml").unwrap_err();

        assert!(matches!(err, RosterError::DetailFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_folder_without_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("UP_844.xml"), UP_844).unwrap();

        let err = load_from_folder(tmp.path().to_path_buf()).await.unwrap_err();
        assert!(matches!(err, RosterError::ManifestMissing(_)));
    }

    fn network_dispatcher(net: Arc<FakeNetwork>, root: &Path) -> Dispatcher {
        let cache = AssetCache::open(root, "v1").unwrap();
        Dispatcher::new(net, cache).with_base(reqwest::Url::parse("http://jmri.local/app/").unwrap())
    }

    #[tokio::test]
    async fn test_load_from_network_skips_failed_details() {
        let tmp = tempfile::tempdir().unwrap();
        let net = Arc::new(FakeNetwork::with(&[
            ("http://jmri.local/app/roster/roster.xml", ROSTER),
            ("http://jmri.local/app/roster/UP_844.xml", UP_844),
        ]));
        let dispatcher = network_dispatcher(net, tmp.path());

        let roster = load_from_network(&dispatcher).await.unwrap();

        assert_eq!(roster.locomotive_count, 2);
        assert_eq!(roster.details.len(), 1);
        assert!(roster.details.detail("UP_844.xml").is_ok());
        assert!(roster.details.detail("BNSF_5350.xml").is_err());
    }

    #[tokio::test]
    async fn test_network_manifest_served_from_cache_when_offline() {
        let tmp = tempfile::tempdir().unwrap();
        let net = Arc::new(FakeNetwork::with(&[
            ("http://jmri.local/app/roster/roster.xml", ROSTER),
            ("http://jmri.local/app/roster/UP_844.xml", UP_844),
        ]));
        let dispatcher = network_dispatcher(net.clone(), tmp.path());
        load_from_network(&dispatcher).await.unwrap();

        net.disconnect();
        let roster = load_from_network(&dispatcher).await.unwrap();

        assert_eq!(roster.locomotive_count, 2);
        assert_eq!(roster.details.len(), 1);
    }

    #[tokio::test]
    async fn test_network_manifest_never_fetched() {
        let tmp = tempfile::tempdir().unwrap();
        let net = Arc::new(FakeNetwork::default());
        net.disconnect();
        let dispatcher = network_dispatcher(net, tmp.path());

        let err = load_from_network(&dispatcher).await.unwrap_err();
        assert!(matches!(err, RosterError::ManifestMissing(_)));
    }
}
