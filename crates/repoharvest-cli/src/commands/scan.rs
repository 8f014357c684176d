use anyhow::{Context, Result};
use repoharvest_mirror::{MirrorRepository, RepoIdentity, lock};
use repoharvest_scan::scanner::{FileLog, FileListScanner, StoreSyncScanner, SyncOutcome};
use repoharvest_scan::{BranchScanners, Scanner, run_scan};
use repoharvest_store::FsObjectStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[allow(clippy::too_many_arguments)]
pub fn run(
    repo_url: &str,
    branches: &[String],
    branch_override: Option<&str>,
    full_scan: bool,
    pull: bool,
    sync_store: bool,
    mirror_root: Option<&str>,
    config_file: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(mirror_root, config_file)?;
    let identity = RepoIdentity::parse(repo_url)?;

    let parent = config.mirror_root();
    let _lock = lock::acquire(&parent, &identity, "scan")?;

    let mirror = if pull {
        super::pull::update_locked(&config, &identity, branches)?.0
    } else {
        MirrorRepository::open(identity.clone(), &parent, branches)?
    };

    let store = sync_store.then(|| FsObjectStore::new(config.store_root()));
    let store_prefix = format!("{}/{}", identity.organization, identity.name);
    let file_log: FileLog = Arc::default();
    let outcome: SyncOutcome = Arc::default();

    // Production branch carries the full scanner set; the development
    // branch (or its override) the reduced one.
    let mut production: Vec<Box<dyn Scanner + '_>> =
        vec![Box::new(FileListScanner::new(file_log.clone()))];
    if let Some(store) = &store {
        production.push(Box::new(StoreSyncScanner::new(
            store,
            mirror.location(),
            &store_prefix,
            outcome.clone(),
        )));
    }
    let development: Vec<Box<dyn Scanner + '_>> =
        vec![Box::new(FileListScanner::new(file_log.clone()))];

    let dev_branch = branch_override.unwrap_or(&config.scan.development_branch);
    let mut sets = vec![
        BranchScanners::new(&config.scan.production_branch, production),
        BranchScanners::new(dev_branch, development),
    ];

    let status = run_scan(&mirror, &mut sets, full_scan)
        .with_context(|| format!("scan failed for {}", identity.canonical()))?;

    let scanned: Vec<String> = file_log
        .lock()
        .map(|log| log.iter().map(|(path, _)| path.clone()).collect())
        .unwrap_or_default();
    info!(files = scanned.len(), "scan complete");

    let mut output = serde_json::to_value(&status)?;
    output["scannedFiles"] = serde_json::to_value(&scanned)?;
    if let Some(summary) = outcome.lock().ok().and_then(|mut slot| slot.take()) {
        output["storeSync"] = serde_json::to_value(&summary)?;
    }
    super::print_json(&output)
}
