use crate::store::ObjectStore;
use ignore::WalkBuilder;
use repoharvest_core::error::StoreError;
use repoharvest_core::types::SyncSummary;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One pending upload: a local file and the key it lands under.
#[derive(Debug, Clone)]
pub struct Upload {
    pub key: String,
    pub source: PathBuf,
}

/// Derived add/update/delete sets making the store match the local tree.
/// Never persisted; compute, then apply.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    pub to_add: Vec<Upload>,
    pub to_update: Vec<Upload>,
    pub to_delete: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Compare a local directory against the store keys under `prefix` and
/// plan the minimal set of uploads and removals.
///
/// Local files are enumerated under `local_root` (descended into `offset`
/// when given); hidden files and directories are not enumerated, so a
/// mirror's `.git` never syncs. A file at relative path `p` maps to key
/// `prefix/p`. With an empty prefix the run is restricted to the top
/// level on both sides: only single-segment keys and root-level local
/// files participate, so unrelated nested prefixes are never touched.
/// Matching objects are compared byte-for-byte and planned for update
/// only when they differ.
///
/// Unmatched store keys are planned for deletion unless their first
/// segment after the prefix is in `excluded`; that set protects sibling
/// trees sharing the prefix space.
pub fn compute_plan(
    store: &dyn ObjectStore,
    local_root: &Path,
    prefix: &str,
    offset: Option<&Path>,
    excluded: &BTreeSet<String>,
) -> Result<ReconcilePlan, StoreError> {
    let walk_root = match offset {
        Some(offset) => local_root.join(offset),
        None => local_root.to_path_buf(),
    };
    if !walk_root.is_dir() {
        return Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("local root {} is not a directory", walk_root.display()),
        )));
    }

    let local = enumerate_local(&walk_root, prefix);
    let mut remote = list_scoped(store, prefix)?;

    let mut plan = ReconcilePlan::default();
    for (key, source) in local {
        if remote.remove(&key) {
            let stored = store.get(&key)?;
            let current = std::fs::read(&source)?;
            if stored != current {
                plan.to_update.push(Upload { key, source });
            }
        } else {
            plan.to_add.push(Upload { key, source });
        }
    }

    for key in remote {
        let top = top_level_segment(&key, prefix);
        if excluded.contains(top) {
            debug!(key = %key, "unmatched object under excluded name; kept");
            continue;
        }
        plan.to_delete.push(key);
    }
    Ok(plan)
}

/// Apply a plan: uploads for adds and updates, removals for deletes.
/// Objects are independent; there is no cross-object transaction.
pub fn apply_plan(
    store: &dyn ObjectStore,
    plan: &ReconcilePlan,
) -> Result<SyncSummary, StoreError> {
    let mut summary = SyncSummary::default();
    for upload in &plan.to_add {
        debug!(key = %upload.key, "uploading new object");
        store.put_file(&upload.key, &upload.source)?;
        summary.added.push(upload.key.clone());
    }
    for upload in &plan.to_update {
        debug!(key = %upload.key, "uploading changed object");
        store.put_file(&upload.key, &upload.source)?;
        summary.updated.push(upload.key.clone());
    }
    for key in &plan.to_delete {
        debug!(key = %key, "deleting unmatched object");
        store.delete(key)?;
        summary.deleted.push(key.clone());
    }
    summary.sort();
    Ok(summary)
}

/// Compute and apply in one pass; the usual entry point.
pub fn reconcile_tree(
    store: &dyn ObjectStore,
    local_root: &Path,
    prefix: &str,
    offset: Option<&Path>,
    excluded: &BTreeSet<String>,
) -> Result<SyncSummary, StoreError> {
    let plan = compute_plan(store, local_root, prefix, offset, excluded)?;
    let summary = apply_plan(store, &plan)?;
    info!(
        added = summary.added.len(),
        updated = summary.updated.len(),
        deleted = summary.deleted.len(),
        "tree reconciliation complete"
    );
    Ok(summary)
}

/// Local files keyed by their target store key, sorted for deterministic
/// plan order.
fn enumerate_local(walk_root: &Path, prefix: &str) -> BTreeMap<String, PathBuf> {
    let mut walker = WalkBuilder::new(walk_root);
    walker
        .hidden(true)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false);

    let mut files = BTreeMap::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("local walk error: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let rel = path.strip_prefix(walk_root).unwrap_or(path);
        let rel_key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if prefix.is_empty() && rel_key.contains('/') {
            debug!(path = %rel_key, "nested file outside an empty-prefix run; skipped");
            continue;
        }
        let key = if prefix.is_empty() {
            rel_key
        } else {
            format!("{prefix}/{rel_key}")
        };
        files.insert(key, path.to_path_buf());
    }
    files
}

/// Store keys participating in a run: everything under `prefix/`, or only
/// single-segment keys when the prefix is empty.
fn list_scoped(store: &dyn ObjectStore, prefix: &str) -> Result<BTreeSet<String>, StoreError> {
    if prefix.is_empty() {
        let keys = store.list("")?;
        return Ok(keys.into_iter().filter(|k| !k.contains('/')).collect());
    }
    let keys = store.list(&format!("{prefix}/"))?;
    Ok(keys.into_iter().collect())
}

fn top_level_segment<'k>(key: &'k str, prefix: &str) -> &'k str {
    let rel = match key.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() => rest.strip_prefix('/').unwrap_or(rest),
        _ => key,
    };
    rel.split('/').next().unwrap_or(rel)
}
