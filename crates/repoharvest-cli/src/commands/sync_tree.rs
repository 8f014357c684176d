use anyhow::{Context, Result};
use repoharvest_store::{FsObjectStore, reconcile_tree};
use std::collections::BTreeSet;
use std::path::Path;

pub fn run(
    local_root: &Path,
    prefix: &str,
    offset: Option<&str>,
    excludes: &[String],
    config_file: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(None, config_file)?;
    let store = FsObjectStore::new(config.store_root());
    let excluded: BTreeSet<String> = excludes.iter().cloned().collect();

    let summary = reconcile_tree(
        &store,
        local_root,
        prefix,
        offset.map(Path::new),
        &excluded,
    )
    .with_context(|| {
        format!(
            "tree reconciliation failed for {} under prefix {prefix:?}",
            local_root.display()
        )
    })?;

    super::print_json(&summary)
}
