use anyhow::{Context, Result};
use repoharvest_mirror::{MirrorRepository, RepoIdentity, checkpoint, lock};
use std::path::Path;
use tracing::info;

pub fn run(repo_url: &str, mirror_root: Option<&str>, config_file: Option<&Path>) -> Result<()> {
    let config = super::load_config(mirror_root, config_file)?;
    let identity = RepoIdentity::parse(repo_url)?;

    let parent = config.mirror_root();
    let _lock = lock::acquire(&parent, &identity, "delete")?;

    let mut mirror = MirrorRepository::open(identity.clone(), &parent, &[])?;
    mirror
        .delete()
        .with_context(|| format!("failed to delete mirror for {}", identity.canonical()))?;

    // The checkpoint belongs to the deleted mirror; a fresh clone must not
    // inherit it.
    let checkpoint = checkpoint::checkpoint_path(mirror.location());
    match std::fs::remove_file(&checkpoint) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).context("failed to remove checkpoint file"),
    }

    info!(repository = %identity.canonical(), "mirror deleted");
    Ok(())
}
