use anyhow::{Context, Result};
use repoharvest_core::config::Config;
use repoharvest_core::types::MirrorStatus;
use repoharvest_host::BoundRepo;
use repoharvest_mirror::{MirrorRepository, RepoIdentity, checkpoint, lock};
use std::path::Path;
use tracing::info;

pub fn run(
    repo_url: &str,
    branches: &[String],
    mirror_root: Option<&str>,
    config_file: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(mirror_root, config_file)?;
    let identity = RepoIdentity::parse(repo_url)?;

    let parent = config.mirror_root();
    let _lock = lock::acquire(&parent, &identity, "pull")?;
    let (mirror, pushed_at) = update_locked(&config, &identity, branches)?;

    let status = MirrorStatus {
        ref_positions: mirror.ref_positions()?,
        last_modified: pushed_at,
    };
    super::print_json(&status)
}

/// Update the mirror and record the checkpoint. The caller holds the
/// repository lock.
///
/// The remote's push time is read before the fetch, so a push landing
/// mid-run stays ahead of the recorded checkpoint and is re-observed next
/// run; the checkpoint itself is only written once the fetch succeeds.
pub(crate) fn update_locked(
    config: &Config,
    identity: &RepoIdentity,
    branches: &[String],
) -> Result<(MirrorRepository, i64)> {
    let session = super::open_session(&identity.host, config)?;
    let bound = BoundRepo::for_identity(&session, identity);
    let pushed_at = bound
        .pushed_at()
        .with_context(|| format!("failed to read metadata for {}", identity.canonical()))?;

    let mut mirror = MirrorRepository::open(identity.clone(), &config.mirror_root(), branches)?;
    mirror
        .update(&bound)
        .with_context(|| format!("mirror update failed for {}", identity.canonical()))?;
    checkpoint::write_checkpoint(mirror.location(), pushed_at)?;

    info!(
        repository = %identity.canonical(),
        pushed_at,
        "mirror updated"
    );
    Ok((mirror, pushed_at))
}
