use crate::identity::RepoIdentity;
use fs2::FileExt;
use repoharvest_core::constants;
use repoharvest_core::error::MirrorError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const LOCK_FILE_SUFFIX: &str = ".lock";

/// Exclusive per-repository lock. Held for the duration of any mutating
/// sequence on a mirror; released on drop.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
    path: PathBuf,
}

impl RepoLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Lock file name for a repository identity. Pure: same identity, same name.
///
/// The readable `host-org-name` part is sanitized, so it alone could alias
/// two identities (`a-b/c` vs `a/b-c`); the digest of the unsanitized triple
/// keeps the mapping injective.
pub fn lock_file_name(identity: &RepoIdentity) -> String {
    let digest = blake3::hash(identity.canonical().as_bytes());
    format!(
        "{}{}-{}-{}-{}{}",
        constants::LOCK_FILE_PREFIX,
        sanitize(&identity.host),
        sanitize(&identity.organization),
        sanitize(&identity.name),
        &digest.to_hex()[..8],
        LOCK_FILE_SUFFIX
    )
}

/// Full lock path: in the mirror parent directory, never inside the mirror.
pub fn lock_path(parent_dir: &Path, identity: &RepoIdentity) -> PathBuf {
    parent_dir.join(lock_file_name(identity))
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect()
}

/// Acquire the repository lock, blocking until the current holder releases.
pub fn acquire(
    parent_dir: &Path,
    identity: &RepoIdentity,
    operation: &str,
) -> Result<RepoLock, MirrorError> {
    let path = lock_path(parent_dir, identity);
    let file = open_lock_file(&path)?;
    debug!(lock_path = %path.display(), operation, "waiting for repository lock");
    file.lock_exclusive().map_err(MirrorError::Io)?;
    stamp(&file, identity, operation);
    Ok(RepoLock { file, path })
}

/// Acquire the repository lock without blocking; a held lock is a typed
/// busy error.
pub fn try_acquire(
    parent_dir: &Path,
    identity: &RepoIdentity,
    operation: &str,
) -> Result<RepoLock, MirrorError> {
    let path = lock_path(parent_dir, identity);
    let file = open_lock_file(&path)?;
    if let Err(err) = file.try_lock_exclusive() {
        if err.kind() == std::io::ErrorKind::WouldBlock {
            return Err(MirrorError::lock_busy(
                identity.canonical(),
                path.display().to_string(),
            ));
        }
        return Err(MirrorError::Io(err));
    }
    stamp(&file, identity, operation);
    Ok(RepoLock { file, path })
}

fn open_lock_file(path: &Path) -> Result<File, MirrorError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(MirrorError::Io)?;
    }
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(MirrorError::Io)
}

fn stamp(mut file: &File, identity: &RepoIdentity, operation: &str) {
    let _ = file.set_len(0);
    let _ = writeln!(file, "operation={operation}");
    let _ = writeln!(file, "pid={}", std::process::id());
    let _ = writeln!(file, "repository={}", identity.canonical());
    let _ = writeln!(file, "timestamp={}", repoharvest_core::time::now_iso8601());
    let _ = file.sync_data();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(host: &str, org: &str, name: &str) -> RepoIdentity {
        RepoIdentity {
            host: host.to_string(),
            organization: org.to_string(),
            name: name.to_string(),
            url: format!("https://{host}/{org}/{name}"),
        }
    }

    #[test]
    fn lock_file_name_is_deterministic() {
        let a = identity("github.com", "acme", "widgets");
        assert_eq!(lock_file_name(&a), lock_file_name(&a.clone()));
        assert!(lock_file_name(&a).starts_with(constants::LOCK_FILE_PREFIX));
        assert!(lock_file_name(&a).contains("github.com-acme-widgets"));
    }

    #[test]
    fn separator_collisions_map_to_distinct_names() {
        // Sanitized parts are identical here; only the digest tells them apart.
        let a = identity("a-b", "c", "d");
        let b = identity("a", "b-c", "d");
        assert_ne!(lock_file_name(&a), lock_file_name(&b));
    }

    #[test]
    fn lock_lands_in_parent_dir_not_mirror() {
        let tmp = tempfile::tempdir().unwrap();
        let id = identity("github.com", "acme", "widgets");
        let lock = acquire(tmp.path(), &id, "update").unwrap();

        assert!(lock.path().exists());
        assert_eq!(lock.path().parent().unwrap(), tmp.path());
        assert!(!lock.path().starts_with(id.location_under(tmp.path())));

        let content = std::fs::read_to_string(lock.path()).unwrap();
        assert!(content.contains("operation=update"));
        assert!(content.contains("repository=github.com/acme/widgets"));
    }

    #[test]
    fn second_try_acquire_reports_busy() {
        let tmp = tempfile::tempdir().unwrap();
        let id = identity("github.com", "acme", "widgets");
        let _held = acquire(tmp.path(), &id, "scan").unwrap();

        let err = try_acquire(tmp.path(), &id, "delete").unwrap_err();
        assert!(matches!(err, MirrorError::LockBusy { .. }));
    }

    #[test]
    fn lock_can_be_reacquired_after_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let id = identity("github.com", "acme", "widgets");
        {
            let _lock = acquire(tmp.path(), &id, "first").unwrap();
        }
        let second = try_acquire(tmp.path(), &id, "second").unwrap();
        let content = std::fs::read_to_string(second.path()).unwrap();
        assert!(content.contains("operation=second"));
    }

    #[test]
    fn distinct_repos_lock_independently() {
        let tmp = tempfile::tempdir().unwrap();
        let a = identity("github.com", "acme", "widgets");
        let b = identity("github.com", "acme", "gadgets");
        let _lock_a = acquire(tmp.path(), &a, "update").unwrap();
        // Holding a's lock must not block b.
        let _lock_b = try_acquire(tmp.path(), &b, "update").unwrap();
    }
}
