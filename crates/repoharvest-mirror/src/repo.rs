use crate::identity::RepoIdentity;
use git2::build::CheckoutBuilder;
use git2::{
    BranchType, Cred, DiffOptions, FetchOptions, RemoteCallbacks, Repository, ResetType,
    Signature, Tree,
};
use repoharvest_core::constants;
use repoharvest_core::error::{HostError, MirrorError};
use repoharvest_core::types::RefPosition;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What `update()` needs from the upstream side: which branches exist there
/// and what token (if any) authenticates a fetch.
pub trait UpstreamSource {
    fn live_branches(&self) -> Result<BTreeSet<String>, HostError>;
    fn fetch_token(&self) -> Option<&str>;
}

/// Local mirror of a subset of one remote repository's branches.
///
/// Opening is cheap and touches only the local filesystem; the underlying
/// git handle is absent until the first successful clone. All mutating
/// operations assume the caller holds the repository lock.
pub struct MirrorRepository {
    identity: RepoIdentity,
    location: PathBuf,
    parent_dir: PathBuf,
    tracked_branches: BTreeSet<String>,
    repo: Option<Repository>,
}

impl MirrorRepository {
    /// Open a mirror under `parent_dir` at the derived
    /// `<parent>/<host>/<org>/<name>` location.
    pub fn open(
        identity: RepoIdentity,
        parent_dir: &Path,
        tracked_branches: &[String],
    ) -> Result<Self, MirrorError> {
        let location = identity.location_under(parent_dir);
        Ok(Self {
            repo: Repository::open(&location).ok(),
            identity,
            location,
            parent_dir: parent_dir.to_path_buf(),
            tracked_branches: tracked_branches.iter().cloned().collect(),
        })
    }

    /// Open a mirror at an explicit location; the parent directory is derived
    /// back from it so lock and checkpoint placement stay consistent.
    pub fn open_at(
        identity: RepoIdentity,
        location: &Path,
        tracked_branches: &[String],
    ) -> Result<Self, MirrorError> {
        let parent_dir = RepoIdentity::parent_from_location(location).map_err(|e| {
            MirrorError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e.to_string(),
            ))
        })?;
        Ok(Self {
            repo: Repository::open(location).ok(),
            identity,
            location: location.to_path_buf(),
            parent_dir,
            tracked_branches: tracked_branches.iter().cloned().collect(),
        })
    }

    pub fn identity(&self) -> &RepoIdentity {
        &self.identity
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn parent_dir(&self) -> &Path {
        &self.parent_dir
    }

    pub fn tracked_branches(&self) -> &BTreeSet<String> {
        &self.tracked_branches
    }

    /// Clone if needed, fetch, and fast-forward every tracked branch that
    /// exists upstream. Branches absent upstream are skipped for this run.
    pub fn update<U: UpstreamSource>(&mut self, upstream: &U) -> Result<(), MirrorError> {
        let live = upstream.live_branches()?;
        let run_branches: Vec<String> = self
            .tracked_branches
            .iter()
            .filter(|b| live.contains(*b))
            .cloned()
            .collect();
        for branch in &self.tracked_branches {
            if !live.contains(branch) {
                debug!(branch = %branch, "tracked branch absent upstream; skipped this run");
            }
        }
        if run_branches.is_empty() {
            warn!(
                repository = %self.identity.canonical(),
                "no tracked branch exists upstream; nothing to fetch"
            );
            return Ok(());
        }

        let refspecs: Vec<String> = run_branches
            .iter()
            .map(|b| format!("refs/heads/{b}:refs/remotes/origin/{b}"))
            .collect();

        // A missing handle or an empty repository (crash between init and
        // first fetch) both mean the on-disk state cannot be trusted.
        let stale = match &self.repo {
            None => true,
            Some(repo) => repo.is_empty().map_err(MirrorError::git)?,
        };
        if stale {
            self.repo = None;
            if self.location.exists() {
                warn!(
                    location = %self.location.display(),
                    "removing stale mirror directory before fresh clone"
                );
                std::fs::remove_dir_all(&self.location)?;
            }
            let repo = Repository::init(&self.location).map_err(MirrorError::git)?;
            repo.remote_with_fetch(constants::ORIGIN_REMOTE, &self.identity.url, &refspecs[0])
                .map_err(MirrorError::git)?;
            for spec in &refspecs[1..] {
                repo.remote_add_fetch(constants::ORIGIN_REMOTE, spec)
                    .map_err(MirrorError::git)?;
            }
            info!(
                location = %self.location.display(),
                branches = run_branches.len(),
                "initialized fresh mirror"
            );
            self.repo = Some(repo);
        }

        let repo = self.require_repo()?;
        let mut callbacks = RemoteCallbacks::new();
        if let Some(token) = upstream.fetch_token() {
            let token = token.to_string();
            callbacks.credentials(move |_url, _username, _allowed| {
                Cred::userpass_plaintext("x-access-token", &token)
            });
        }
        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);

        let mut remote = repo
            .find_remote(constants::ORIGIN_REMOTE)
            .map_err(MirrorError::git)?;
        // Refspecs are passed per run rather than relying on those registered
        // at clone time, so a branch added to the tracked set later still
        // gets fetched.
        let refspec_strs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        remote
            .fetch(&refspec_strs, Some(&mut fetch_opts), None)
            .map_err(MirrorError::git)?;
        drop(remote);
        debug!(branches = run_branches.len(), "fetch complete");

        for branch in &run_branches {
            fast_forward(repo, branch)?;
        }
        Ok(())
    }

    /// Positions of every tracked branch that has a local ref. Untracked
    /// branches never appear, even if older runs created them.
    pub fn ref_positions(&self) -> Result<BTreeMap<String, RefPosition>, MirrorError> {
        let Some(repo) = self.repo.as_ref() else {
            return Ok(BTreeMap::new());
        };
        let mut positions = BTreeMap::new();
        for branch in &self.tracked_branches {
            let ref_name = format!("refs/heads/{branch}");
            let commit = match repo.find_reference(&ref_name) {
                Ok(reference) => reference.peel_to_commit().map_err(MirrorError::git)?,
                Err(e) if e.code() == git2::ErrorCode::NotFound => continue,
                Err(e) => return Err(MirrorError::git(e)),
            };
            positions.insert(
                ref_name,
                RefPosition {
                    hash: commit.id().to_string(),
                    summary: commit.summary().unwrap_or_default().to_string(),
                    commit_date: commit.time().seconds(),
                },
            );
        }
        Ok(positions)
    }

    /// Whether any reference (branch, tag) with this full name exists.
    pub fn has_ref(&self, ref_name: &str) -> bool {
        match &self.repo {
            Some(repo) => repo.find_reference(ref_name).is_ok(),
            None => false,
        }
    }

    /// Hard-reset the working tree to `ref_name`, discarding local edits.
    /// Nothing should be editing the mirror, but a scan must start from the
    /// exact committed tree regardless.
    pub fn checkout_and_reset(&self, ref_name: &str) -> Result<(), MirrorError> {
        let repo = self.require_repo()?;
        repo.set_head(ref_name).map_err(MirrorError::git)?;
        let head = repo
            .revparse_single("HEAD")
            .map_err(MirrorError::git)?;
        repo.reset(&head, ResetType::Hard, None)
            .map_err(MirrorError::git)?;
        Ok(())
    }

    /// Create an annotated tag at HEAD, replacing any existing tag of the
    /// same name.
    pub fn create_tag(&self, name: &str, message: &str) -> Result<(), MirrorError> {
        let repo = self.require_repo()?;
        self.delete_tag(name)?;
        let target = repo.revparse_single("HEAD").map_err(MirrorError::git)?;
        let signature = Signature::now(
            constants::TAG_SIGNATURE_NAME,
            constants::TAG_SIGNATURE_EMAIL,
        )
        .map_err(MirrorError::git)?;
        repo.tag(name, &target, &signature, message, false)
            .map_err(MirrorError::git)?;
        debug!(tag = name, target = %target.id(), "tag created");
        Ok(())
    }

    /// Delete a tag if it exists; a missing tag is a no-op.
    pub fn delete_tag(&self, name: &str) -> Result<(), MirrorError> {
        let repo = self.require_repo()?;
        if self.has_ref(&format!("refs/tags/{name}")) {
            repo.tag_delete(name).map_err(MirrorError::git)?;
        }
        Ok(())
    }

    /// Paths changed between two revisions, or every path at `until` when
    /// `since` is absent. Removed paths are included so callers can observe
    /// deletions. Uses a tree-to-tree diff; the full enumeration is the
    /// degenerate diff against the empty tree.
    pub fn changed_files<F>(
        &self,
        since: Option<&str>,
        until: &str,
        filter: F,
    ) -> Result<BTreeSet<String>, MirrorError>
    where
        F: Fn(&str) -> bool,
    {
        let repo = self.require_repo()?;
        let until_tree = resolve_tree(repo, until)?;
        let since_tree = match since {
            Some(rev) => Some(resolve_tree(repo, rev)?),
            None => None,
        };

        let mut diff_opts = DiffOptions::new();
        let diff = repo
            .diff_tree_to_tree(since_tree.as_ref(), Some(&until_tree), Some(&mut diff_opts))
            .map_err(MirrorError::git)?;

        let mut paths = BTreeSet::new();
        for delta in diff.deltas() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path());
            if let Some(p) = path {
                let p = p.to_string_lossy().to_string();
                if filter(&p) {
                    paths.insert(p);
                }
            }
        }
        Ok(paths)
    }

    /// Remove the mirror directory. A missing directory is a no-op.
    pub fn delete(&mut self) -> Result<(), MirrorError> {
        // Drop the git handle before removing the directory under it.
        self.repo = None;
        if self.location.exists() {
            std::fs::remove_dir_all(&self.location)?;
            info!(location = %self.location.display(), "mirror removed");
        }
        Ok(())
    }

    fn require_repo(&self) -> Result<&Repository, MirrorError> {
        self.repo.as_ref().ok_or_else(|| MirrorError::NotARepository {
            path: self.location.display().to_string(),
        })
    }
}

/// Move a local branch to its fetched remote-tracking target. Creates the
/// branch when missing; otherwise checks it out and moves the ref directly
/// (never a merge), leaving the working tree at the new tip.
fn fast_forward(repo: &Repository, branch: &str) -> Result<(), MirrorError> {
    let remote_ref = format!("refs/remotes/origin/{branch}");
    let target = repo
        .find_reference(&remote_ref)
        .map_err(|e| MirrorError::Git(format!("missing remote-tracking ref `{remote_ref}`: {e}")))?
        .target()
        .ok_or_else(|| {
            MirrorError::Git(format!("remote-tracking ref `{remote_ref}` is symbolic"))
        })?;
    let local_ref = format!("refs/heads/{branch}");

    match repo.find_branch(branch, BranchType::Local) {
        Ok(_) => {
            repo.set_head(&local_ref).map_err(MirrorError::git)?;
            let mut reference = repo.find_reference(&local_ref).map_err(MirrorError::git)?;
            reference
                .set_target(target, "fast-forward to fetched remote tip")
                .map_err(MirrorError::git)?;
            let mut checkout = CheckoutBuilder::new();
            checkout.force();
            repo.checkout_head(Some(&mut checkout))
                .map_err(MirrorError::git)?;
            debug!(branch = %branch, hash = %target, "fast-forwarded branch");
        }
        Err(e) if e.code() == git2::ErrorCode::NotFound => {
            let commit = repo.find_commit(target).map_err(MirrorError::git)?;
            repo.branch(branch, &commit, false)
                .map_err(MirrorError::git)?;
            debug!(branch = %branch, hash = %target, "created local branch");
        }
        Err(e) => return Err(MirrorError::git(e)),
    }
    Ok(())
}

fn resolve_tree<'r>(repo: &'r Repository, rev: &str) -> Result<Tree<'r>, MirrorError> {
    let obj = repo
        .revparse_single(rev)
        .map_err(|e| MirrorError::Git(format!("failed to resolve revision `{rev}`: {e}")))?;
    obj.peel_to_tree().map_err(MirrorError::git)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::RepositoryInitOptions;

    struct FakeUpstream {
        branches: BTreeSet<String>,
    }

    impl FakeUpstream {
        fn new(branches: &[&str]) -> Self {
            Self {
                branches: branches.iter().map(|b| b.to_string()).collect(),
            }
        }
    }

    impl UpstreamSource for FakeUpstream {
        fn live_branches(&self) -> Result<BTreeSet<String>, HostError> {
            Ok(self.branches.clone())
        }

        fn fetch_token(&self) -> Option<&str> {
            None
        }
    }

    fn init_origin(dir: &Path) -> Repository {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir, &opts).unwrap();
        commit_file(&repo, "config.yaml", "region: eu\n", "initial");
        repo
    }

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        let tree_id = index.write_tree().unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("test", "test@example.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    fn remove_file(repo: &Repository, name: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::remove_file(workdir.join(name)).unwrap();
        let mut index = repo.index().unwrap();
        index.remove_path(Path::new(name)).unwrap();
        let tree_id = index.write_tree().unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("test", "test@example.com").unwrap();
        let parent = repo.head().unwrap().peel_to_commit().unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
            .unwrap()
    }

    fn test_identity(origin: &Path) -> RepoIdentity {
        RepoIdentity {
            host: "git.test".to_string(),
            organization: "acme".to_string(),
            name: "widgets".to_string(),
            url: origin.to_string_lossy().to_string(),
        }
    }

    fn open_mirror(origin: &Path, parent: &Path, branches: &[&str]) -> MirrorRepository {
        let tracked: Vec<String> = branches.iter().map(|b| b.to_string()).collect();
        MirrorRepository::open(test_identity(origin), parent, &tracked).unwrap()
    }

    #[test]
    fn fresh_clone_creates_only_tracked_branches() {
        let origin_dir = tempfile::tempdir().unwrap();
        let origin = init_origin(origin_dir.path());
        let head = origin.head().unwrap().peel_to_commit().unwrap();
        origin.branch("dev", &head, false).unwrap();
        commit_file(&origin, "extra.yaml", "a: 1\n", "second on main");

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        mirror
            .update(&FakeUpstream::new(&["main", "dev"]))
            .unwrap();

        assert!(mirror.has_ref("refs/heads/main"));
        assert!(!mirror.has_ref("refs/heads/dev"));

        let positions = mirror.ref_positions().unwrap();
        let tip = origin.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(
            positions["refs/heads/main"].hash,
            tip.id().to_string()
        );
        assert_eq!(positions["refs/heads/main"].summary, "second on main");
    }

    #[test]
    fn update_twice_is_idempotent() {
        let origin_dir = tempfile::tempdir().unwrap();
        let _origin = init_origin(origin_dir.path());

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        let upstream = FakeUpstream::new(&["main"]);

        mirror.update(&upstream).unwrap();
        let first = mirror.ref_positions().unwrap();
        mirror.update(&upstream).unwrap();
        let second = mirror.ref_positions().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fast_forward_follows_upstream_tip() {
        let origin_dir = tempfile::tempdir().unwrap();
        let origin = init_origin(origin_dir.path());

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        let upstream = FakeUpstream::new(&["main"]);
        mirror.update(&upstream).unwrap();

        let new_tip = commit_file(&origin, "config.yaml", "region: us\n", "rollout");
        mirror.update(&upstream).unwrap();

        let positions = mirror.ref_positions().unwrap();
        let pos = &positions["refs/heads/main"];
        assert_eq!(pos.hash, new_tip.to_string());
        assert_eq!(pos.summary, "rollout");
        assert!(pos.commit_date > 0);
    }

    #[test]
    fn branch_absent_upstream_is_skipped_not_fatal() {
        let origin_dir = tempfile::tempdir().unwrap();
        let _origin = init_origin(origin_dir.path());

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main", "ghost"]);
        mirror.update(&FakeUpstream::new(&["main"])).unwrap();

        assert!(mirror.has_ref("refs/heads/main"));
        assert!(!mirror.has_ref("refs/heads/ghost"));
    }

    #[test]
    fn stale_mirror_directory_is_self_healed() {
        let origin_dir = tempfile::tempdir().unwrap();
        let _origin = init_origin(origin_dir.path());

        let parent = tempfile::tempdir().unwrap();
        let identity = test_identity(origin_dir.path());
        let location = identity.location_under(parent.path());
        std::fs::create_dir_all(&location).unwrap();
        std::fs::write(location.join("debris.txt"), "leftover").unwrap();

        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        mirror.update(&FakeUpstream::new(&["main"])).unwrap();

        assert!(mirror.has_ref("refs/heads/main"));
        assert!(!location.join("debris.txt").exists());
    }

    #[test]
    fn ref_positions_is_empty_before_first_clone() {
        let origin_dir = tempfile::tempdir().unwrap();
        let _origin = init_origin(origin_dir.path());
        let parent = tempfile::tempdir().unwrap();
        let mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        assert!(mirror.ref_positions().unwrap().is_empty());
        assert!(!mirror.has_ref("refs/heads/main"));
    }

    #[test]
    fn changed_files_full_enumeration_lists_whole_tree() {
        let origin_dir = tempfile::tempdir().unwrap();
        let origin = init_origin(origin_dir.path());
        commit_file(&origin, "svc.json", "{}", "add svc");
        commit_file(&origin, "notes.txt", "plain", "add notes");

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        mirror.update(&FakeUpstream::new(&["main"])).unwrap();
        mirror.checkout_and_reset("refs/heads/main").unwrap();

        let all = mirror.changed_files(None, "HEAD", |_| true).unwrap();
        assert_eq!(
            all,
            ["config.yaml", "notes.txt", "svc.json"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        );

        let structured = mirror
            .changed_files(None, "HEAD", |p| !p.ends_with(".txt"))
            .unwrap();
        assert!(!structured.contains("notes.txt"));
        assert_eq!(structured.len(), 2);
    }

    #[test]
    fn changed_files_between_revisions_includes_removed_paths() {
        let origin_dir = tempfile::tempdir().unwrap();
        let origin = init_origin(origin_dir.path());
        commit_file(&origin, "svc.json", "{}", "add svc");

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        let upstream = FakeUpstream::new(&["main"]);
        mirror.update(&upstream).unwrap();
        mirror.checkout_and_reset("refs/heads/main").unwrap();
        mirror.create_tag("checkpoint", "scan checkpoint").unwrap();

        commit_file(&origin, "config.yaml", "region: us\n", "edit config");
        remove_file(&origin, "svc.json", "drop svc");
        mirror.update(&upstream).unwrap();
        mirror.checkout_and_reset("refs/heads/main").unwrap();

        let changed = mirror
            .changed_files(Some("checkpoint"), "HEAD", |_| true)
            .unwrap();
        assert!(changed.contains("config.yaml"), "modified path missing");
        assert!(changed.contains("svc.json"), "removed path missing");
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn incremental_changes_are_a_subset_of_full_enumeration() {
        let origin_dir = tempfile::tempdir().unwrap();
        let origin = init_origin(origin_dir.path());

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        let upstream = FakeUpstream::new(&["main"]);
        mirror.update(&upstream).unwrap();
        mirror.checkout_and_reset("refs/heads/main").unwrap();
        mirror.create_tag("checkpoint", "scan checkpoint").unwrap();

        commit_file(&origin, "new.yaml", "x: 1\n", "add new");
        mirror.update(&upstream).unwrap();

        let incremental = mirror
            .changed_files(Some("checkpoint"), "HEAD", |_| true)
            .unwrap();
        let full = mirror.changed_files(None, "HEAD", |_| true).unwrap();
        assert!(incremental.is_subset(&full));
        assert_eq!(
            incremental,
            ["new.yaml"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn create_tag_replaces_existing_tag() {
        let origin_dir = tempfile::tempdir().unwrap();
        let origin = init_origin(origin_dir.path());

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        let upstream = FakeUpstream::new(&["main"]);
        mirror.update(&upstream).unwrap();
        mirror.checkout_and_reset("refs/heads/main").unwrap();
        mirror.create_tag("_SCANNED_main", "first pass").unwrap();

        commit_file(&origin, "later.yaml", "y: 2\n", "later");
        mirror.update(&upstream).unwrap();
        mirror.checkout_and_reset("refs/heads/main").unwrap();
        mirror.create_tag("_SCANNED_main", "second pass").unwrap();

        assert!(mirror.has_ref("refs/tags/_SCANNED_main"));
        // After re-tagging at the new tip, nothing has changed since the tag.
        let changed = mirror
            .changed_files(Some("_SCANNED_main"), "HEAD", |_| true)
            .unwrap();
        assert!(changed.is_empty());
    }

    #[test]
    fn checkout_and_reset_discards_working_tree_edits() {
        let origin_dir = tempfile::tempdir().unwrap();
        let _origin = init_origin(origin_dir.path());

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        mirror.update(&FakeUpstream::new(&["main"])).unwrap();
        mirror.checkout_and_reset("refs/heads/main").unwrap();

        let file = mirror.location().join("config.yaml");
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "region: eu\n");
        std::fs::write(&file, "tampered\n").unwrap();

        mirror.checkout_and_reset("refs/heads/main").unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "region: eu\n");
    }

    #[test]
    fn delete_removes_the_mirror_directory() {
        let origin_dir = tempfile::tempdir().unwrap();
        let _origin = init_origin(origin_dir.path());

        let parent = tempfile::tempdir().unwrap();
        let mut mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);
        mirror.update(&FakeUpstream::new(&["main"])).unwrap();
        assert!(mirror.location().exists());

        mirror.delete().unwrap();
        assert!(!mirror.location().exists());
        // Deleting again is a no-op.
        mirror.delete().unwrap();
    }

    #[test]
    fn operations_without_a_clone_are_typed_errors() {
        let origin_dir = tempfile::tempdir().unwrap();
        let _origin = init_origin(origin_dir.path());
        let parent = tempfile::tempdir().unwrap();
        let mirror = open_mirror(origin_dir.path(), parent.path(), &["main"]);

        let err = mirror.checkout_and_reset("refs/heads/main").unwrap_err();
        assert!(matches!(err, MirrorError::NotARepository { .. }));
        let err = mirror.changed_files(None, "HEAD", |_| true).unwrap_err();
        assert!(matches!(err, MirrorError::NotARepository { .. }));
    }
}
