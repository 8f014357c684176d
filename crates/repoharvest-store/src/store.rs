use ignore::WalkBuilder;
use repoharvest_core::error::StoreError;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Minimal object-store contract: flat `/`-separated string keys, whole-
/// object reads and writes. Network backends implement this out of tree;
/// the filesystem implementation below backs tests and single-node
/// deployments.
pub trait ObjectStore {
    /// Keys starting with `prefix` (every key when empty), in no
    /// particular order.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Whole-object read. `StoreError::ObjectNotFound` when absent.
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Upload a local file under `key`, replacing any existing object.
    fn put_file(&self, key: &str, local_path: &Path) -> Result<(), StoreError>;

    /// Remove an object. Removing an absent key is a no-op.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Store backed by a directory tree: key `a/b/c` is the file `<root>/a/b/c`.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(key_to_rel_path(key)?))
    }
}

/// Validate a key and map it to a relative path. Keys must be non-empty,
/// relative, `/`-separated, with no empty, `.`, or `..` segments.
fn key_to_rel_path(key: &str) -> Result<PathBuf, StoreError> {
    if key.is_empty() {
        return Err(StoreError::invalid_key(key, "key is empty"));
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(StoreError::invalid_key(key, "key must not start or end with '/'"));
    }
    let mut path = PathBuf::new();
    for segment in key.split('/') {
        match segment {
            "" => return Err(StoreError::invalid_key(key, "key contains an empty segment")),
            "." | ".." => {
                return Err(StoreError::invalid_key(key, "key contains a relative segment"));
            }
            _ => path.push(segment),
        }
    }
    Ok(path)
}

impl ObjectStore for FsObjectStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        // The store is not a source tree; nothing is skipped.
        let mut walker = WalkBuilder::new(&self.root);
        walker
            .hidden(false)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false);

        let mut keys = Vec::new();
        for entry in walker.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("store walk error: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let rel = path.strip_prefix(&self.root).unwrap_or(path);
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::ObjectNotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn put_file(&self, key: &str, local_path: &Path) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(local_path, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StoreError::Io(e)),
        }
        // Prune directories emptied by the removal so the tree stays free
        // of phantom "folders".
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir == self.root || std::fs::remove_dir(dir).is_err() {
                break;
            }
            parent = dir.parent();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_dir() -> (FsObjectStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (FsObjectStore::new(dir.path().join("store")), dir)
    }

    fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn put_then_get_round_trips() {
        let (store, dir) = store_with_dir();
        let src = write_source(dir.path(), "src.yaml", "kind: Widget\n");

        store.put_file("configs/widget.yaml", &src).unwrap();
        assert_eq!(store.get("configs/widget.yaml").unwrap(), b"kind: Widget\n");
    }

    #[test]
    fn get_missing_key_is_object_not_found() {
        let (store, _dir) = store_with_dir();
        let err = store.get("nope/missing.json").unwrap_err();
        assert!(matches!(err, StoreError::ObjectNotFound { .. }));
    }

    #[test]
    fn list_filters_by_prefix() {
        let (store, dir) = store_with_dir();
        let src = write_source(dir.path(), "f", "x");
        store.put_file("data/a.json", &src).unwrap();
        store.put_file("data/sub/b.json", &src).unwrap();
        store.put_file("other/c.json", &src).unwrap();

        let mut keys = store.list("data/").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["data/a.json", "data/sub/b.json"]);

        let all = store.list("").unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn list_on_missing_root_is_empty() {
        let (store, _dir) = store_with_dir();
        assert!(store.list("").unwrap().is_empty());
    }

    #[test]
    fn delete_is_idempotent_and_prunes_empty_dirs() {
        let (store, dir) = store_with_dir();
        let src = write_source(dir.path(), "f", "x");
        store.put_file("deep/nested/obj.json", &src).unwrap();

        store.delete("deep/nested/obj.json").unwrap();
        assert!(matches!(
            store.get("deep/nested/obj.json").unwrap_err(),
            StoreError::ObjectNotFound { .. }
        ));
        assert!(!store.root().join("deep").exists());

        // Deleting again is a no-op.
        store.delete("deep/nested/obj.json").unwrap();
    }

    #[test]
    fn put_replaces_existing_content() {
        let (store, dir) = store_with_dir();
        let first = write_source(dir.path(), "a", "one");
        let second = write_source(dir.path(), "b", "two");

        store.put_file("key.txt", &first).unwrap();
        store.put_file("key.txt", &second).unwrap();
        assert_eq!(store.get("key.txt").unwrap(), b"two");
    }

    #[test]
    fn malformed_keys_are_rejected() {
        let (store, _dir) = store_with_dir();
        for key in ["", "/abs", "trailing/", "a//b", "../escape", "a/./b"] {
            let err = store.get(key).unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey { .. }), "key: {key:?}");
        }
    }
}
