//! Local git mirrors: identity parsing, per-repository locking, scan
//! checkpoints, and the clone/fetch/fast-forward maintenance loop.

pub mod checkpoint;
pub mod identity;
pub mod lock;
pub mod repo;

pub use identity::RepoIdentity;
pub use lock::RepoLock;
pub use repo::{MirrorRepository, UpstreamSource};
