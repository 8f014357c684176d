//! Shared-state backends: the object store and tree reconciler, plus the
//! SQLite record catalog and its roster reconciler.

pub mod catalog;
pub mod reconcile;
pub mod roster;
pub mod store;

pub use catalog::{RepoRecord, open_catalog, open_catalog_with_config};
pub use reconcile::{ReconcilePlan, compute_plan, reconcile_tree};
pub use roster::reconcile_roster;
pub use store::{FsObjectStore, ObjectStore};
