pub mod config;
pub mod constants;
pub mod error;
pub mod time;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{HostRepo, MirrorStatus, RefPosition, SyncSummary};
