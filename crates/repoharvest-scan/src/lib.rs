//! Scanning: extension-driven file parsing, the `Scanner` visitor trait and
//! built-in implementations, and the per-branch watermark scan dispatcher.

pub mod dispatch;
pub mod parse;
pub mod scanner;

pub use dispatch::{BranchScanners, run_scan};
pub use parse::{parse_file, scannable_file};
pub use scanner::{FileListScanner, Scanner, StoreSyncScanner, SyncOutcome};
