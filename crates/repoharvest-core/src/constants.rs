/// Reserved prefix for per-branch scan watermark tags.
pub const WATERMARK_TAG_PREFIX: &str = "_SCANNED_";

/// Message written into every watermark tag.
pub const WATERMARK_TAG_MESSAGE: &str = "Harvester scanned to here";

/// Prefix for per-repository lock files in the mirror parent directory.
pub const LOCK_FILE_PREFIX: &str = "_HARVEST_LOCK_";

/// Suffix of the checkpoint file written beside a mirror directory.
pub const CHECKPOINT_SUFFIX: &str = ".upstream_push_time";

/// File extensions dispatched to scanners.
pub const SCANNABLE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Branch fed to the production scanner set by default.
pub const DEFAULT_PRODUCTION_BRANCH: &str = "main";

/// Branch fed to the development scanner set by default.
pub const DEFAULT_DEVELOPMENT_BRANCH: &str = "develop";

/// Remote name every mirror fetches from.
pub const ORIGIN_REMOTE: &str = "origin";

/// Signature recorded on watermark tags.
pub const TAG_SIGNATURE_NAME: &str = "Repo Harvester";
pub const TAG_SIGNATURE_EMAIL: &str = "harvester@signalridge.dev";

/// Source-tag prefix marking catalog records owned by this integration.
pub const RECORD_SOURCE_PREFIX: &str = "github:";

/// Default data directory name under home.
pub const DEFAULT_DATA_DIR: &str = ".repoharvest";

/// SQLite catalog file name under the data directory.
pub const CATALOG_DB_FILE: &str = "catalog.db";
