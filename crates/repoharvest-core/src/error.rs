use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("invalid config value: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("invalid repository url: {url}: {reason}")]
    InvalidRepoUrl { url: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid_repo_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRepoUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("not a git repository: {path}")]
    NotARepository { path: String },

    #[error("git error: {0}")]
    Git(String),

    #[error("upstream error: {0}")]
    Upstream(#[from] HostError),

    #[error("branch not tracked: {branch}")]
    BranchNotTracked { branch: String },

    #[error("repository lock busy: repository={repository}, lock_path={lock_path}")]
    LockBusy {
        repository: String,
        lock_path: String,
    },

    #[error("checkpoint file missing: {path} (run an update before scanning)")]
    CheckpointMissing { path: String },

    #[error("corrupt checkpoint file: {path}: {reason}")]
    CheckpointCorrupt { path: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl MirrorError {
    /// Convenience constructor for libgit2 errors — use with `.map_err(MirrorError::git)`.
    pub fn git<E: std::fmt::Display>(e: E) -> Self {
        Self::Git(e.to_string())
    }

    pub fn lock_busy(repository: impl Into<String>, lock_path: impl Into<String>) -> Self {
        Self::LockBusy {
            repository: repository.into(),
            lock_path: lock_path.into(),
        }
    }

    pub fn checkpoint_corrupt(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CheckpointCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("http error: {0}")]
    Http(String),

    #[error("host api error: status={status}, url={url}")]
    Api { status: u16, url: String },

    #[error("credential error: {0}")]
    Credentials(String),

    #[error("failed to decode host response: {0}")]
    Decode(String),
}

impl HostError {
    /// Convenience constructor for transport errors — use with `.map_err(HostError::http)`.
    pub fn http<E: std::fmt::Display>(e: E) -> Self {
        Self::Http(e.to_string())
    }

    pub fn decode<E: std::fmt::Display>(e: E) -> Self {
        Self::Decode(e.to_string())
    }

    pub fn credentials(reason: impl Into<String>) -> Self {
        Self::Credentials(reason.into())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {key}")]
    ObjectNotFound { key: String },

    #[error("invalid object key: {key}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Convenience constructor for backend errors — use with `.map_err(StoreError::backend)`.
    pub fn backend<E: std::fmt::Display>(e: E) -> Self {
        Self::Backend(e.to_string())
    }

    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("scanner failed: scanner={scanner}, branch={branch}: {detail}")]
    Scanner {
        scanner: String,
        branch: String,
        detail: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn scanner(
        scanner: impl Into<String>,
        branch: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Scanner {
            scanner: scanner.into(),
            branch: branch.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("record not found: scope={scope}, name={name}")]
    RecordNotFound { scope: String, name: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Convenience constructor for SQLite errors — use with `.map_err(CatalogError::sqlite)`.
    pub fn sqlite<E: std::fmt::Display>(e: E) -> Self {
        Self::Sqlite(e.to_string())
    }

    pub fn record_not_found(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self::RecordNotFound {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
