use crate::constants;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Parent directory holding every mirror (`<root>/<host>/<org>/<name>`).
    #[serde(default = "default_mirror_root")]
    pub mirror_root: String,
    /// Root of the filesystem-backed object store.
    #[serde(default = "default_store_root")]
    pub store_root: String,
    /// Path of the SQLite record catalog.
    #[serde(default = "default_catalog_db")]
    pub catalog_db: String,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Environment variable consulted for a pre-issued API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// File holding a token (e.g. a mounted secret); takes precedence over
    /// the environment variable when set.
    #[serde(default)]
    pub token_file: Option<String>,
    /// Override for the API base URL; derived from the repository host when
    /// absent.
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_production_branch")]
    pub production_branch: String,
    #[serde(default = "default_development_branch")]
    pub development_branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_mirror_root() -> String {
    "~/.repoharvest/mirrors".into()
}
fn default_store_root() -> String {
    "~/.repoharvest/store".into()
}
fn default_catalog_db() -> String {
    format!("~/{}/{}", constants::DEFAULT_DATA_DIR, constants::CATALOG_DB_FILE)
}
fn default_busy_timeout() -> u32 {
    5000
}
fn default_token_env() -> String {
    "REPOHARVEST_API_TOKEN".into()
}
fn default_production_branch() -> String {
    constants::DEFAULT_PRODUCTION_BRANCH.into()
}
fn default_development_branch() -> String {
    constants::DEFAULT_DEVELOPMENT_BRANCH.into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mirror_root: default_mirror_root(),
            store_root: default_store_root(),
            catalog_db: default_catalog_db(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            token_file: None,
            api_base: None,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            production_branch: default_production_branch(),
            development_branch: default_development_branch(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration with three-layer precedence:
    /// 1. Explicit config file (from `--config` flag, highest priority)
    /// 2. Global config: `~/.repoharvest/config.toml`
    /// 3. Built-in defaults (lowest priority)
    ///
    /// Environment variables (`REPOHARVEST_<SECTION>_<KEY>`) override all
    /// file layers. Only fields explicitly set in a higher-priority file
    /// override lower layers.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        if let Some(home) = dirs::home_dir() {
            let global_path = home.join(constants::DEFAULT_DATA_DIR).join("config.toml");
            if global_path.exists() {
                let raw = load_toml_value(&global_path)?;
                merge_toml_values(&mut merged, &raw);
            }
        }

        if let Some(cf) = config_file {
            if !cf.exists() {
                return Err(ConfigError::NotFound {
                    path: cf.display().to_string(),
                });
            }
            let raw = load_toml_value(cf)?;
            merge_toml_values(&mut merged, &raw);
        }

        let config_str =
            toml::to_string(&merged).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let mut config: Config =
            toml::from_str(&config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        apply_env_overrides(&mut config);

        config.storage.mirror_root = expand_tilde(&config.storage.mirror_root);
        config.storage.store_root = expand_tilde(&config.storage.store_root);
        config.storage.catalog_db = expand_tilde(&config.storage.catalog_db);
        if let Some(tf) = config.host.token_file.take() {
            config.host.token_file = Some(expand_tilde(&tf));
        }

        Ok(config)
    }

    pub fn mirror_root(&self) -> PathBuf {
        PathBuf::from(&self.storage.mirror_root)
    }

    pub fn store_root(&self) -> PathBuf {
        PathBuf::from(&self.storage.store_root)
    }

    pub fn catalog_db(&self) -> PathBuf {
        PathBuf::from(&self.storage.catalog_db)
    }
}

/// Load a TOML file as a raw `toml::Value` (preserving only explicitly-set fields).
fn load_toml_value(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    content
        .parse::<toml::Value>()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Deep-merge `overlay` into `base`. Only keys present in `overlay` are written.
fn merge_toml_values(base: &mut toml::Value, overlay: &toml::Value) {
    if let (toml::Value::Table(base_map), toml::Value::Table(overlay_map)) = (base, overlay) {
        for (key, overlay_val) in overlay_map {
            if let Some(base_val) = base_map.get_mut(key) {
                if base_val.is_table() && overlay_val.is_table() {
                    merge_toml_values(base_val, overlay_val);
                } else {
                    *base_val = overlay_val.clone();
                }
            } else {
                base_map.insert(key.clone(), overlay_val.clone());
            }
        }
    }
}

/// Apply environment variable overrides to config fields.
/// Convention: `REPOHARVEST_<SECTION>_<KEY>` in UPPER_SNAKE_CASE.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("REPOHARVEST_STORAGE_MIRROR_ROOT") {
        config.storage.mirror_root = v;
    }
    if let Ok(v) = std::env::var("REPOHARVEST_STORAGE_STORE_ROOT") {
        config.storage.store_root = v;
    }
    if let Ok(v) = std::env::var("REPOHARVEST_STORAGE_CATALOG_DB") {
        config.storage.catalog_db = v;
    }
    if let Ok(v) = std::env::var("REPOHARVEST_STORAGE_BUSY_TIMEOUT_MS")
        && let Ok(n) = v.parse()
    {
        config.storage.busy_timeout_ms = n;
    }
    if let Ok(v) = std::env::var("REPOHARVEST_HOST_TOKEN_ENV") {
        config.host.token_env = v;
    }
    if let Ok(v) = std::env::var("REPOHARVEST_HOST_TOKEN_FILE") {
        config.host.token_file = Some(v);
    }
    if let Ok(v) = std::env::var("REPOHARVEST_HOST_API_BASE") {
        config.host.api_base = Some(v);
    }
    if let Ok(v) = std::env::var("REPOHARVEST_SCAN_PRODUCTION_BRANCH") {
        config.scan.production_branch = v;
    }
    if let Ok(v) = std::env::var("REPOHARVEST_SCAN_DEVELOPMENT_BRANCH") {
        config.scan.development_branch = v;
    }
    if let Ok(v) = std::env::var("REPOHARVEST_LOGGING_LEVEL") {
        config.logging.level = v;
    }
}

fn expand_tilde(path: &str) -> String {
    if path.starts_with('~')
        && let Some(home) = dirs::home_dir()
    {
        return path.replacen('~', &home.to_string_lossy(), 1);
    }
    path.to_string()
}
