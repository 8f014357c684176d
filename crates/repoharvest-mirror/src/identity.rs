use repoharvest_core::error::ConfigError;
use std::path::{Path, PathBuf};

/// Identity of one remote repository: where it lives and what to call it.
///
/// The mirror location is derived as `<parent>/<host>/<org>/<name>`; when a
/// caller overrides the location, the parent is derived back from it so lock
/// and checkpoint placement stay consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    pub host: String,
    pub organization: String,
    pub name: String,
    /// Canonical clone URL as given by the caller.
    pub url: String,
}

impl RepoIdentity {
    /// Parse a `scheme://host/org/name[.git]` URL. Anything else (scp-style
    /// remotes, extra path segments) is rejected up front.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let Some((_scheme, rest)) = url.split_once("://") else {
            return Err(ConfigError::invalid_repo_url(
                url,
                "expected scheme://host/org/name",
            ));
        };

        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        let authority = segments.next().unwrap_or_default();
        // Drop userinfo, keep any port as part of the host identity.
        let host = authority.rsplit('@').next().unwrap_or_default();
        let organization = segments.next().unwrap_or_default();
        let name_raw = segments.next().unwrap_or_default();
        let name = name_raw.strip_suffix(".git").unwrap_or(name_raw);

        if host.is_empty() || organization.is_empty() || name.is_empty() {
            return Err(ConfigError::invalid_repo_url(
                url,
                "expected scheme://host/org/name",
            ));
        }
        if segments.next().is_some() {
            return Err(ConfigError::invalid_repo_url(
                url,
                "unexpected path segments after org/name",
            ));
        }

        Ok(Self {
            host: host.to_string(),
            organization: organization.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    /// Mirror location under a parent directory.
    pub fn location_under(&self, parent: &Path) -> PathBuf {
        parent
            .join(&self.host)
            .join(&self.organization)
            .join(&self.name)
    }

    /// Derive the parent directory from an overridden location (three levels
    /// up, undoing `location_under`).
    pub fn parent_from_location(location: &Path) -> Result<PathBuf, ConfigError> {
        location
            .parent()
            .and_then(Path::parent)
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                ConfigError::invalid_value(
                    "location",
                    format!(
                        "`{}` is too shallow to hold <host>/<org>/<name>",
                        location.display()
                    ),
                )
            })
    }

    /// `host/org/name`, the canonical triple used in logs and lock naming.
    pub fn canonical(&self) -> String {
        format!("{}/{}/{}", self.host, self.organization, self.name)
    }
}
