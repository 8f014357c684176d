use crate::credentials::CredentialProvider;
use repoharvest_core::config::HostConfig;
use repoharvest_core::error::HostError;
use repoharvest_core::time;
use repoharvest_core::types::HostRepo;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: usize = 100;

/// Unauthenticated handle on one remote host. Construction is cheap and
/// performs no network or credential work; `authenticate` produces the
/// session that actually talks to the API.
pub struct HostClient {
    host: String,
    api_base: String,
}

impl HostClient {
    pub fn open(host: &str, config: &HostConfig) -> Self {
        let api_base = match &config.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => derive_api_base(host),
        };
        Self {
            host: host.to_string(),
            api_base,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Acquire a credential and build the HTTP client for one session.
    pub fn authenticate(
        &self,
        provider: &dyn CredentialProvider,
    ) -> Result<HostSession, HostError> {
        let token = provider.acquire()?;
        debug!(
            host = %self.host,
            authenticated = token.is_some(),
            "opening host api session"
        );
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(HostError::http)?;
        Ok(HostSession {
            api_base: self.api_base.clone(),
            token,
            client,
        })
    }
}

/// One authenticated (or knowingly anonymous) API session.
pub struct HostSession {
    api_base: String,
    token: Option<String>,
    client: Client,
}

impl HostSession {
    /// The session credential, reused for git fetches over HTTPS.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Names of every branch on the repository.
    pub fn branch_names(&self, org: &str, name: &str) -> Result<BTreeSet<String>, HostError> {
        let branches: Vec<BranchPayload> =
            self.get_paginated(&format!("/repos/{org}/{name}/branches"))?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    /// Metadata for one repository, including its last-push time.
    pub fn repo_metadata(&self, org: &str, name: &str) -> Result<HostRepo, HostError> {
        let url = format!("{}/repos/{org}/{name}", self.api_base);
        let payload: RepoPayload = self.get_json(&url)?;
        Ok(payload.into_host_repo())
    }

    /// Every repository in the organization, or only those visible to one
    /// of its teams.
    pub fn org_repos(&self, org: &str, team: Option<&str>) -> Result<Vec<HostRepo>, HostError> {
        let path = match team {
            Some(team) => format!("/orgs/{org}/teams/{team}/repos"),
            None => format!("/orgs/{org}/repos"),
        };
        let payloads: Vec<RepoPayload> = self.get_paginated(&path)?;
        Ok(payloads.into_iter().map(RepoPayload::into_host_repo).collect())
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, HostError> {
        let mut request = self
            .client
            .get(url)
            .header("accept", "application/vnd.github+json")
            .header("user-agent", "repoharvest");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().map_err(HostError::http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Api {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.json().map_err(HostError::decode)
    }

    fn get_paginated<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, HostError> {
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!(
                "{}{}?per_page={}&page={}",
                self.api_base, path, PAGE_SIZE, page
            );
            let batch: Vec<T> = self.get_json(&url)?;
            let done = batch.len() < PAGE_SIZE;
            all.extend(batch);
            if done {
                return Ok(all);
            }
            page += 1;
        }
    }
}

fn derive_api_base(host: &str) -> String {
    if host == "github.com" {
        "https://api.github.com".to_string()
    } else {
        format!("https://{host}/api/v3")
    }
}

#[derive(Debug, Deserialize)]
struct BranchPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoPayload {
    name: String,
    clone_url: String,
    ssh_url: Option<String>,
    owner: Option<OwnerPayload>,
    pushed_at: Option<String>,
}

impl RepoPayload {
    fn into_host_repo(self) -> HostRepo {
        let pushed_at = match self.pushed_at.as_deref() {
            Some(raw) => match time::parse_rfc3339_epoch(raw) {
                Some(epoch) => epoch,
                None => {
                    warn!(value = raw, "unparseable pushed_at timestamp; treating as epoch zero");
                    0
                }
            },
            None => 0,
        };
        HostRepo {
            name: self.name,
            clone_url: self.clone_url,
            ssh_url: self.ssh_url,
            organization: self.owner.map(|o| o.login),
            pushed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::AnonymousCredentials;

    #[test]
    fn api_base_for_public_host() {
        assert_eq!(derive_api_base("github.com"), "https://api.github.com");
    }

    #[test]
    fn api_base_for_self_hosted_instance() {
        assert_eq!(
            derive_api_base("git.example.org"),
            "https://git.example.org/api/v3"
        );
    }

    #[test]
    fn configured_api_base_overrides_derivation() {
        let config = HostConfig {
            api_base: Some("https://proxy.example/api/".to_string()),
            ..HostConfig::default()
        };
        let client = HostClient::open("github.com", &config);
        assert_eq!(client.api_base(), "https://proxy.example/api");
    }

    #[test]
    fn anonymous_session_carries_no_token() {
        let client = HostClient::open("github.com", &HostConfig::default());
        let session = client.authenticate(&AnonymousCredentials).unwrap();
        assert!(session.token().is_none());
    }

    #[test]
    fn repo_payload_converts_with_parsed_push_time() {
        let payload = RepoPayload {
            name: "widgets".to_string(),
            clone_url: "https://github.com/acme/widgets.git".to_string(),
            ssh_url: Some("git@github.com:acme/widgets.git".to_string()),
            owner: Some(OwnerPayload {
                login: "acme".to_string(),
            }),
            pushed_at: Some("2024-05-21T17:02:31Z".to_string()),
        };
        let repo = payload.into_host_repo();
        assert_eq!(repo.organization.as_deref(), Some("acme"));
        assert_eq!(repo.pushed_at, 1716310951);
    }

    #[test]
    fn repo_payload_tolerates_missing_fields() {
        let payload: RepoPayload =
            serde_json::from_str(r#"{"name": "bare", "clone_url": "https://x/y/bare.git"}"#)
                .unwrap();
        let repo = payload.into_host_repo();
        assert!(repo.ssh_url.is_none());
        assert!(repo.organization.is_none());
        assert_eq!(repo.pushed_at, 0);
    }
}
