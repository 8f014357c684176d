use anyhow::{Context, Result};
use repoharvest_store::open_catalog_with_config;
use repoharvest_store::roster::{reconcile_roster, source_tag};
use std::path::Path;

pub fn run(
    org: &str,
    team: Option<&str>,
    host: &str,
    config_file: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(None, config_file)?;
    let session = super::open_session(host, &config)?;

    let live = session
        .org_repos(org, team)
        .with_context(|| format!("failed to list repositories for {org}"))?;

    let conn = open_catalog_with_config(&config.catalog_db(), config.storage.busy_timeout_ms)?;
    let scope = match team {
        Some(team) => format!("{org}/{team}"),
        None => org.to_string(),
    };
    let tag = source_tag(org, team);

    let summary = reconcile_roster(&conn, &scope, &tag, &live)
        .with_context(|| format!("roster reconciliation failed for {scope}"))?;

    super::print_json(&summary)
}
