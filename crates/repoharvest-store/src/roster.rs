use crate::catalog::{self, RepoRecord};
use repoharvest_core::constants;
use repoharvest_core::error::CatalogError;
use repoharvest_core::time;
use repoharvest_core::types::{HostRepo, SyncSummary};
use rusqlite::Connection;
use std::collections::BTreeMap;
use tracing::info;

/// Source tag marking records created by this integration, e.g.
/// `github:acme:platform`.
pub fn source_tag(organization: &str, team: Option<&str>) -> String {
    match team {
        Some(team) => format!("{}{organization}:{team}", constants::RECORD_SOURCE_PREFIX),
        None => format!("{}{organization}", constants::RECORD_SOURCE_PREFIX),
    }
}

/// Make the catalog scope's records match the live repository list.
///
/// Only records whose source carries this integration's prefix are
/// considered; records transcribed from other sources are never touched.
/// Each mutation is a single-record operation with no wrapping
/// transaction; a partially applied run is corrected by the next one.
pub fn reconcile_roster(
    conn: &Connection,
    scope: &str,
    tag: &str,
    live: &[HostRepo],
) -> Result<SyncSummary, CatalogError> {
    let live_by_name: BTreeMap<&str, &HostRepo> =
        live.iter().map(|r| (r.name.as_str(), r)).collect();

    let existing: BTreeMap<String, RepoRecord> = catalog::list_records(conn, scope)?
        .into_iter()
        .filter(|r| r.source.starts_with(constants::RECORD_SOURCE_PREFIX))
        .map(|r| (r.name.clone(), r))
        .collect();

    let mut summary = SyncSummary::default();

    for name in existing.keys() {
        if !live_by_name.contains_key(name.as_str()) {
            info!(scope, name = %name, "removing record for repository gone upstream");
            catalog::delete_record(conn, scope, name)?;
            summary.deleted.push(name.clone());
        }
    }

    for (name, repo) in &live_by_name {
        if !existing.contains_key(*name) {
            info!(scope, name = %name, "recording newly visible repository");
            catalog::create_record(
                conn,
                &RepoRecord {
                    scope: scope.to_string(),
                    name: repo.name.clone(),
                    source: tag.to_string(),
                    clone_url: repo.clone_url.clone(),
                    ssh_url: repo.ssh_url.clone(),
                    organization: repo.organization.clone(),
                    last_pushed: repo.pushed_at,
                    created_at: time::now_iso8601(),
                },
            )?;
            summary.added.push(repo.name.clone());
        }
    }

    for (name, record) in &existing {
        if let Some(repo) = live_by_name.get(name.as_str())
            && repo.pushed_at != record.last_pushed
        {
            info!(
                scope,
                name = %name,
                from = record.last_pushed,
                to = repo.pushed_at,
                "patching last-push timestamp"
            );
            catalog::set_last_pushed(conn, scope, name, repo.pushed_at)?;
            summary.updated.push(name.clone());
        }
    }

    summary.sort();
    info!(
        scope,
        added = summary.added.len(),
        updated = summary.updated.len(),
        deleted = summary.deleted.len(),
        "roster reconciliation complete"
    );
    Ok(summary)
}
