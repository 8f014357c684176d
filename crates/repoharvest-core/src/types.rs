use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a branch reference currently points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefPosition {
    /// Full commit hash.
    pub hash: String,
    /// First line of the commit message.
    pub summary: String,
    /// Commit timestamp, Unix epoch seconds.
    pub commit_date: i64,
}

/// Process-level result of a pull or scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorStatus {
    /// Positions keyed by full branch ref (`refs/heads/<branch>`).
    pub ref_positions: BTreeMap<String, RefPosition>,
    /// Remote `pushed_at` as of the most recent successful fetch, epoch seconds.
    pub last_modified: i64,
}

/// Result of one reconciliation pass, for trees, rosters, and the
/// store-sync scanner alike. Lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
}

impl SyncSummary {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Total number of mutations applied.
    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.deleted.len()
    }

    /// Sort all three lists in place.
    pub fn sort(&mut self) {
        self.added.sort();
        self.updated.sort();
        self.deleted.sort();
    }
}

/// One repository as reported by the remote host's API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRepo {
    pub name: String,
    pub clone_url: String,
    pub ssh_url: Option<String>,
    pub organization: Option<String>,
    /// Last push to any branch, Unix epoch seconds.
    pub pushed_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_status_serializes_with_camel_case_keys() {
        let mut positions = BTreeMap::new();
        positions.insert(
            "refs/heads/main".to_string(),
            RefPosition {
                hash: "abc123".to_string(),
                summary: "initial".to_string(),
                commit_date: 1700000000,
            },
        );
        let status = MirrorStatus {
            ref_positions: positions,
            last_modified: 1700000100,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("refPositions").is_some());
        assert_eq!(json["lastModified"], 1700000100);
        assert_eq!(json["refPositions"]["refs/heads/main"]["commitDate"], 1700000000);
    }

    #[test]
    fn sync_summary_sort_orders_all_lists() {
        let mut summary = SyncSummary {
            added: vec!["b".into(), "a".into()],
            updated: vec!["z".into(), "y".into()],
            deleted: vec!["d".into(), "c".into()],
        };
        summary.sort();
        assert_eq!(summary.added, vec!["a", "b"]);
        assert_eq!(summary.updated, vec!["y", "z"]);
        assert_eq!(summary.deleted, vec!["c", "d"]);
        assert_eq!(summary.len(), 6);
        assert!(!summary.is_empty());
    }

    #[test]
    fn empty_sync_summary() {
        assert!(SyncSummary::default().is_empty());
    }
}
