use crate::parse;
use crate::scanner::Scanner;
use repoharvest_core::constants;
use repoharvest_core::error::ScanError;
use repoharvest_core::types::MirrorStatus;
use repoharvest_mirror::{MirrorRepository, checkpoint};
use tracing::{debug, info};

/// One branch and the scanners registered for it. Branch categories get
/// different sets: a production branch typically carries the full set, a
/// development branch a reduced one.
pub struct BranchScanners<'s> {
    pub branch: String,
    pub scanners: Vec<Box<dyn Scanner + 's>>,
}

impl<'s> BranchScanners<'s> {
    pub fn new(branch: impl Into<String>, scanners: Vec<Box<dyn Scanner + 's>>) -> Self {
        Self {
            branch: branch.into(),
            scanners,
        }
    }
}

/// Watermark tag name for a branch.
pub fn watermark_tag(branch: &str) -> String {
    format!("{}{branch}", constants::WATERMARK_TAG_PREFIX)
}

/// Run the watermark scan over every branch set. The caller holds the
/// repository lock and has already updated the mirror.
///
/// Per branch: check out and hard-reset, diff against the watermark tag
/// (or enumerate the whole tree when the tag is absent or a full scan was
/// requested), dispatch each changed file to every scanner in sorted
/// order, call `finish()` on each scanner, and only then move the
/// watermark to the branch tip. A failure anywhere leaves the watermark
/// behind, so the next run re-scans the same range — at-least-once
/// delivery, which is why scanners must be idempotent.
pub fn run_scan(
    mirror: &MirrorRepository,
    sets: &mut [BranchScanners<'_>],
    full_scan: bool,
) -> Result<MirrorStatus, ScanError> {
    let last_modified = checkpoint::read_checkpoint(mirror.location())?;

    for set in sets.iter_mut() {
        let branch_ref = format!("refs/heads/{}", set.branch);
        if !mirror.has_ref(&branch_ref) {
            info!(branch = %set.branch, "branch has no local ref; skipped");
            continue;
        }
        scan_branch(mirror, &branch_ref, set, full_scan)?;
    }

    Ok(MirrorStatus {
        ref_positions: mirror.ref_positions()?,
        last_modified,
    })
}

fn scan_branch(
    mirror: &MirrorRepository,
    branch_ref: &str,
    set: &mut BranchScanners<'_>,
    full_scan: bool,
) -> Result<(), ScanError> {
    mirror.checkout_and_reset(branch_ref)?;

    let tag = watermark_tag(&set.branch);
    let since = if full_scan || !mirror.has_ref(&format!("refs/tags/{tag}")) {
        None
    } else {
        Some(tag.as_str())
    };

    let changed = mirror.changed_files(since, "HEAD", parse::scannable_file)?;
    info!(
        branch = %set.branch,
        files = changed.len(),
        incremental = since.is_some(),
        "dispatching changed files"
    );

    for path in &changed {
        let parsed = parse::parse_file(mirror.location(), path);
        for scanner in set.scanners.iter_mut() {
            debug!(scanner = scanner.name(), path = %path, "dispatch");
            scanner.scan_file(path, parsed.as_ref())?;
        }
    }
    for scanner in set.scanners.iter_mut() {
        scanner.finish()?;
    }

    // Scanners are done; the branch is now scanned up to its tip.
    mirror.create_tag(&tag, constants::WATERMARK_TAG_MESSAGE)?;
    Ok(())
}
