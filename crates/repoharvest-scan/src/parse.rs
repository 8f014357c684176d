use repoharvest_core::constants;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Whether a repository path is dispatched to scanners, by extension.
pub fn scannable_file(path: &str) -> bool {
    match extension(path) {
        Some(ext) => constants::SCANNABLE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Read and parse one scanned file from the working tree.
///
/// `None` carries two distinct situations scanners must tolerate anyway:
/// the file is gone (the diff reported a deletion) or its content does not
/// parse. A malformed file is logged and passed through rather than
/// aborting the branch, so one bad commit cannot block the rest of the
/// scan.
pub fn parse_file(workdir: &Path, rel_path: &str) -> Option<Value> {
    let full = workdir.join(rel_path);
    let raw = match std::fs::read_to_string(&full) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = rel_path, "file absent from working tree; dispatching as deleted");
            return None;
        }
        Err(e) => {
            warn!(path = rel_path, error = %e, "unreadable scanned file; dispatching without content");
            return None;
        }
    };

    match extension(rel_path).as_deref() {
        Some("yaml") | Some("yml") => match serde_yaml::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = rel_path, error = %e, "malformed yaml; dispatching without content");
                None
            }
        },
        Some("json") => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = rel_path, error = %e, "malformed json; dispatching without content");
                None
            }
        },
        _ => Some(Value::String(raw)),
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}
