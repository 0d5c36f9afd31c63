//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Keeps sensitive data (full file paths, document passwords) out of
//! spans and log lines.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Returns only the filename component of a path (no directory).
///
/// Safe for span fields: reveals the file name without the full path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Returns a short deterministic hash of a path for correlation without
/// exposing the actual path.
pub fn hash_path(path: &Path) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    let hash = hasher.finish();
    format!("{:016x}", hash)
}
