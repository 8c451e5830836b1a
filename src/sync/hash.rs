//! Content hashing for change detection.
//!
//! SHA-256 over the file bytes after CRLF → LF normalization, rendered as
//! 64 lowercase hex chars. A checkout with `autocrlf` and one without hash the
//! same; nothing else (BOM, trailing whitespace) is normalized.

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Hash raw bytes.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    let mut rest = bytes;
    while let Some(pos) = rest.windows(2).position(|w| w == b"\r\n") {
        hasher.update(&rest[..pos]);
        rest = &rest[pos + 1..];
    }
    hasher.update(rest);
    format!("{:x}", hasher.finalize())
}

/// Hash a file on disk.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be read.
pub fn hash_file(path: &Path) -> io::Result<String> {
    fs::read(path).map(|bytes| content_hash(&bytes))
}

/// Check if a file has changed since it was last recorded.
///
/// Returns `true` if there is no stored hash or it differs.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.map_or(true, |h| h != current_hash)
}
