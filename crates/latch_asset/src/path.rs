//! Logical asset paths
//!
//! Logical paths are forward-slash separated regardless of the host. A second
//! namespace addresses assets embedded inside another file:
//! `<host path>internal/path`. Nothing on disk can produce that form because
//! the scanner never emits a path starting with [`HOST_PATH_BEGIN`].

use std::path::Path;

/// Opens the host part of an embedded path.
pub const HOST_PATH_BEGIN: &str = "<";
/// Closes the host part of an embedded path.
pub const HOST_PATH_END: &str = ">";

/// Build the synthetic path of an asset embedded in `host`.
pub fn embedded_path(host: &str, internal: &str) -> String {
    format!("{HOST_PATH_BEGIN}{host}{HOST_PATH_END}{internal}")
}

#[inline]
pub fn is_embedded(path: &str) -> bool {
    path.starts_with(HOST_PATH_BEGIN)
}

/// Split an embedded path into `(host, internal)`.
///
/// The last closing marker wins, so nested embedded hosts stay intact.
pub fn split_embedded(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix(HOST_PATH_BEGIN)?;
    let end = rest.rfind(HOST_PATH_END)?;
    Some((&rest[..end], &rest[end + HOST_PATH_END.len()..]))
}

/// Last component of a logical path.
///
/// A trailing separator names the directory itself, and a bare name with no
/// separator is its own file name. For embedded paths this is the last
/// component of the internal part.
pub fn file_name(path: &str) -> &str {
    match split_embedded(path) {
        Some((_, internal)) => last_segment(internal),
        None => last_segment(path),
    }
}

/// Extension of the file name, without the dot.
///
/// Only the final component is inspected, so dots in directory names never
/// leak into the extension. Leading-dot names (`.gitignore`) have none, and
/// embedded paths never have one.
pub fn extension(path: &str) -> &str {
    if is_embedded(path) {
        return "";
    }
    let name = last_segment(path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(index) => &name[index + 1..],
    }
}

/// Append one component to a logical directory path.
pub fn join(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Render a host path with forward slashes.
pub fn to_logical(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn last_segment(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}
