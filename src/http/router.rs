//! Maps request targets to files under the document root.
//!
//! Every target is treated as a directory whose `index.html` is served:
//!
//! ```text
//! /          -> <root>/index.html
//! /docs      -> <root>/docs/index.html
//! /docs/api  -> <root>/docs/api/index.html
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
pub enum RouteError {
    Empty,
    MissingLeadingSlash,
    /// Only on platforms whose paths are not raw bytes.
    NotUtf8,
    /// A `..` segment would walk out of the document root.
    Traversal,
}

const INDEX: &str = "index.html";

/// Target bytes go into the path verbatim.
pub fn route_to_path(root: &Path, target: &[u8]) -> Result<PathBuf, RouteError> {
    let rest = match target.strip_prefix(b"/") {
        Some(rest) => rest,
        None if target.is_empty() => return Err(RouteError::Empty),
        None => return Err(RouteError::MissingLeadingSlash),
    };

    if rest.is_empty() {
        return Ok(root.join(INDEX));
    }
    if rest.split(|&b| b == b'/').any(|segment| segment == b"..") {
        return Err(RouteError::Traversal);
    }

    let mut path = root.as_os_str().to_owned();
    path.push(target_os_str(target)?);
    path.push("/");
    path.push(INDEX);
    Ok(PathBuf::from(path))
}

#[cfg(unix)]
fn target_os_str(target: &[u8]) -> Result<&OsStr, RouteError> {
    use std::os::unix::ffi::OsStrExt;
    Ok(OsStr::from_bytes(target))
}

#[cfg(not(unix))]
fn target_os_str(target: &[u8]) -> Result<&OsStr, RouteError> {
    std::str::from_utf8(target)
        .map(OsStr::new)
        .map_err(|_| RouteError::NotUtf8)
}
