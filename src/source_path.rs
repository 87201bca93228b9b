//! Absolute source paths for `fl=` and `cfl=` lines

use crate::error::{ExportError, Result};
use crate::profile::MethodInfo;
use std::path::{Component, Path, PathBuf};

/// Absolute, lexically normalized path of the method's source file
///
/// Relative paths are resolved against the current working directory. The
/// file does not need to exist.
pub fn resolve(method: &MethodInfo) -> Result<String> {
    let absolute = absolute_path(&method.source_file).map_err(|source| {
        ExportError::PathResolution {
            method: method.full_name.clone(),
            path: method.source_file.clone(),
            source,
        }
    })?;
    Ok(absolute.to_string_lossy().into_owned())
}

fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(normalize(&absolute))
}

/// Collapse `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
