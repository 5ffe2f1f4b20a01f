//! File, symlink and tree removal.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::spec::{FsError, Result};

/// Remove whatever lives at `path`.
///
/// Missing paths are ignored. Directories are removed recursively; files and
/// symbolic links (including links to directories and dangling links) are
/// unlinked without following them.
pub fn delete_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let meta_path = match fs::symlink_metadata(path) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("nothing to delete at {}", path.display());
            return Ok(());
        }
        Err(e) => return Err(FsError::io("inspect", path)(e)),
    };

    if meta_path.is_dir() {
        fs::remove_dir_all(path).map_err(FsError::io("remove directory", path))?;
    } else {
        remove_link_or_file(path, &meta_path)?;
    }
    debug!("deleted {}", path.display());
    Ok(())
}

/// Delete each path in order, stopping at the first failure.
pub fn delete_paths<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for path in paths {
        delete_path(path)?;
    }
    Ok(())
}

#[cfg(windows)]
pub(crate) fn remove_link_or_file(path: &Path, meta_path: &fs::Metadata) -> Result<()> {
    use std::os::windows::fs::FileTypeExt;
    if meta_path.file_type().is_symlink_dir() {
        return fs::remove_dir(path).map_err(FsError::io("remove link", path));
    }
    fs::remove_file(path).map_err(FsError::io("remove file", path))
}

#[cfg(not(windows))]
pub(crate) fn remove_link_or_file(path: &Path, _meta_path: &fs::Metadata) -> Result<()> {
    fs::remove_file(path).map_err(FsError::io("remove file", path))
}
