//! Symlink creation for build targets.

use std::path::Path;

use tracing::debug;

use crate::spec::{FsError, Result};
use crate::util::create_symbolic_link;

/// Create a symbolic link at `path_link` whose content is `path_link_target`.
///
/// The target is stored verbatim, so relative targets resolve against the
/// link's directory. Fails if anything already exists at `path_link`.
pub fn create_symlink<P, Q>(path_link: P, path_link_target: Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_link = path_link.as_ref();
    let path_link_target = path_link_target.as_ref();
    create_symbolic_link(path_link_target, path_link)
        .map_err(FsError::io("create link", path_link))?;
    debug!(
        "linked {} -> {}",
        path_link.display(),
        path_link_target.display()
    );
    Ok(())
}
