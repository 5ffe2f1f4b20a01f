//! Runit service directory discovery.

use std::path::Path;

use crate::conf::C_RUNIT_DIR_PREFIX;
use crate::spec::Result;
use crate::util::read_dir_sorted;

/// Name of the first entry in `base_path` starting with `runit`, in name
/// order, or `None` when there is none.
pub fn get_runit_directory_name<P: AsRef<Path>>(base_path: P) -> Result<Option<String>> {
    let name_runit = read_dir_sorted(base_path.as_ref())?
        .into_iter()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .find(|name| name.starts_with(C_RUNIT_DIR_PREFIX));
    Ok(name_runit)
}
