//! Recursive file collection with include/exclude filters.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::spec::{FsError, Result, SpecFileListOptions};
use crate::util::SpecPatternSet;

/// Collect files below `base_path` as `/`-joined paths relative to it.
///
/// A file is kept when it matches at least one include pattern (all files
/// when no include list is given) and no exclude pattern. Patterns are
/// applied to the relative path using [`SpecFileListOptions::rule_pattern`].
/// Non-directory entries count as files, so symlinks to files and dangling
/// symlinks are listed whether or not links are followed. Symlinked
/// directories are never listed themselves and are only entered with
/// [`SpecFileListOptions::if_follow_links`].
///
/// The result is sorted.
pub fn get_file_list<P: AsRef<Path>>(
    base_path: P,
    spec_list_options: &SpecFileListOptions,
) -> Result<Vec<String>> {
    let path_base = base_path.as_ref();
    let spec_pats = SpecPatternSet::from_raw(
        spec_list_options.patterns_include.as_deref(),
        spec_list_options.patterns_exclude.as_deref(),
        spec_list_options.rule_pattern,
    )?;

    let mut l_files = Vec::new();
    let iter_entries = WalkDir::new(path_base)
        .follow_links(spec_list_options.if_follow_links)
        .sort_by_file_name();
    for entry_res in iter_entries {
        let path_entry = match entry_res {
            Ok(entry) => {
                if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
                {
                    continue;
                }
                entry.into_path()
            }
            Err(e) => match derive_dangling_link(&e) {
                Some(path_link) => path_link,
                None => {
                    return Err(FsError::Io {
                        op: "walk",
                        path: e
                            .path()
                            .map_or_else(|| path_base.to_path_buf(), Path::to_path_buf),
                        source: e.into(),
                    });
                }
            },
        };

        let Ok(path_rel) = path_entry.strip_prefix(path_base) else {
            continue;
        };
        if path_rel.as_os_str().is_empty() {
            continue;
        }
        let c_path_rel = path_rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if spec_pats.should_keep(&c_path_rel) {
            l_files.push(c_path_rel);
        }
    }

    l_files.sort();
    debug!(
        "collected {} files under {}",
        l_files.len(),
        path_base.display()
    );
    Ok(l_files)
}

/// Path of the dangling link behind a walk error raised while following
/// links. Loops and other failures yield `None`.
fn derive_dangling_link(e: &walkdir::Error) -> Option<PathBuf> {
    if e.loop_ancestor().is_some() {
        return None;
    }
    let path_link = e.path()?;
    let meta_link = fs::symlink_metadata(path_link).ok()?;
    (meta_link.file_type().is_symlink() && !path_link.exists()).then(|| path_link.to_path_buf())
}
