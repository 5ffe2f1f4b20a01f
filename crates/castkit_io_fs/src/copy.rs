//! Tree copier and build-target copy actions.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use crate::delete::remove_link_or_file;
use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{
    EnumCopySymlinkStrategy, EnumTreeCopyLayout, FsError, Result, SpecCopyTreeOptions,
};
use crate::util::{
    copy_file_contents, copy_file_with_metadata, create_symbolic_link, derive_basename,
    is_nested_within, read_dir_sorted,
};

#[derive(Debug)]
struct SpecCopyContext {
    rule_symlink: EnumCopySymlinkStrategy,
    builder_cp_report: ReportCopyBuilder,
    /// Directories on the current traversal path, by (device, inode).
    set_ancestor_dirs: HashSet<(u64, u64)>,
}

/// Copy a directory tree from `dir_source` into `dir_destination`,
/// following `cp -R` conventions.
///
/// - If `dir_destination` already exists, the contents land in
///   `dir_destination/basename(dir_source)`.
/// - Otherwise `dir_destination` is created and receives the contents
///   directly.
///
/// Subdirectories that already exist at the destination are reused and
/// existing files are overwritten, so repeating a call succeeds. Symlinks
/// left in the destination are replaced, never written through. Regular
/// files keep permission bits and timestamps. Symlinks are recreated or
/// dereferenced according to [`SpecCopyTreeOptions::rule_symlink`].
///
/// The first filesystem error aborts the copy; whatever was copied before
/// it stays in place.
pub fn copy_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_cp_options: SpecCopyTreeOptions,
) -> Result<ReportCopy>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref();
    let path_dir_dst = dir_destination.as_ref();

    match fs::metadata(path_dir_src) {
        Ok(meta_src) if meta_src.is_dir() => {}
        Ok(_) => return Err(FsError::SourceNotDirectory(path_dir_src.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FsError::SourceNotFound(path_dir_src.to_path_buf()));
        }
        Err(e) => return Err(FsError::io("inspect", path_dir_src)(e)),
    }

    let enum_layout = EnumTreeCopyLayout::resolve(path_dir_dst)?;
    let path_dir_dst_root = match enum_layout {
        EnumTreeCopyLayout::NestUnderDestination => {
            let name_src = derive_basename(path_dir_src)
                .ok_or_else(|| FsError::InvalidTargetPath(path_dir_src.to_path_buf()))?;
            path_dir_dst.join(name_src)
        }
        EnumTreeCopyLayout::CopyDirectly => path_dir_dst.to_path_buf(),
    };
    if is_nested_within(&path_dir_dst_root, path_dir_src) {
        return Err(FsError::SourceDestinationOverlap {
            path_src: path_dir_src.to_path_buf(),
            path_dst: path_dir_dst_root,
        });
    }
    debug!(
        "copy tree {} -> {} ({enum_layout:?})",
        path_dir_src.display(),
        path_dir_dst_root.display()
    );

    let mut spec_cp_ctx = SpecCopyContext {
        rule_symlink: spec_cp_options.rule_symlink,
        builder_cp_report: ReportCopyBuilder::default(),
        set_ancestor_dirs: HashSet::new(),
    };
    ensure_directory(&path_dir_dst_root, &mut spec_cp_ctx)?;
    walk_directory(path_dir_src, &path_dir_dst_root, &mut spec_cp_ctx)?;

    let report_copy = spec_cp_ctx.builder_cp_report.build();
    info!(
        "{} {} -> {}",
        report_copy,
        path_dir_src.display(),
        path_dir_dst_root.display()
    );
    Ok(report_copy)
}

/// Copy each source into the target directory, re-rooted at its own path:
/// `sources[i]` is copied with [`copy_tree`] to `dir_target/sources[i]`.
///
/// Root and prefix components of a source are dropped before joining, and
/// a relative `dir_target` is resolved against the current directory.
/// Sources containing `..` are rejected.
pub fn copy_trees<P, Q>(
    dir_target: P,
    dirs_source: &[Q],
    spec_cp_options: SpecCopyTreeOptions,
) -> Result<ReportCopy>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_target = dir_target.as_ref();
    let path_cwd = std::env::current_dir()
        .map_err(FsError::io("resolve current directory for", path_dir_target))?;
    let path_dir_target = resolve_target_directory(path_dir_target, &path_cwd);

    let mut builder_cp_report = ReportCopyBuilder::default();
    for dir_source in dirs_source {
        let path_dir_src = dir_source.as_ref();
        let path_dir_dst = derive_rerooted_path(&path_dir_target, path_dir_src)?;
        builder_cp_report.absorb(copy_tree(path_dir_src, &path_dir_dst, spec_cp_options)?);
    }
    Ok(builder_cp_report.build())
}

/// Copy `sources[i]` to `targets[i]` byte-for-byte, overwriting targets.
///
/// Metadata is not carried over. Both lists must have the same length.
pub fn copy_files<P, Q>(paths_target: &[P], paths_source: &[Q]) -> Result<ReportCopy>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    if paths_target.len() != paths_source.len() {
        return Err(FsError::MismatchedTargets {
            n_targets: paths_target.len(),
            n_sources: paths_source.len(),
        });
    }

    let mut builder_cp_report = ReportCopyBuilder::default();
    for (path_target, path_source) in paths_target.iter().zip(paths_source) {
        let path_target = path_target.as_ref();
        let path_source = path_source.as_ref();
        let n_bytes = copy_file_contents(path_source, path_target)?;
        debug!(
            "copied {} -> {} ({n_bytes} bytes)",
            path_source.display(),
            path_target.display()
        );
        builder_cp_report.add_file_copied();
    }
    Ok(builder_cp_report.build())
}

fn resolve_target_directory(path_dir_target: &Path, path_cwd: &Path) -> PathBuf {
    if path_dir_target.is_absolute() {
        return path_dir_target.to_path_buf();
    }
    path_cwd.join(path_dir_target)
}

fn derive_rerooted_path(path_dir_target: &Path, path_src: &Path) -> Result<PathBuf> {
    let mut path_rel = PathBuf::new();
    for component in path_src.components() {
        match component {
            Component::Normal(part) => path_rel.push(part),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                return Err(FsError::InvalidTargetPath(path_src.to_path_buf()));
            }
        }
    }
    if path_rel.as_os_str().is_empty() {
        return Err(FsError::InvalidTargetPath(path_src.to_path_buf()));
    }
    Ok(path_dir_target.join(path_rel))
}

fn ensure_directory(path_dir: &Path, spec_cp_ctx: &mut SpecCopyContext) -> Result<()> {
    if path_dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path_dir).map_err(FsError::io("create directory", path_dir))?;
    debug!("created directory {}", path_dir.display());
    spec_cp_ctx.builder_cp_report.add_dir_created();
    Ok(())
}

#[cfg(unix)]
fn derive_directory_identifier(path_dir: &Path) -> Result<Option<(u64, u64)>> {
    use std::os::unix::fs::MetadataExt;
    let stat_dir = fs::metadata(path_dir).map_err(FsError::io("inspect", path_dir))?;
    Ok(Some((stat_dir.dev(), stat_dir.ino())))
}

#[cfg(not(unix))]
fn derive_directory_identifier(_path_dir: &Path) -> Result<Option<(u64, u64)>> {
    Ok(None)
}

fn walk_directory(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_cp_ctx: &mut SpecCopyContext,
) -> Result<()> {
    let id_dir = derive_directory_identifier(path_dir_src)?;
    if let Some(id_dir) = id_dir
        && !spec_cp_ctx.set_ancestor_dirs.insert(id_dir)
    {
        let message = format!("Symlink loop detected: {}", path_dir_src.display());
        warn!("{message}");
        spec_cp_ctx.builder_cp_report.add_warning(message);
        return Ok(());
    }

    let res_walk = walk_entries(path_dir_src, path_dir_dst, spec_cp_ctx);
    if let Some(id_dir) = id_dir {
        spec_cp_ctx.set_ancestor_dirs.remove(&id_dir);
    }
    res_walk
}

fn walk_entries(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_cp_ctx: &mut SpecCopyContext,
) -> Result<()> {
    for entry in read_dir_sorted(path_dir_src)? {
        let path_entry_src = entry.path();
        let path_entry_dst = path_dir_dst.join(entry.file_name());
        let cfg_file_type = entry
            .file_type()
            .map_err(FsError::io("inspect", &path_entry_src))?;
        let b_is_symlink = cfg_file_type.is_symlink();

        if b_is_symlink && spec_cp_ctx.rule_symlink == EnumCopySymlinkStrategy::CopySymlinks {
            copy_symlink(&path_entry_src, &path_entry_dst, spec_cp_ctx)?;
            continue;
        }

        if b_is_symlink && !path_entry_src.exists() {
            return Err(FsError::BrokenSymlink(path_entry_src));
        }

        if cfg_file_type.is_dir() || (b_is_symlink && path_entry_src.is_dir()) {
            clear_destination_symlink(&path_entry_dst, spec_cp_ctx)?;
            ensure_directory(&path_entry_dst, spec_cp_ctx)?;
            walk_directory(&path_entry_src, &path_entry_dst, spec_cp_ctx)?;
        } else if cfg_file_type.is_file() || (b_is_symlink && path_entry_src.is_file()) {
            clear_destination_symlink(&path_entry_dst, spec_cp_ctx)?;
            copy_file_with_metadata(&path_entry_src, &path_entry_dst)?;
            debug!(
                "copied {} -> {}",
                path_entry_src.display(),
                path_entry_dst.display()
            );
            spec_cp_ctx.builder_cp_report.add_file_copied();
        } else {
            let message = format!("Special file skipped: {}", path_entry_src.display());
            warn!("{message}");
            spec_cp_ctx.builder_cp_report.add_warning(message);
        }
    }
    Ok(())
}

/// Unlink a symlink sitting where a real file or directory is about to be
/// written. Writing through it would land wherever it points, possibly
/// inside the source tree.
fn clear_destination_symlink(path_dst: &Path, spec_cp_ctx: &mut SpecCopyContext) -> Result<()> {
    let meta_dst = match fs::symlink_metadata(path_dst) {
        Ok(v) => v,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(FsError::io("inspect", path_dst)(e)),
    };
    if !meta_dst.file_type().is_symlink() {
        return Ok(());
    }

    remove_link_or_file(path_dst, &meta_dst)?;
    let message = format!("Replaced destination symlink: {}", path_dst.display());
    warn!("{message}");
    spec_cp_ctx.builder_cp_report.add_warning(message);
    Ok(())
}

/// Recreate the link at `path_link_src` as `path_link_dst`, replacing a
/// previous non-directory entry there.
fn copy_symlink(
    path_link_src: &Path,
    path_link_dst: &Path,
    spec_cp_ctx: &mut SpecCopyContext,
) -> Result<()> {
    let target = fs::read_link(path_link_src).map_err(FsError::io("read link", path_link_src))?;

    if let Ok(meta_dst) = fs::symlink_metadata(path_link_dst)
        && !meta_dst.is_dir()
    {
        remove_link_or_file(path_link_dst, &meta_dst)?;
    }
    create_symbolic_link(&target, path_link_dst).map_err(FsError::io("create link", path_link_dst))?;
    debug!(
        "linked {} -> {}",
        path_link_dst.display(),
        target.display()
    );
    spec_cp_ctx.builder_cp_report.add_symlink_created();
    Ok(())
}
