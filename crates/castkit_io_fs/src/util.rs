use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{EnumPatternMode, FsError, Result};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypePatternSeq {
    Prefix(Vec<String>),
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypePatternSeq {
    fn is_matching(&self, value: &str) -> bool {
        match self {
            Self::Prefix(v) => v.iter().any(|p| value.starts_with(p.as_str())),
            Self::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
            Self::Glob(v) => v.iter().any(|p| p.is_match(value)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(value)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpecPatternSet {
    pub(crate) patterns_include: Option<TypePatternSeq>,
    pub(crate) patterns_exclude: Option<TypePatternSeq>,
}

impl SpecPatternSet {
    pub(crate) fn from_raw(
        patterns_include: Option<&[String]>,
        patterns_exclude: Option<&[String]>,
        rule_pattern: EnumPatternMode,
    ) -> Result<Self> {
        Ok(Self {
            patterns_include: _compile(patterns_include, rule_pattern)?,
            patterns_exclude: _compile(patterns_exclude, rule_pattern)?,
        })
    }

    /// Included by at least one include pattern (or no includes at all)
    /// and matched by no exclude pattern.
    pub(crate) fn should_keep(&self, value: &str) -> bool {
        let b_included = self
            .patterns_include
            .as_ref()
            .is_none_or(|p| p.is_matching(value));
        let b_excluded = self
            .patterns_exclude
            .as_ref()
            .is_some_and(|p| p.is_matching(value));
        b_included && !b_excluded
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumPatternMode,
) -> Result<Option<TypePatternSeq>> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };

    match rule_pattern {
        EnumPatternMode::Prefix => Ok(Some(TypePatternSeq::Prefix(patterns.to_vec()))),
        EnumPatternMode::Literal => Ok(Some(TypePatternSeq::Literal(patterns.to_vec()))),
        EnumPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| {
                        FsError::InvalidPattern(format!("Invalid pattern in include/exclude: {e}"))
                    })?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypePatternSeq::Glob(l_glob)))
        }
        EnumPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| {
                    FsError::InvalidPattern(format!("Invalid pattern in include/exclude: {e}"))
                })?;
                l_regex.push(regex);
            }
            Ok(Some(TypePatternSeq::Regex(l_regex)))
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Resolve `path` through its deepest existing ancestor, so paths that do
/// not exist yet still compare correctly against canonical ones.
fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let path_abs = _absolutize_path(path);
    match (path_abs.parent(), path_abs.file_name()) {
        (Some(parent), Some(name)) => _normalize_path(parent).join(name),
        _ => path_abs,
    }
}

/// `path_inner` is `path_outer` or lies beneath it.
pub(crate) fn is_nested_within(path_inner: &Path, path_outer: &Path) -> bool {
    _normalize_path(path_inner).starts_with(_normalize_path(path_outer))
}

/// Final name component of `path`, resolving `.`/`..`-style inputs.
pub(crate) fn derive_basename(path: &Path) -> Option<PathBuf> {
    if let Some(name) = path.file_name() {
        return Some(PathBuf::from(name));
    }
    _normalize_path(path).file_name().map(PathBuf::from)
}

/// Directory entries of `path_dir`, ordered by file name.
pub(crate) fn read_dir_sorted(path_dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut l_entries = fs::read_dir(path_dir)
        .map_err(FsError::io("read directory", path_dir))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(FsError::io("read directory", path_dir))?;
    l_entries.sort_by_key(|entry| entry.file_name());
    Ok(l_entries)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileOperations

pub(crate) fn create_symbolic_link(target: &Path, path_link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, path_link)
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        let path_resolved = match path_link.parent() {
            Some(parent) => parent.join(target),
            None => target.to_path_buf(),
        };
        if path_resolved.is_dir() {
            symlink_dir(target, path_link)
        } else {
            symlink_file(target, path_link)
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, path_link);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Symbolic links are unsupported on this platform",
        ))
    }
}

/// Copy bytes only; the destination keeps its own permissions and times.
pub(crate) fn copy_file_contents(path_file_src: &Path, path_file_dst: &Path) -> Result<u64> {
    let mut file_src =
        fs::File::open(path_file_src).map_err(FsError::io("open", path_file_src))?;
    let mut file_dst =
        fs::File::create(path_file_dst).map_err(FsError::io("create", path_file_dst))?;
    io::copy(&mut file_src, &mut file_dst).map_err(FsError::io("copy", path_file_dst))
}

/// Copy bytes plus permission bits, access/modify times and (on Linux)
/// extended attributes.
pub(crate) fn copy_file_with_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<()> {
    fs::copy(path_file_src, path_file_dst).map_err(FsError::io("copy", path_file_src))?;
    apply_metadata(path_file_src, path_file_dst).map_err(FsError::io("copy metadata to", path_file_dst))
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> io::Result<()> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::debug!(
                "xattr {:?} not copied to {}: {e}",
                name,
                path_file_dst.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
