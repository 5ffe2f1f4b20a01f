//! Helper specification models and top-level error types.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::conf::{C_TAR_VERSION_MIN, TUP_TAR_BINARY_CANDIDATES};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Symlink handling policy for the tree copier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCopySymlinkStrategy {
    /// Follow the link and copy the target bytes/entries.
    #[default]
    Dereference,
    /// Create a symbolic link at destination (do not copy target bytes).
    CopySymlinks,
}

impl From<bool> for EnumCopySymlinkStrategy {
    /// `true` keeps links as links, `false` copies what they point to.
    fn from(if_keep_symlinks: bool) -> Self {
        if if_keep_symlinks {
            Self::CopySymlinks
        } else {
            Self::Dereference
        }
    }
}

/// Where the copied contents land relative to the requested destination.
///
/// Resolved once per [`crate::copy::copy_tree`] call, before traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumTreeCopyLayout {
    /// Destination already exists: copy into `destination/basename(source)`.
    NestUnderDestination,
    /// Destination is missing: create it and copy the contents directly.
    CopyDirectly,
}

impl EnumTreeCopyLayout {
    /// Inspect `path_dir_dst` and pick the layout.
    ///
    /// An existing non-directory destination is rejected.
    pub fn resolve(path_dir_dst: &Path) -> Result<Self> {
        match path_dir_dst.metadata() {
            Ok(meta_dst) if meta_dst.is_dir() => Ok(Self::NestUnderDestination),
            Ok(_) => Err(FsError::DestinationNotDirectory(path_dir_dst.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::CopyDirectly),
            Err(e) => Err(FsError::Io {
                op: "inspect",
                path: path_dir_dst.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumPatternMode {
    /// Relative path starts with the pattern.
    #[default]
    Prefix,
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Relative path contains the pattern.
    Literal,
}

/// Digest used by the checksum helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumChecksumAlgorithm {
    /// MD5, as written by `md5sum`.
    #[default]
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
}

impl EnumChecksumAlgorithm {
    /// File extension of the sidecar checksum file.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Input options for `copy_tree`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecCopyTreeOptions {
    /// Symlink handling behavior.
    pub rule_symlink: EnumCopySymlinkStrategy,
}

impl From<EnumCopySymlinkStrategy> for SpecCopyTreeOptions {
    fn from(rule_symlink: EnumCopySymlinkStrategy) -> Self {
        Self { rule_symlink }
    }
}

/// Input options for `get_file_list`.
#[derive(Debug, Clone, Default)]
pub struct SpecFileListOptions {
    /// Include patterns applied to the relative file path. `None` keeps all.
    pub patterns_include: Option<Vec<String>>,
    /// Exclude patterns applied to the relative file path.
    pub patterns_exclude: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumPatternMode,
    /// Descend into symlinked directories.
    pub if_follow_links: bool,
}

/// Input options for `find_gnu_tar`.
#[derive(Debug, Clone)]
pub struct SpecTarLookupOptions {
    /// Binary names probed in order.
    pub binary_candidates: Vec<String>,
    /// Minimum accepted version, dotted numeric.
    pub version_min: String,
    /// Search path overriding `PATH`.
    pub search_path: Option<OsString>,
}

impl Default for SpecTarLookupOptions {
    fn default() -> Self {
        Self {
            binary_candidates: TUP_TAR_BINARY_CANDIDATES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            version_min: C_TAR_VERSION_MIN.to_string(),
            search_path: None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Result alias used across the crate.
pub type Result<T, E = FsError> = std::result::Result<T, E>;

/// Errors raised by the filesystem helpers.
#[derive(Debug, Error)]
pub enum FsError {
    /// Source path does not exist.
    #[error("Source does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// Source path is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Destination exists and is not a directory.
    #[error("Destination exists and is not a directory: {}", .0.display())]
    DestinationNotDirectory(PathBuf),
    /// Copy destination lies inside the source tree.
    #[error(
        "Destination is inside the source tree: {} <-> {}",
        path_src.display(),
        path_dst.display()
    )]
    SourceDestinationOverlap {
        /// Source directory.
        path_src: PathBuf,
        /// Resolved destination root.
        path_dst: PathBuf,
    },
    /// Dereferenced symlink points nowhere.
    #[error("Broken symlink: {}", .0.display())]
    BrokenSymlink(PathBuf),
    /// Source path cannot be re-rooted under a target directory.
    #[error("Cannot place source under target: {}", .0.display())]
    InvalidTargetPath(PathBuf),
    /// Target and source lists differ in length.
    #[error("Got {n_targets} targets for {n_sources} sources")]
    MismatchedTargets {
        /// Number of target paths.
        n_targets: usize,
        /// Number of source paths.
        n_sources: usize,
    },
    /// Invalid include/exclude pattern.
    #[error("{0}")]
    InvalidPattern(String),
    /// Underlying IO failure on `path`.
    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        /// Short verb naming the failed step.
        op: &'static str,
        /// Path the step was applied to.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Build a `map_err` adapter tagging an IO error with `op` and `path`.
    pub(crate) fn io(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io { op, path, source }
    }

    /// Kind of the wrapped IO error, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
