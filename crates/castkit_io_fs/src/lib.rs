//! `castkit_io_fs` v1:
//! Rust-side filesystem helpers for build-description scripts.
//!
//! Modules:
//! - `copy`     : tree copier and build-target copy actions
//! - `delete`   : file/symlink/tree removal
//! - `link`     : symlink creation
//! - `filelist` : recursive file collection with include/exclude filters
//! - `checksum` : streaming file digests
//! - `tar`      : GNU tar binary discovery
//! - `runit`    : runit directory discovery
//! - `shell`    : shell command formatting
//! - `conf`     : constants
//! - `spec`     : enums/options/errors
//! - `report`   : copy report model
//! - `util`     : shared helper functions

pub mod checksum;
pub mod conf;
pub mod copy;
pub mod delete;
pub mod filelist;
pub mod link;
pub mod report;
pub mod runit;
pub mod shell;
pub mod spec;
pub mod tar;
mod util;

pub use checksum::{checksum_bytes, checksum_file, write_checksum_file};
pub use copy::{copy_files, copy_tree, copy_trees};
pub use delete::{delete_path, delete_paths};
pub use filelist::get_file_list;
pub use link::create_symlink;
pub use report::{ReportCopy, ReportCopyBuilder};
pub use runit::get_runit_directory_name;
pub use shell::format_download_command;
pub use spec::{
    EnumChecksumAlgorithm, EnumCopySymlinkStrategy, EnumPatternMode, EnumTreeCopyLayout, FsError,
    Result, SpecCopyTreeOptions, SpecFileListOptions, SpecTarLookupOptions,
};
pub use tar::{find_gnu_tar, is_version_at_least, parse_gnu_tar_version};
