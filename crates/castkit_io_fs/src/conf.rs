//! Constants shared by the filesystem helpers.

/// Directory-name prefix used to recognize runit service directories.
pub const C_RUNIT_DIR_PREFIX: &str = "runit";

/// Tar binaries probed in order when looking for GNU tar.
pub const TUP_TAR_BINARY_CANDIDATES: [&str; 3] = ["gnutar", "gtar", "tar"];

/// Minimum accepted GNU tar version.
pub const C_TAR_VERSION_MIN: &str = "1.20";

/// Extracts the version from `tar --version` output.
pub const C_TAR_VERSION_PATTERN: &str = r"\(GNU tar\) (.*)\n";

/// Read buffer size used while hashing files.
pub const N_CHECKSUM_BUFFER_SIZE: usize = 64 * 1024;

/// Download tool used by [`crate::shell::format_download_command`].
pub const C_DOWNLOAD_PROGRAM: &str = "wget";
