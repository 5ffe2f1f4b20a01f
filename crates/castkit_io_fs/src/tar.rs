//! GNU tar binary discovery.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::conf::C_TAR_VERSION_PATTERN;
use crate::spec::{FsError, Result, SpecTarLookupOptions};

/// Version string reported by `tar --version`, if the output is GNU tar's.
pub fn parse_gnu_tar_version(stdout: &str) -> Option<String> {
    tar_version_regex()
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn tar_version_regex() -> &'static Regex {
    static TAR_VERSION_RE: OnceLock<Regex> = OnceLock::new();
    TAR_VERSION_RE.get_or_init(|| Regex::new(C_TAR_VERSION_PATTERN).expect("valid regex"))
}

/// Compare dotted versions numerically, component by component.
///
/// Missing components count as zero and non-digit suffixes within a
/// component are ignored: `1.9` is below `1.20`, `1.26-rc` equals `1.26`.
pub fn is_version_at_least(version: &str, version_min: &str) -> bool {
    compare_versions(version, version_min) != Ordering::Less
}

fn parse_version_parts(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| {
            let c_digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            c_digits.parse().unwrap_or(0)
        })
        .collect()
}

fn compare_versions(lhs: &str, rhs: &str) -> Ordering {
    let l_lhs = parse_version_parts(lhs);
    let l_rhs = parse_version_parts(rhs);
    let n_parts = l_lhs.len().max(l_rhs.len());
    for n_idx in 0..n_parts {
        let n_lhs = l_lhs.get(n_idx).copied().unwrap_or(0);
        let n_rhs = l_rhs.get(n_idx).copied().unwrap_or(0);
        match n_lhs.cmp(&n_rhs) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Locate the first candidate binary that is GNU tar at or above the
/// minimum version.
///
/// Candidates are looked up on `PATH` (or
/// [`SpecTarLookupOptions::search_path`]) in order and probed with
/// `--version`. Candidates that are missing, fail to run, or report another
/// implementation are skipped. Returns `None` when nothing qualifies.
pub fn find_gnu_tar(spec_tar_options: &SpecTarLookupOptions) -> Result<Option<PathBuf>> {
    let path_cwd = std::env::current_dir()
        .map_err(FsError::io("resolve current directory for", Path::new(".")))?;

    for name_binary in &spec_tar_options.binary_candidates {
        let res_lookup = match &spec_tar_options.search_path {
            Some(search_path) => which::which_in(name_binary, Some(search_path), &path_cwd),
            None => which::which(name_binary),
        };
        let Ok(path_binary) = res_lookup else {
            debug!("tar candidate {name_binary} not found");
            continue;
        };

        let Some(version) = probe_tar_version(&path_binary) else {
            continue;
        };
        if is_version_at_least(&version, &spec_tar_options.version_min) {
            info!("using GNU tar {version} at {}", path_binary.display());
            return Ok(Some(path_binary));
        }
        debug!(
            "{} is GNU tar {version}, below {}",
            path_binary.display(),
            spec_tar_options.version_min
        );
    }
    Ok(None)
}

fn probe_tar_version(path_binary: &Path) -> Option<String> {
    let output = match Command::new(path_binary).arg("--version").output() {
        Ok(v) => v,
        Err(e) => {
            debug!("failed to run {} --version: {e}", path_binary.display());
            return None;
        }
    };
    if !output.status.success() {
        debug!(
            "{} --version exited with {}",
            path_binary.display(),
            output.status
        );
        return None;
    }
    parse_gnu_tar_version(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_pattern_compiles() {
        assert!(Regex::new(C_TAR_VERSION_PATTERN).is_ok());
        assert_eq!(tar_version_regex().captures_len(), 2);
    }

    #[test]
    fn parses_gnu_tar_banner() {
        let stdout = "tar (GNU tar) 1.34\nCopyright (C) 2021 Free Software Foundation, Inc.\n";
        assert_eq!(parse_gnu_tar_version(stdout).as_deref(), Some("1.34"));
    }

    #[test]
    fn rejects_non_gnu_banner() {
        let stdout = "bsdtar 3.5.1 - libarchive 3.5.1 zlib/1.2.11\n";
        assert_eq!(parse_gnu_tar_version(stdout), None);
    }

    #[test]
    fn compares_versions_numerically() {
        assert!(is_version_at_least("1.20", "1.20"));
        assert!(is_version_at_least("1.34", "1.20"));
        assert!(is_version_at_least("2.0", "1.20"));
        assert!(is_version_at_least("1.26-rc", "1.26"));
        assert!(!is_version_at_least("1.9", "1.20"));
        assert!(!is_version_at_least("1.19.90", "1.20"));
        assert!(is_version_at_least("1.20.0", "1.20"));
    }

    #[cfg(unix)]
    mod lookup {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;

        use crate::spec::SpecTarLookupOptions;
        use crate::tar::find_gnu_tar;

        fn write_fake_tar(dir: &Path, name: &str, banner: &str) {
            let path_script = dir.join(name);
            fs::write(
                &path_script,
                format!("#!/bin/sh\nprintf '%s\\n' '{banner}'\n"),
            )
            .expect("write script");
            fs::set_permissions(&path_script, fs::Permissions::from_mode(0o755))
                .expect("chmod script");
        }

        fn options_for(dir: &Path) -> SpecTarLookupOptions {
            SpecTarLookupOptions {
                search_path: Some(dir.as_os_str().to_owned()),
                ..SpecTarLookupOptions::default()
            }
        }

        #[test]
        fn skips_old_and_foreign_candidates() {
            let tmp = tempfile::tempdir().expect("tempdir");
            write_fake_tar(tmp.path(), "gnutar", "bsdtar 3.5.1 - libarchive 3.5.1");
            write_fake_tar(tmp.path(), "gtar", "tar (GNU tar) 1.15");
            write_fake_tar(tmp.path(), "tar", "tar (GNU tar) 1.34");

            let path_tar = find_gnu_tar(&options_for(tmp.path())).expect("lookup");
            assert_eq!(path_tar, Some(tmp.path().join("tar")));
        }

        #[test]
        fn prefers_earlier_candidates() {
            let tmp = tempfile::tempdir().expect("tempdir");
            write_fake_tar(tmp.path(), "gtar", "tar (GNU tar) 1.30");
            write_fake_tar(tmp.path(), "tar", "tar (GNU tar) 1.34");

            let path_tar = find_gnu_tar(&options_for(tmp.path())).expect("lookup");
            assert_eq!(path_tar, Some(tmp.path().join("gtar")));
        }

        #[test]
        fn returns_none_when_nothing_qualifies() {
            let tmp = tempfile::tempdir().expect("tempdir");
            write_fake_tar(tmp.path(), "tar", "tar (GNU tar) 1.19");

            let path_tar = find_gnu_tar(&options_for(tmp.path())).expect("lookup");
            assert_eq!(path_tar, None);
        }
    }
}
