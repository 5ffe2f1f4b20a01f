use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use castkit_io_fs::{
    EnumChecksumAlgorithm, EnumCopySymlinkStrategy, EnumPatternMode, FsError, ReportCopy,
    SpecCopyTreeOptions, SpecFileListOptions, SpecTarLookupOptions,
};
use pyo3::exceptions::{
    PyFileExistsError, PyFileNotFoundError, PyNotADirectoryError, PyOSError, PyPermissionError,
    PyValueError,
};
use pyo3::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "castkit.fs.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "ReportCopy")]
#[derive(Debug, Clone)]
struct PyReportCopy {
    inner: ReportCopy,
}

impl From<ReportCopy> for PyReportCopy {
    fn from(report_copy: ReportCopy) -> Self {
        Self { inner: report_copy }
    }
}

#[pymethods]
impl PyReportCopy {
    #[getter]
    fn cnt_dirs_created(&self) -> u64 {
        self.inner.cnt_dirs_created
    }

    #[getter]
    fn cnt_files_copied(&self) -> u64 {
        self.inner.cnt_files_copied
    }

    #[getter]
    fn cnt_symlinks_created(&self) -> u64 {
        self.inner.cnt_symlinks_created
    }

    #[getter]
    fn warnings(&self) -> Vec<String> {
        self.inner.warnings.clone()
    }

    #[getter]
    fn warning_count(&self) -> usize {
        self.inner.warning_count()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.inner.to_dict()
    }

    #[pyo3(signature = (prefix = "[COPY]"))]
    fn format(&self, prefix: &str) -> String {
        self.inner.format(prefix)
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

fn parse_rule_pattern(value: &str) -> PyResult<EnumPatternMode> {
    match value {
        "prefix" => Ok(EnumPatternMode::Prefix),
        "glob" => Ok(EnumPatternMode::Glob),
        "regex" => Ok(EnumPatternMode::Regex),
        "literal" => Ok(EnumPatternMode::Literal),
        _ => Err(PyValueError::new_err(format!(
            "Invalid pattern strategy: `{value}`. Expected one of: ['prefix', 'glob', 'regex', 'literal']"
        ))),
    }
}

fn parse_algorithm(value: &str) -> PyResult<EnumChecksumAlgorithm> {
    match value {
        "md5" => Ok(EnumChecksumAlgorithm::Md5),
        "sha1" => Ok(EnumChecksumAlgorithm::Sha1),
        "sha256" => Ok(EnumChecksumAlgorithm::Sha256),
        _ => Err(PyValueError::new_err(format!(
            "Invalid checksum algorithm: `{value}`. Expected one of: ['md5', 'sha1', 'sha256']"
        ))),
    }
}

fn map_fs_error(exception: FsError) -> PyErr {
    let message = exception.to_string();
    debug!("raising Python exception: {message}");
    match &exception {
        FsError::SourceNotFound(_) => PyFileNotFoundError::new_err(message),
        FsError::SourceNotDirectory(_) | FsError::DestinationNotDirectory(_) => {
            PyNotADirectoryError::new_err(message)
        }
        FsError::BrokenSymlink(_) => PyFileNotFoundError::new_err(message),
        FsError::SourceDestinationOverlap { .. }
        | FsError::InvalidTargetPath(_)
        | FsError::MismatchedTargets { .. }
        | FsError::InvalidPattern(_) => PyValueError::new_err(message),
        FsError::Io { source, .. } => match source.kind() {
            io::ErrorKind::NotFound => PyFileNotFoundError::new_err(message),
            io::ErrorKind::AlreadyExists => PyFileExistsError::new_err(message),
            io::ErrorKind::PermissionDenied => PyPermissionError::new_err(message),
            _ => PyOSError::new_err(message),
        },
    }
}

fn to_copy_tree_options(symlinks: bool) -> SpecCopyTreeOptions {
    EnumCopySymlinkStrategy::from(symlinks).into()
}

#[pyfunction(name = "copy_tree")]
#[pyo3(signature = (source, destination, symlinks = false))]
fn copy_tree_py(
    py: Python<'_>,
    source: PathBuf,
    destination: PathBuf,
    symlinks: bool,
) -> PyResult<PyReportCopy> {
    let spec_cp_options = to_copy_tree_options(symlinks);
    let report_copy = py
        .allow_threads(|| castkit_io_fs::copy_tree(source, destination, spec_cp_options))
        .map_err(map_fs_error)?;
    Ok(PyReportCopy::from(report_copy))
}

#[pyfunction(name = "copy_trees")]
#[pyo3(signature = (target, sources, symlinks = false))]
fn copy_trees_py(
    py: Python<'_>,
    target: PathBuf,
    sources: Vec<PathBuf>,
    symlinks: bool,
) -> PyResult<PyReportCopy> {
    let spec_cp_options = to_copy_tree_options(symlinks);
    let report_copy = py
        .allow_threads(|| castkit_io_fs::copy_trees(target, &sources, spec_cp_options))
        .map_err(map_fs_error)?;
    Ok(PyReportCopy::from(report_copy))
}

#[pyfunction(name = "copy_files")]
fn copy_files_py(
    py: Python<'_>,
    targets: Vec<PathBuf>,
    sources: Vec<PathBuf>,
) -> PyResult<PyReportCopy> {
    let report_copy = py
        .allow_threads(|| castkit_io_fs::copy_files(&targets, &sources))
        .map_err(map_fs_error)?;
    Ok(PyReportCopy::from(report_copy))
}

#[pyfunction(name = "delete_path")]
fn delete_path_py(py: Python<'_>, path: PathBuf) -> PyResult<()> {
    py.allow_threads(|| castkit_io_fs::delete_path(path))
        .map_err(map_fs_error)
}

#[pyfunction(name = "delete_paths")]
fn delete_paths_py(py: Python<'_>, paths: Vec<PathBuf>) -> PyResult<()> {
    py.allow_threads(|| castkit_io_fs::delete_paths(&paths))
        .map_err(map_fs_error)
}

/// Argument order follows the build action: `target` is the link to create,
/// `source` is the path it points at.
#[pyfunction(name = "symlink")]
fn symlink_py(target: PathBuf, source: PathBuf) -> PyResult<()> {
    castkit_io_fs::create_symlink(target, source).map_err(map_fs_error)
}

#[pyfunction(name = "get_runit_directory_name")]
fn get_runit_directory_name_py(base_path: PathBuf) -> PyResult<Option<String>> {
    castkit_io_fs::get_runit_directory_name(base_path).map_err(map_fs_error)
}

#[pyfunction(name = "get_file_list")]
#[pyo3(signature = (
    base_path,
    include_list = None,
    exclude_list = None,
    rule_pattern = "prefix",
    if_follow_links = false
))]
fn get_file_list_py(
    py: Python<'_>,
    base_path: PathBuf,
    include_list: Option<Vec<String>>,
    exclude_list: Option<Vec<String>>,
    rule_pattern: &str,
    if_follow_links: bool,
) -> PyResult<Vec<String>> {
    let spec_list_options = SpecFileListOptions {
        patterns_include: include_list,
        patterns_exclude: exclude_list,
        rule_pattern: parse_rule_pattern(rule_pattern)?,
        if_follow_links,
    };
    py.allow_threads(|| castkit_io_fs::get_file_list(base_path, &spec_list_options))
        .map_err(map_fs_error)
}

#[pyfunction(name = "checksum_file")]
#[pyo3(signature = (path, algorithm = "md5"))]
fn checksum_file_py(py: Python<'_>, path: PathBuf, algorithm: &str) -> PyResult<String> {
    let algorithm = parse_algorithm(algorithm)?;
    py.allow_threads(|| castkit_io_fs::checksum_file(path, algorithm))
        .map_err(map_fs_error)
}

#[pyfunction(name = "write_checksum_file")]
#[pyo3(signature = (path, algorithm = "md5"))]
fn write_checksum_file_py(py: Python<'_>, path: PathBuf, algorithm: &str) -> PyResult<PathBuf> {
    let algorithm = parse_algorithm(algorithm)?;
    py.allow_threads(|| castkit_io_fs::write_checksum_file(path, algorithm))
        .map_err(map_fs_error)
}

#[pyfunction(name = "find_gnu_tar")]
fn find_gnu_tar_py(py: Python<'_>) -> PyResult<Option<PathBuf>> {
    let spec_tar_options = SpecTarLookupOptions::default();
    py.allow_threads(|| castkit_io_fs::find_gnu_tar(&spec_tar_options))
        .map_err(map_fs_error)
}

/// Shell command string for a download build action. Nothing is executed.
#[pyfunction(name = "download_file")]
fn download_file_py(source: &str, target: &str) -> String {
    castkit_io_fs::format_download_command(source, target)
}

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `level` when set. Returns `False` when a subscriber
/// was already installed.
#[pyfunction(name = "init_logging")]
#[pyo3(signature = (level = "info"))]
fn init_logging_py(level: &str) -> PyResult<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(v) => v,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| PyValueError::new_err(format!("Invalid log level `{level}`: {e}")))?,
    };
    let b_installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();
    if b_installed {
        info!("castkit logging initialised at `{level}`");
    } else {
        debug!("castkit logging already initialised");
    }
    Ok(b_installed)
}

#[pymodule]
fn _castkit_io_fs_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportCopy>()?;
    module.add_function(wrap_pyfunction!(copy_tree_py, module)?)?;
    module.add_function(wrap_pyfunction!(copy_trees_py, module)?)?;
    module.add_function(wrap_pyfunction!(copy_files_py, module)?)?;
    module.add_function(wrap_pyfunction!(delete_path_py, module)?)?;
    module.add_function(wrap_pyfunction!(delete_paths_py, module)?)?;
    module.add_function(wrap_pyfunction!(symlink_py, module)?)?;
    module.add_function(wrap_pyfunction!(get_runit_directory_name_py, module)?)?;
    module.add_function(wrap_pyfunction!(get_file_list_py, module)?)?;
    module.add_function(wrap_pyfunction!(checksum_file_py, module)?)?;
    module.add_function(wrap_pyfunction!(write_checksum_file_py, module)?)?;
    module.add_function(wrap_pyfunction!(find_gnu_tar_py, module)?)?;
    module.add_function(wrap_pyfunction!(download_file_py, module)?)?;
    module.add_function(wrap_pyfunction!(init_logging_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}

