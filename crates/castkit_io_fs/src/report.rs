//! Copy report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one copy run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportCopy {
    /// Number of destination directories created.
    pub cnt_dirs_created: u64,
    /// Number of regular files copied.
    pub cnt_files_copied: u64,
    /// Number of symbolic links recreated at destination.
    pub cnt_symlinks_created: u64,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
}

impl ReportCopy {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_dirs_created".to_string(), self.cnt_dirs_created);
        dict_counts.insert("cnt_files_copied".to_string(), self.cnt_files_copied);
        dict_counts.insert(
            "cnt_symlinks_created".to_string(),
            self.cnt_symlinks_created,
        );
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} dirs={} files={} symlinks={} warnings={}",
            self.cnt_dirs_created,
            self.cnt_files_copied,
            self.cnt_symlinks_created,
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[COPY]"))
    }
}

/// Mutable accumulator for copy statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    /// See [`ReportCopy::cnt_dirs_created`].
    pub cnt_dirs_created: u64,
    /// See [`ReportCopy::cnt_files_copied`].
    pub cnt_files_copied: u64,
    /// See [`ReportCopy::cnt_symlinks_created`].
    pub cnt_symlinks_created: u64,
    /// See [`ReportCopy::warnings`].
    pub warnings: Vec<String>,
}

impl ReportCopyBuilder {
    /// Increment created-directory count by one.
    pub fn add_dir_created(&mut self) {
        self.cnt_dirs_created += 1;
    }

    /// Increment copied-file count by one.
    pub fn add_file_copied(&mut self) {
        self.cnt_files_copied += 1;
    }

    /// Increment created-symlink count by one.
    pub fn add_symlink_created(&mut self) {
        self.cnt_symlinks_created += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Fold a finished report into this builder.
    pub fn absorb(&mut self, report_copy: ReportCopy) {
        self.cnt_dirs_created += report_copy.cnt_dirs_created;
        self.cnt_files_copied += report_copy.cnt_files_copied;
        self.cnt_symlinks_created += report_copy.cnt_symlinks_created;
        self.warnings.extend(report_copy.warnings);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCopy {
        ReportCopy {
            cnt_dirs_created: self.cnt_dirs_created,
            cnt_files_copied: self.cnt_files_copied,
            cnt_symlinks_created: self.cnt_symlinks_created,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReportCopy, ReportCopyBuilder};

    #[test]
    fn report_copy_to_dict_and_format() {
        let report = ReportCopy {
            cnt_dirs_created: 2,
            cnt_files_copied: 5,
            cnt_symlinks_created: 1,
            warnings: vec!["w".to_string()],
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_dirs_created"], 2);
        assert_eq!(dict_counts["cnt_files_copied"], 5);
        assert_eq!(dict_counts["cnt_symlinks_created"], 1);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[COPY]");
        assert_eq!(txt, "[COPY] dirs=2 files=5 symlinks=1 warnings=1");
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn builder_absorbs_nested_reports() {
        let mut builder_cp_report = ReportCopyBuilder::default();
        builder_cp_report.add_file_copied();
        builder_cp_report.absorb(ReportCopy {
            cnt_dirs_created: 1,
            cnt_files_copied: 3,
            cnt_symlinks_created: 0,
            warnings: vec!["loop".to_string()],
        });

        let report = builder_cp_report.build();
        assert_eq!(report.cnt_dirs_created, 1);
        assert_eq!(report.cnt_files_copied, 4);
        assert_eq!(report.warnings, vec!["loop".to_string()]);
    }
}
