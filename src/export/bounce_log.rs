//! Hourly bounce log: one JSON record per line, one file per local hour.
//!
//! Files are named `YYYYMMDD-HH.log`, opened append-only and created with
//! restrictive permissions (owner read/write, group read by default).

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::config::SinkConfig;
use crate::error::{BounceError, Result};
use crate::model::report::DeliveryReport;

/// Directory permissions applied when the log directory is created.
#[cfg(unix)]
const DIR_MODE: u32 = 0o750;

/// Appends bounce records to hour-bucketed files in one directory.
#[derive(Debug, Clone)]
pub struct BounceLog {
    dir: PathBuf,
    file_mode: u32,
}

impl BounceLog {
    /// Create a sink writing into `dir` with the given file mode (Unix only).
    pub fn new(dir: impl Into<PathBuf>, file_mode: u32) -> Self {
        Self {
            dir: dir.into(),
            file_mode,
        }
    }

    /// Create a sink from the `[sink]` configuration section.
    pub fn from_config(config: &SinkConfig) -> Self {
        Self::new(config.log_dir(), config.file_mode)
    }

    /// Directory the log files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of the hour bucket containing `at`.
    pub fn file_name_for(at: &DateTime<Local>) -> String {
        format!("{}.log", at.format("%Y%m%d-%H"))
    }

    /// Full path of the hour bucket containing `at`.
    pub fn path_for(&self, at: &DateTime<Local>) -> PathBuf {
        self.dir.join(Self::file_name_for(at))
    }

    /// Append `report` as one line to the bucket for `at` and return its path.
    ///
    /// The line is written with a single `write_all` on an `O_APPEND` handle so
    /// concurrent writers never interleave partial records.
    pub fn append(&self, report: &DeliveryReport, at: &DateTime<Local>) -> Result<PathBuf> {
        let mut line = report.to_log_line()?;
        line.push('\n');

        create_log_dir(&self.dir)?;
        let path = self.path_for(at);
        let mut file =
            open_for_append(&path, self.file_mode).map_err(|e| BounceError::io(&path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| BounceError::io(&path, e))?;

        info!(
            path = %path.display(),
            email = ?report.email,
            status = ?report.status,
            "Logged bounce"
        );
        Ok(path)
    }
}

/// Create the log directory (and parents). On Unix, new directories get [`DIR_MODE`].
fn create_log_dir(dir: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir).map_err(|e| BounceError::io(dir, e))
}

/// Open a log file for appending. On Unix, a new file is created with `mode`.
fn open_for_append(path: &Path, mode: u32) -> std::io::Result<File> {
    let mut options = std::fs::OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)
}
