use super::model::RunReport;
use super::workbook;
use crate::Result;
use crate::config::RetryPolicy;
use crate::error::ReportError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

/// One report file on disk.
pub struct ReportStore {
    file_path: PathBuf,
}

impl ReportStore {
    pub fn new_with_path(path: PathBuf) -> Self {
        Self { file_path: path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }

    /// Ensure directory exists
    pub fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Parse the report currently on disk.
    pub fn read(&self) -> Result<RunReport> {
        if !self.file_path.exists() {
            return Err(ReportError::Storage(format!(
                "{} does not exist",
                self.file_path.display()
            )));
        }
        workbook::read(&self.file_path)
    }

    /// Replace the report on disk.
    ///
    /// # Atomicity
    /// The workbook is rendered in memory, written to a temp file in the same
    /// directory, synced, then renamed over the target. Readers see either the
    /// previous document or the new one, never a partial file.
    pub fn write(&self, report: &RunReport) -> Result<()> {
        let bytes = workbook::render(report)?;
        self.ensure_dir()?;

        let dir = match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.file_path)?;

        Ok(())
    }

    /// [`ReportStore::write`] with a bounded number of attempts.
    ///
    /// Encoding errors are not retried; only storage failures are (file locked
    /// by a spreadsheet viewer, antivirus scan, ...).
    pub async fn write_with_retry(&self, report: &RunReport, policy: RetryPolicy) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.write(report) {
                Ok(()) => return Ok(()),
                Err(ReportError::Storage(msg)) if attempt < policy.attempts => {
                    warn!(
                        "Write to {} failed (attempt {}/{}): {}",
                        self.file_path.display(),
                        attempt,
                        policy.attempts,
                        msg
                    );
                    attempt += 1;
                    tokio::time::sleep(policy.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
