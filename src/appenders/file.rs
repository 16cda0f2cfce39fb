//! File appender with optional rotation
//!
//! Layout on disk depends on the [`RotationPolicy`]:
//! - never: `app.log`, append-only
//! - size: `app.log`, `app.log.1` .. `app.log.N` (`.1` is the newest)
//! - schedule: `app.log`, `app.log.<period start>` (newest N kept)

use super::rotation::{RotationPolicy, RotationState, RotationStrategy};
use crate::core::appender::Appender;
use crate::core::error::{stderr_error_handler, ErrorHandler, LoggerError, Result};
use crate::core::log_entry::LogEntry;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends rendered lines to a file, rotating it per its policy
///
/// A failed rotation never loses the line being written: the appender keeps
/// (or reopens) the current file, reports the failure through its error
/// handler and writes there.
///
/// # Examples
///
/// ```no_run
/// use fastlog::appenders::{FileAppender, RotationPolicy, RotationStrategy};
///
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::size(10 * 1024 * 1024))
///     .with_max_backups(3);
/// let appender = FileAppender::with_policy("/var/log/app.log", policy).unwrap();
/// ```
pub struct FileAppender {
    path: PathBuf,
    name: String,
    policy: RotationPolicy,
    state: RotationState,
    writer: Option<BufWriter<File>>,
    on_error: ErrorHandler,
}

impl FileAppender {
    /// Create an append-only file appender
    ///
    /// # Errors
    ///
    /// Returns error if the parent directory or the file cannot be created
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Create a file appender with a rotation policy
    ///
    /// # Errors
    ///
    /// Returns error if the policy is invalid, or if the parent directory or
    /// the file cannot be created
    pub fn with_policy(path: impl AsRef<Path>, policy: RotationPolicy) -> Result<Self> {
        policy.validate()?;
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, size, modified) = Self::open_append(&path).map_err(|e| {
            LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
        })?;

        // A non-empty file belongs to the period in which it was last written
        let started = if size > 0 { modified } else { Local::now() };

        Ok(Self {
            name: format!("file:{}", path.display()),
            state: policy.start(size, started),
            path,
            policy,
            writer: Some(BufWriter::new(file)),
            on_error: stderr_error_handler(),
        })
    }

    /// Route rotation failures to `handler` instead of stderr
    #[must_use]
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.on_error = handler;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the active file (including what it held at open)
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.current_size
    }

    #[must_use]
    pub fn next_rollover(&self) -> Option<DateTime<Local>> {
        self.state.next_rollover
    }

    fn open_append(path: &Path) -> std::io::Result<(File, u64, DateTime<Local>)> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let metadata = file.metadata()?;
        let modified = metadata
            .modified()
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());
        Ok((file, metadata.len(), modified))
    }

    fn rotation_error(&self, message: String) -> LoggerError {
        LoggerError::file_rotation(self.path.display().to_string(), message)
    }

    /// Close, archive and reopen the active file
    fn rotate(&mut self, at: DateTime<Local>) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| self.rotation_error(format!("Failed to flush before rotation: {}", e)))?;
        }

        match self.policy.strategy {
            RotationStrategy::Size { .. } => self.shift_numbered_backups()?,
            RotationStrategy::Schedule(_) => self.archive_period()?,
            RotationStrategy::Never => return Ok(()),
        }

        let (file, _, _) = Self::open_append(&self.path)
            .map_err(|e| self.rotation_error(format!("Failed to create new log file: {}", e)))?;
        self.writer = Some(BufWriter::new(file));
        self.state = self.policy.rotated(at);
        Ok(())
    }

    /// `path.(N-1) -> path.N` .. `path -> path.1`, dropping the oldest
    fn shift_numbered_backups(&self) -> Result<()> {
        let count = self.policy.max_backup_files;
        if count == 0 {
            return fs::remove_file(&self.path)
                .map_err(|e| self.rotation_error(format!("Failed to discard log file: {}", e)));
        }

        let oldest = self.numbered_path(count);
        if oldest.exists() {
            fs::remove_file(&oldest).map_err(|e| {
                self.rotation_error(format!(
                    "Failed to remove oldest backup {}: {}",
                    oldest.display(),
                    e
                ))
            })?;
        }

        for i in (1..count).rev() {
            let from = self.numbered_path(i);
            if from.exists() {
                let to = self.numbered_path(i + 1);
                fs::rename(&from, &to).map_err(|e| {
                    self.rotation_error(format!("Failed to rotate backup {}: {}", from.display(), e))
                })?;
            }
        }

        fs::rename(&self.path, self.numbered_path(1))
            .map_err(|e| self.rotation_error(format!("Failed to rotate current log file: {}", e)))
    }

    /// `path -> path.<period start>`, then prune archives beyond the count
    fn archive_period(&self) -> Result<()> {
        let suffix = self
            .policy
            .archive_suffix(&self.state)
            .ok_or_else(|| self.rotation_error("schedule has no archive name".to_string()))?;
        let target = self.sibling(&suffix);

        if target.exists() {
            fs::remove_file(&target).map_err(|e| {
                self.rotation_error(format!("Failed to replace archive {}: {}", target.display(), e))
            })?;
        }
        fs::rename(&self.path, &target)
            .map_err(|e| self.rotation_error(format!("Failed to archive log file: {}", e)))?;

        self.prune_archives()
    }

    fn prune_archives(&self) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let prefix = format!("{}.", self.file_name());

        let entries = fs::read_dir(&dir)
            .map_err(|e| self.rotation_error(format!("Failed to list {}: {}", dir.display(), e)))?;
        let mut archives: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix(&prefix))
                    .is_some_and(|suffix| self.policy.is_archive_suffix(suffix))
            })
            .map(|entry| entry.path())
            .collect();

        if archives.len() <= self.policy.max_backup_files {
            return Ok(());
        }

        // Suffixes are zero-padded timestamps, so name order is age order
        archives.sort();
        let excess = archives.len() - self.policy.max_backup_files;
        for old in &archives[..excess] {
            fs::remove_file(old).map_err(|e| {
                self.rotation_error(format!("Failed to remove old archive {}: {}", old.display(), e))
            })?;
        }
        Ok(())
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log")
            .to_string()
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut path = self.path.clone();
        path.set_file_name(format!("{}.{}", self.file_name(), suffix));
        path
    }

    fn numbered_path(&self, index: usize) -> PathBuf {
        self.sibling(&index.to_string())
    }

    /// Keep writing to the current file after a failed rotation
    fn recover(&mut self, at: DateTime<Local>, cause: LoggerError) -> Result<()> {
        (self.on_error)(&cause);

        if self.writer.is_none() {
            let (file, size, _) = Self::open_append(&self.path).map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to reopen after rotation failure: {}", e),
                )
            })?;
            self.writer = Some(BufWriter::new(file));
            self.state.current_size = size;
        }

        self.policy.defer(&mut self.state, at);
        Ok(())
    }
}

impl Appender for FileAppender {
    fn write(&mut self, entry: &LogEntry, rendered: &str) -> Result<()> {
        let pending = rendered.len() as u64 + 1;

        if self.policy.should_rotate(&self.state, pending, entry.timestamp) {
            if let Err(e) = self.rotate(entry.timestamp) {
                self.recover(entry.timestamp, e)?;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;

        writer
            .write_all(rendered.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            })?;
        self.state.record_write(pending);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
