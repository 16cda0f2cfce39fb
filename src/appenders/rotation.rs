//! Rotation policies for file appenders
//!
//! A [`RotationPolicy`] only decides. The [`FileAppender`](super::FileAppender)
//! owns the file, keeps a [`RotationState`] and performs the close / archive /
//! reopen sequence when the policy says so.

use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Datelike, Days, Local, TimeZone, Weekday};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Backups kept when a sink does not configure a count
pub const DEFAULT_BACKUP_COUNT: usize = 5;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Time boundary at which a file is rolled over
///
/// Parsed from the configuration strings
///
/// | input | meaning |
/// |---|---|
/// | `midnight` | every local midnight |
/// | `W0` .. `W6` | local midnight starting the given weekday (Monday = `W0`) |
/// | `S`, `M`, `H`, `D` | one second / minute / hour / day after the file was started |
/// | `30s`, `15m`, `2h`, `7d` | the given interval after the file was started |
///
/// # Examples
///
/// ```
/// use fastlog::appenders::RotationSchedule;
/// use std::time::Duration;
///
/// let schedule: RotationSchedule = "midnight".parse().unwrap();
/// assert_eq!(schedule, RotationSchedule::Midnight);
///
/// let schedule: RotationSchedule = "15m".parse().unwrap();
/// assert_eq!(schedule, RotationSchedule::Every(Duration::from_secs(900)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationSchedule {
    Midnight,
    Weekday(Weekday),
    Every(Duration),
}

impl RotationSchedule {
    /// First rollover instant strictly after `from`
    #[must_use]
    pub fn next_rollover(&self, from: DateTime<Local>) -> DateTime<Local> {
        match self {
            RotationSchedule::Every(interval) => {
                let step = chrono::Duration::from_std(*interval)
                    .unwrap_or_else(|_| chrono::Duration::days(1));
                from + step
            }
            RotationSchedule::Midnight => midnight_after(from, 1),
            RotationSchedule::Weekday(day) => {
                let today = from.weekday().num_days_from_monday();
                let target = day.num_days_from_monday();
                let mut days_ahead = (target + 7 - today) % 7;
                if days_ahead == 0 {
                    days_ahead = 7;
                }
                midnight_after(from, u64::from(days_ahead))
            }
        }
    }

    /// strftime pattern used to name archived files
    ///
    /// Granularity follows the schedule so consecutive periods never share
    /// a name.
    #[must_use]
    pub fn suffix_pattern(&self) -> &'static str {
        match self {
            RotationSchedule::Midnight | RotationSchedule::Weekday(_) => "%Y-%m-%d",
            RotationSchedule::Every(interval) => {
                let secs = interval.as_secs();
                if secs % MINUTE != 0 || secs == 0 {
                    "%Y-%m-%d_%H-%M-%S"
                } else if secs % HOUR != 0 {
                    "%Y-%m-%d_%H-%M"
                } else if secs % DAY != 0 {
                    "%Y-%m-%d_%H"
                } else {
                    "%Y-%m-%d"
                }
            }
        }
    }
}

/// Local midnight `days` days after the date of `from`
fn midnight_after(from: DateTime<Local>, days: u64) -> DateTime<Local> {
    let fallback = from + chrono::Duration::days(days as i64);
    from.date_naive()
        .checked_add_days(Days::new(days))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or(fallback)
}

impl FromStr for RotationSchedule {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let invalid = || {
            LoggerError::config(
                "rotate_schedule",
                format!(
                    "unsupported schedule '{}' (expected midnight, W0-W6, S, M, H, D or <n>s/m/h/d)",
                    s
                ),
            )
        };

        if raw.eq_ignore_ascii_case("midnight") {
            return Ok(RotationSchedule::Midnight);
        }

        match raw.to_ascii_uppercase().as_str() {
            "S" => return Ok(RotationSchedule::Every(Duration::from_secs(1))),
            "M" => return Ok(RotationSchedule::Every(Duration::from_secs(MINUTE))),
            "H" => return Ok(RotationSchedule::Every(Duration::from_secs(HOUR))),
            "D" => return Ok(RotationSchedule::Every(Duration::from_secs(DAY))),
            _ => {}
        }

        if let Some(day) = raw.strip_prefix(['W', 'w']) {
            let day = match day {
                "0" => Weekday::Mon,
                "1" => Weekday::Tue,
                "2" => Weekday::Wed,
                "3" => Weekday::Thu,
                "4" => Weekday::Fri,
                "5" => Weekday::Sat,
                "6" => Weekday::Sun,
                _ => return Err(invalid()),
            };
            return Ok(RotationSchedule::Weekday(day));
        }

        let split = raw.len().checked_sub(1).ok_or_else(invalid)?;
        if !raw.is_char_boundary(split) {
            return Err(invalid());
        }
        let (count, unit) = raw.split_at(split);
        let count: u64 = count.parse().map_err(|_| invalid())?;
        let unit = match unit.to_ascii_lowercase().as_str() {
            "s" => 1,
            "m" => MINUTE,
            "h" => HOUR,
            "d" => DAY,
            _ => return Err(invalid()),
        };
        if count == 0 {
            return Err(invalid());
        }
        count
            .checked_mul(unit)
            .map(|secs| RotationSchedule::Every(Duration::from_secs(secs)))
            .ok_or_else(invalid)
    }
}

impl fmt::Display for RotationSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationSchedule::Midnight => f.write_str("midnight"),
            RotationSchedule::Weekday(day) => write!(f, "W{}", day.num_days_from_monday()),
            RotationSchedule::Every(interval) => write!(f, "{}s", interval.as_secs()),
        }
    }
}

/// When to rotate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationStrategy {
    /// Single append-only file
    #[default]
    Never,

    /// Rotate before a write that would push the file past `max_bytes`
    Size { max_bytes: u64 },

    /// Rotate once an entry's capture time reaches the next boundary
    Schedule(RotationSchedule),
}

impl RotationStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationStrategy::Size { max_bytes }
    }

    #[must_use]
    pub fn schedule(schedule: RotationSchedule) -> Self {
        RotationStrategy::Schedule(schedule)
    }

    #[must_use]
    pub fn never() -> Self {
        RotationStrategy::Never
    }
}

/// Rotation trigger plus backup retention
///
/// # Examples
///
/// ```
/// use fastlog::appenders::{RotationPolicy, RotationSchedule, RotationStrategy};
///
/// // app.log, app.log.1 .. app.log.3
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::size(10 * 1024 * 1024))
///     .with_max_backups(3);
///
/// // app.log, app.log.2025-01-07, ...
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::schedule(RotationSchedule::Midnight))
///     .with_max_backups(7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    pub strategy: RotationStrategy,
    /// Archived files to keep; 0 keeps none (rotation discards the old file)
    pub max_backup_files: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::Never,
            max_backup_files: DEFAULT_BACKUP_COUNT,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    /// Check the configured limits
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a zero byte limit or a zero interval.
    pub fn validate(&self) -> Result<()> {
        match self.strategy {
            RotationStrategy::Size { max_bytes: 0 } => Err(LoggerError::config(
                "rotate_max_bytes",
                "size limit must be greater than zero",
            )),
            RotationStrategy::Schedule(RotationSchedule::Every(interval))
                if interval.is_zero() =>
            {
                Err(LoggerError::config(
                    "rotate_schedule",
                    "interval must be greater than zero",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Initial state for a file that currently holds `current_size` bytes
    /// and was last written at `started`
    #[must_use]
    pub fn start(&self, current_size: u64, started: DateTime<Local>) -> RotationState {
        RotationState {
            current_size,
            period_start: started,
            next_rollover: self.next_rollover(started),
        }
    }

    /// Whether the write of `pending` bytes captured at `at` must go to a
    /// fresh file
    #[must_use]
    pub fn should_rotate(&self, state: &RotationState, pending: u64, at: DateTime<Local>) -> bool {
        match self.strategy {
            RotationStrategy::Never => false,
            // An empty file always takes the line, even an oversized one
            RotationStrategy::Size { max_bytes } => {
                state.current_size > 0 && state.current_size.saturating_add(pending) > max_bytes
            }
            RotationStrategy::Schedule(_) => state.next_rollover.is_some_and(|next| at >= next),
        }
    }

    /// Name suffix for the archive of the period `state` describes
    #[must_use]
    pub fn archive_suffix(&self, state: &RotationState) -> Option<String> {
        match self.strategy {
            RotationStrategy::Schedule(schedule) => {
                Some(state.period_start.format(schedule.suffix_pattern()).to_string())
            }
            _ => None,
        }
    }

    /// Whether `suffix` looks like an archive suffix this policy produces
    #[must_use]
    pub fn is_archive_suffix(&self, suffix: &str) -> bool {
        let RotationStrategy::Schedule(schedule) = self.strategy else {
            return false;
        };
        let sample = Local::now().format(schedule.suffix_pattern()).to_string();
        suffix.len() == sample.len()
            && suffix.chars().zip(sample.chars()).all(|(got, want)| {
                if want.is_ascii_digit() {
                    got.is_ascii_digit()
                } else {
                    got == want
                }
            })
    }

    /// State after a successful rotation at `at`
    #[must_use]
    pub fn rotated(&self, at: DateTime<Local>) -> RotationState {
        self.start(0, at)
    }

    /// Push the next attempt out after a failed rotation so every following
    /// write does not retry immediately
    pub fn defer(&self, state: &mut RotationState, at: DateTime<Local>) {
        match self.strategy {
            RotationStrategy::Size { .. } => state.current_size = 0,
            RotationStrategy::Schedule(_) => state.next_rollover = self.next_rollover(at),
            RotationStrategy::Never => {}
        }
    }

    fn next_rollover(&self, from: DateTime<Local>) -> Option<DateTime<Local>> {
        match self.strategy {
            RotationStrategy::Schedule(schedule) => Some(schedule.next_rollover(from)),
            _ => None,
        }
    }
}

/// Mutable rotation counters of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    pub current_size: u64,
    /// Start of the period the current file covers
    pub period_start: DateTime<Local>,
    pub next_rollover: Option<DateTime<Local>>,
}

impl RotationState {
    pub fn record_write(&mut self, bytes: u64) {
        self.current_size = self.current_size.saturating_add(bytes);
    }
}
