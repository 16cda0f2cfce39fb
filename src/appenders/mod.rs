//! Appender implementations

pub mod console;
pub mod file;
pub mod rotation;

pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use rotation::{
    RotationPolicy, RotationSchedule, RotationState, RotationStrategy, DEFAULT_BACKUP_COUNT,
};

pub use crate::core::Appender;
