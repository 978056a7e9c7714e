pub mod config;
pub mod error;
pub mod flags;
pub mod logging;
pub mod shell;

pub mod core;
pub mod highlight;
pub mod input;
pub mod path;
pub mod process;

/// Tests that touch the process-wide working directory hold this lock.
#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
