use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use crate::core::parser::ParsedCommand;

pub mod executor;
pub mod signal;

pub use executor::{Endpoint, Launch, PipelineExecutor, StageIo};

#[derive(Debug)]
pub enum ProcessError {
    /// The OS refused to create a process; the session cannot continue.
    Spawn {
        command: String,
        source: std::io::Error,
    },
    Pipe(std::io::Error),
    Wait(std::io::Error),
    SignalError(String),
}

impl ProcessError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::Spawn { .. } | ProcessError::Pipe(_))
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn { command, source } => {
                write!(f, "cannot create process for {}: {}", command, source)
            }
            ProcessError::Pipe(e) => write!(f, "cannot create pipe: {}", e),
            ProcessError::Wait(e) => write!(f, "wait failed: {}", e),
            ProcessError::SignalError(msg) => write!(f, "Signal error: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}

/// Runs a parsed command line that is not a builtin.
pub trait PipelineRunner {
    fn execute(&self, command: &ParsedCommand) -> Result<Vec<StageOutcome>, ProcessError>;
}

/// Result of one pipeline stage as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Exited(i32),
    Signaled(i32),
    /// Left running; never waited on.
    Background(u32),
    /// The stage could not be started; carries the status a failed child
    /// would have exited with.
    NotStarted(i32),
}

impl StageOutcome {
    pub fn code(&self) -> Option<i32> {
        match self {
            StageOutcome::Exited(code) | StageOutcome::NotStarted(code) => Some(*code),
            StageOutcome::Signaled(signal) => Some(128 + signal),
            StageOutcome::Background(_) => None,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, StageOutcome::Exited(0) | StageOutcome::Background(_))
    }
}

impl From<ExitStatus> for StageOutcome {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => StageOutcome::Exited(code),
            (None, Some(signal)) => StageOutcome::Signaled(signal),
            (None, None) => StageOutcome::Exited(1),
        }
    }
}
