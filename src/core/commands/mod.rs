use std::collections::BTreeMap;
use std::path::PathBuf;

mod cd;
mod exit;

pub use cd::CdCommand;
pub use exit::ExitCommand;

#[derive(Debug)]
pub enum CommandError {
    NotFound(String),
    NoSuchDirectory(PathBuf),
    ExecutionError(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::NotFound(cmd) => write!(f, "not a builtin: {}", cmd),
            CommandError::NoSuchDirectory(path) => {
                write!(f, "cd: {}: No such file or directory", path.display())
            }
            CommandError::ExecutionError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CommandError {}

/// What the shell loop does after a builtin ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub trait Command {
    fn execute(&self, args: &[String]) -> Result<Flow, CommandError>;
}

#[derive(Clone)]
enum CommandType {
    Cd(CdCommand),
    Exit(ExitCommand),
}

impl Command for CommandType {
    fn execute(&self, args: &[String]) -> Result<Flow, CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(args),
            CommandType::Exit(cmd) => cmd.execute(args),
        }
    }
}

/// Commands the shell runs in its own process instead of spawning.
#[derive(Clone)]
pub struct Builtins {
    commands: BTreeMap<String, CommandType>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd".to_string(), CommandType::Cd(CdCommand::new()));
        commands.insert("exit".to_string(), CommandType::Exit(ExitCommand::new()));
        Self { commands }
    }

    pub fn execute(&self, command: &str, args: &[String]) -> Result<Flow, CommandError> {
        self.commands
            .get(command)
            .ok_or_else(|| CommandError::NotFound(command.to_string()))?
            .execute(args)
    }

    pub fn is_builtin(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }
}
