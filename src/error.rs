use crate::core::parser::ParseError;
use crate::process::ProcessError;

#[derive(Debug)]
pub enum ShellError {
    HomeDirNotFound,
    ProcessError(ProcessError),
    ParseError(ParseError),
    FlagError(String),
}

impl From<ProcessError> for ShellError {
    fn from(err: ProcessError) -> Self {
        ShellError::ProcessError(err)
    }
}

impl From<ParseError> for ShellError {
    fn from(err: ParseError) -> Self {
        ShellError::ParseError(err)
    }
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::HomeDirNotFound => write!(f, "Home directory not found"),
            ShellError::ProcessError(e) => write!(f, "Process error: {}", e),
            ShellError::ParseError(e) => write!(f, "syntax error: {}", e),
            ShellError::FlagError(msg) => write!(f, "Flag error: {}", msg),
        }
    }
}

impl std::error::Error for ShellError {}
