use super::{Command, CommandError, Flow};
use crate::path::PathExpander;
use std::env;
use std::io::ErrorKind;

#[derive(Clone)]
pub struct CdCommand {
    path_expander: PathExpander,
}

impl Default for CdCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CdCommand {
    pub fn new() -> Self {
        Self {
            path_expander: PathExpander::new(),
        }
    }
}

impl Command for CdCommand {
    fn execute(&self, args: &[String]) -> Result<Flow, CommandError> {
        let path_str = args.first().map(|s| s.as_str()).unwrap_or("~");
        let expanded_path = self
            .path_expander
            .expand(path_str)
            .map_err(|e| CommandError::ExecutionError(format!("cd: {}", e)))?;

        env::set_current_dir(&expanded_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CommandError::NoSuchDirectory(expanded_path.clone()),
            _ => CommandError::ExecutionError(format!(
                "cd: {}: {}",
                expanded_path.display(),
                e
            )),
        })?;

        tracing::debug!(dir = %expanded_path.display(), "changed directory");
        Ok(Flow::Continue)
    }
}
