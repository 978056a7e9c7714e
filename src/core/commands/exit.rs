use super::{Command, CommandError, Flow};

#[derive(Clone)]
pub struct ExitCommand;

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ExitCommand {
    // The loop unwinds normally so the terminal and history are left intact.
    fn execute(&self, _args: &[String]) -> Result<Flow, CommandError> {
        Ok(Flow::Exit)
    }
}
