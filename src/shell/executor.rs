use std::io::{Read, Write};

use crate::core::Flow;
use crate::error::ShellError;

pub(crate) trait CommandHandler {
    fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError>;
}

impl<R: Read, W: Write> CommandHandler for super::Shell<R, W> {
    fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let Some(first) = line.split_whitespace().next() else {
            return Ok(Flow::Continue);
        };

        // `exit` never reaches history.
        if first == "exit" {
            return match self.builtins.execute(first, &[]) {
                Ok(flow) => Ok(flow),
                Err(e) => {
                    self.report_error(&format!("osh: {}", e));
                    Ok(Flow::Continue)
                }
            };
        }

        self.history.push(line);

        let command = match self.parser.parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.report_error(&format!("osh: {}", ShellError::from(e)));
                return Ok(Flow::Continue);
            }
        };

        if let Some(program) = command.program().filter(|p| self.builtins.is_builtin(p)) {
            return match self.builtins.execute(program, &command.left_args[1..]) {
                Ok(flow) => Ok(flow),
                Err(e) => {
                    self.report_error(&e.to_string());
                    Ok(Flow::Continue)
                }
            };
        }

        match self.runner.execute(&command) {
            Ok(outcomes) => {
                tracing::debug!(?outcomes, background = command.background, "pipeline done");
                Ok(Flow::Continue)
            }
            Err(e) => {
                self.report_error(&format!("osh: {}", e));
                if e.is_fatal() {
                    return Err(e.into());
                }
                Ok(Flow::Continue)
            }
        }
    }
}
