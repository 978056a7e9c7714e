use std::env;
use std::io::{Read, Stdout, Write};
use std::path::Path;

mod executor;

use crate::{
    config::ShellConfig,
    core::{commands::Builtins, parser::CommandParser, Flow},
    error::ShellError,
    highlight::SyntaxHighlighter,
    input::{FdReader, HistoryStack, LineEditor},
    process::{PipelineExecutor, PipelineRunner},
};

use executor::CommandHandler;

pub struct Shell<R = FdReader, W = Stdout> {
    pub(crate) editor: LineEditor<R, W>,
    pub(crate) history: HistoryStack,
    pub(crate) parser: CommandParser,
    pub(crate) builtins: Builtins,
    pub(crate) runner: Box<dyn PipelineRunner>,
    pub(crate) config: ShellConfig,
    pub(crate) highlighter: SyntaxHighlighter,
}

impl Shell {
    /// Interactive shell on the process's own terminal.
    pub fn new(config: ShellConfig) -> Self {
        let editor = LineEditor::stdio(config.max_line);
        Shell::with_editor(editor, config)
    }
}

impl<R: Read, W: Write> Shell<R, W> {
    pub fn with_editor(editor: LineEditor<R, W>, config: ShellConfig) -> Self {
        Shell {
            editor,
            history: HistoryStack::new(config.history_capacity),
            parser: CommandParser::new(config.max_args()),
            builtins: Builtins::new(),
            runner: Box::new(PipelineExecutor::new(&config)),
            config,
            highlighter: SyntaxHighlighter::new(),
        }
    }

    /// Replaces what runs non-builtin command lines.
    pub fn with_runner(mut self, runner: Box<dyn PipelineRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Runs until `exit`, end of input, or a fatal process-creation error.
    pub fn run(&mut self) -> Result<(), ShellError> {
        while self.step()? == Flow::Continue {}
        tracing::debug!("shell loop finished");
        Ok(())
    }

    /// One prompt/read/execute iteration.
    pub fn step(&mut self) -> Result<Flow, ShellError> {
        let prompt = self.prompt();
        match self.editor.read_line(&prompt, &self.history) {
            Ok(Some(line)) => self.execute_line(&line),
            Ok(None) => Ok(Flow::Exit),
            Err(e) => {
                self.report_error(&format!("osh: cannot read input: {}", e));
                Ok(Flow::Continue)
            }
        }
    }

    pub fn prompt(&self) -> String {
        match env::current_dir() {
            Ok(dir) => prompt_for(&self.config.prompt_name, &dir),
            Err(_) => format!("{}:?> ", self.config.prompt_name),
        }
    }

    pub(crate) fn report_error(&self, message: &str) {
        eprintln!("{}", self.highlighter.highlight_error(message));
    }
}

/// `name:<basename>> `, with `/` standing in for the root directory.
pub fn prompt_for(name: &str, dir: &Path) -> String {
    let base = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string());
    format!("{}:{}> ", name, base)
}
