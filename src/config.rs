use crate::error::ShellError;
use crate::flags::Flags;

pub const DEFAULT_MAX_LINE: usize = 80;
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Runtime settings for one shell session, derived from the command line.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub prompt_name: String,
    pub max_line: usize,
    pub history_capacity: usize,
    pub quiet: bool,
    pub debug: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            prompt_name: "osh".to_string(),
            max_line: DEFAULT_MAX_LINE,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            quiet: false,
            debug: false,
        }
    }
}

impl ShellConfig {
    pub fn from_flags(flags: &Flags) -> Result<Self, ShellError> {
        let mut config = ShellConfig {
            quiet: flags.is_set("quiet"),
            debug: flags.is_set("debug"),
            ..ShellConfig::default()
        };

        if let Some(value) = flags.get_value("history-size") {
            config.history_capacity = parse_positive("history-size", value)?;
        }
        if let Some(value) = flags.get_value("max-line") {
            // Room for at least a command and one argument.
            config.max_line = parse_positive("max-line", value)?.max(2);
        }

        Ok(config)
    }

    /// Upper bound on tokens per pipeline stage.
    pub fn max_args(&self) -> usize {
        self.max_line / 2
    }
}

fn parse_positive(name: &str, value: &str) -> Result<usize, ShellError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ShellError::FlagError(format!(
            "--{} expects a positive number, got '{}'",
            name, value
        ))),
    }
}
