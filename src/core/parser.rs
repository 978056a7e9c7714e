use std::fmt;

use crate::config::DEFAULT_MAX_LINE;

/// One input line split into at most two pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub left_args: Vec<String>,
    pub right_args: Vec<String>,
    pub has_pipe: bool,
    pub infile: Option<String>,
    pub outfile: Option<String>,
    pub background: bool,
}

impl ParsedCommand {
    /// Name of the first stage's program.
    pub fn program(&self) -> Option<&str> {
        self.left_args.first().map(String::as_str)
    }

    fn current_side(&mut self) -> &mut Vec<String> {
        if self.has_pipe {
            &mut self.right_args
        } else {
            &mut self.left_args
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    MissingCommand(&'static str),
    TooManyArguments(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::MissingCommand(place) => write!(f, "missing command {}", place),
            ParseError::TooManyArguments(max) => {
                write!(f, "too many arguments (at most {} per command)", max)
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy)]
pub struct CommandParser {
    max_args: usize,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE / 2)
    }
}

impl CommandParser {
    pub fn new(max_args: usize) -> Self {
        Self { max_args }
    }

    /// Splits `line` on whitespace into a [`ParsedCommand`].
    ///
    /// `<` and `>` take the following token as a file name (also accepted
    /// attached, as in `>out.txt`). The first `|` starts the second stage;
    /// any later `|` is an ordinary argument. A final `&` on the last stage
    /// marks the pipeline as background.
    pub fn parse(&self, line: &str) -> Result<ParsedCommand, ParseError> {
        let mut command = ParsedCommand::default();
        let mut tokens = line.split_whitespace();

        while let Some(token) = tokens.next() {
            match token {
                "|" if !command.has_pipe => command.has_pipe = true,
                // A dangling operator is dropped.
                "<" => {
                    if let Some(file) = tokens.next() {
                        command.infile = Some(file.to_string());
                    }
                }
                ">" => {
                    if let Some(file) = tokens.next() {
                        command.outfile = Some(file.to_string());
                    }
                }
                _ => {
                    if let Some(file) = token.strip_prefix('<') {
                        command.infile = Some(file.to_string());
                    } else if let Some(file) = token.strip_prefix('>') {
                        command.outfile = Some(file.to_string());
                    } else {
                        command.current_side().push(token.to_string());
                    }
                }
            }
        }

        let last_side = command.current_side();
        if last_side.last().map(String::as_str) == Some("&") {
            last_side.pop();
            command.background = true;
        }

        self.validate(&command, line)?;
        tracing::debug!(?command, "parsed");
        Ok(command)
    }

    fn validate(&self, command: &ParsedCommand, line: &str) -> Result<(), ParseError> {
        if line.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        if command.left_args.is_empty() {
            return Err(ParseError::MissingCommand(if command.has_pipe {
                "before '|'"
            } else {
                "to run"
            }));
        }
        if command.has_pipe && command.right_args.is_empty() {
            return Err(ParseError::MissingCommand("after '|'"));
        }
        if command.left_args.len() > self.max_args || command.right_args.len() > self.max_args {
            return Err(ParseError::TooManyArguments(self.max_args));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ParsedCommand {
        CommandParser::default().parse(line).unwrap()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_output_redirection() {
        let command = parse("ls -l > out.txt");
        assert_eq!(command.left_args, strings(&["ls", "-l"]));
        assert_eq!(command.outfile.as_deref(), Some("out.txt"));
        assert_eq!(command.infile, None);
        assert!(!command.has_pipe);
        assert!(!command.background);
        assert!(command.right_args.is_empty());
    }

    #[test]
    fn test_pipe_with_input_and_background() {
        let command = parse("sort < in.txt | uniq &");
        assert!(command.has_pipe);
        assert_eq!(command.left_args, strings(&["sort"]));
        assert_eq!(command.infile.as_deref(), Some("in.txt"));
        assert_eq!(command.right_args, strings(&["uniq"]));
        assert!(command.background);
    }

    #[test]
    fn test_whitespace_runs() {
        let command = parse("  echo \t a   b  ");
        assert_eq!(command.left_args, strings(&["echo", "a", "b"]));
        assert_eq!(command.program(), Some("echo"));
    }

    #[test]
    fn test_background_after_redirection_target() {
        let command = parse("sleep 5 > log.txt &");
        assert_eq!(command.left_args, strings(&["sleep", "5"]));
        assert_eq!(command.outfile.as_deref(), Some("log.txt"));
        assert!(command.background);

        let command = parse("sleep 5 & > log.txt");
        assert_eq!(command.left_args, strings(&["sleep", "5"]));
        assert!(command.background);
    }

    #[test]
    fn test_ampersand_only_counts_on_last_stage() {
        let command = parse("yes & | head");
        assert_eq!(command.left_args, strings(&["yes", "&"]));
        assert!(!command.background);
    }

    #[test]
    fn test_attached_ampersand_is_an_argument() {
        let command = parse("echo a&");
        assert_eq!(command.left_args, strings(&["echo", "a&"]));
        assert!(!command.background);
    }

    #[test]
    fn test_second_pipe_is_plain_argument() {
        let command = parse("cat a | grep x | wc");
        assert_eq!(command.left_args, strings(&["cat", "a"]));
        assert_eq!(command.right_args, strings(&["grep", "x", "|", "wc"]));
    }

    #[test]
    fn test_attached_redirections() {
        let command = parse("cat <in.txt >out.txt");
        assert_eq!(command.left_args, strings(&["cat"]));
        assert_eq!(command.infile.as_deref(), Some("in.txt"));
        assert_eq!(command.outfile.as_deref(), Some("out.txt"));
    }

    #[test]
    fn test_dangling_redirection_is_ignored() {
        let command = parse("cat >");
        assert_eq!(command.left_args, strings(&["cat"]));
        assert_eq!(command.outfile, None);
    }

    #[test]
    fn test_redirection_in_right_stage() {
        let command = parse("printf foo | cat > out.txt");
        assert_eq!(command.left_args, strings(&["printf", "foo"]));
        assert_eq!(command.right_args, strings(&["cat"]));
        assert_eq!(command.outfile.as_deref(), Some("out.txt"));
    }

    #[test]
    fn test_errors() {
        let parser = CommandParser::default();
        assert_eq!(parser.parse("   "), Err(ParseError::Empty));
        assert!(matches!(parser.parse("| wc"), Err(ParseError::MissingCommand(_))));
        assert!(matches!(parser.parse("ls |"), Err(ParseError::MissingCommand(_))));
        assert!(matches!(parser.parse("> out.txt"), Err(ParseError::MissingCommand(_))));
        assert!(matches!(parser.parse("&"), Err(ParseError::MissingCommand(_))));
    }

    #[test]
    fn test_argument_limit() {
        let parser = CommandParser::new(3);
        assert!(parser.parse("a b c").is_ok());
        assert_eq!(parser.parse("a b c d"), Err(ParseError::TooManyArguments(3)));
        assert!(parser.parse("a b c | d e f").is_ok());
    }
}
