pub mod commands;
pub mod parser;

pub use commands::{Builtins, CommandError, Flow};
pub use parser::{CommandParser, ParseError, ParsedCommand};
