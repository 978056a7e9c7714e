use std::fmt;
use std::io::{self, ErrorKind, Read, Stdout, Write};
use std::os::fd::RawFd;

use super::history::HistoryStack;
use super::keys::{Key, KeyReader};
use super::terminal::{FdReader, RawMode};

/// Literal input replaced by the most recent history entry.
pub const RECALL_TOKEN: &str = "!!";

const CLEAR_LINE: &str = "\r\x1b[2K";

/// Line contents for one read. The cursor always sits at the end.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    chars: Vec<char>,
    max_len: usize,
}

impl EditBuffer {
    pub fn new(max_len: usize) -> Self {
        EditBuffer {
            chars: Vec::with_capacity(max_len),
            max_len,
        }
    }

    /// Appends `c` unless the buffer is full.
    pub fn push(&mut self, c: char) -> bool {
        if self.is_full() {
            return false;
        }
        self.chars.push(c);
        true
    }

    pub fn pop(&mut self) -> Option<char> {
        self.chars.pop()
    }

    pub fn replace(&mut self, line: &str) {
        self.chars.clear();
        self.chars.extend(line.chars().take(self.max_len));
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.chars.len() >= self.max_len
    }
}

impl fmt::Display for EditBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorState {
    Reading,
    Editing,
    Submitted,
    Cancelled,
}

/// Character-at-a-time line editor with history recall.
pub struct LineEditor<R, W> {
    keys: KeyReader<R>,
    out: W,
    buffer: EditBuffer,
    // Distance from the top of history of the entry on display.
    recall: Option<usize>,
    tty: Option<RawFd>,
}

impl LineEditor<FdReader, Stdout> {
    /// Editor over the process's stdin/stdout, switching stdin to raw mode
    /// while a line is being read. Stdin is read without buffering so that
    /// input past the current line is left for the commands it runs.
    pub fn stdio(max_len: usize) -> Self {
        let stdin = FdReader::stdin();
        let mut editor = LineEditor::new(stdin, io::stdout(), max_len);
        editor.tty = Some(stdin.fd());
        editor
    }
}

impl<R: Read, W: Write> LineEditor<R, W> {
    pub fn new(input: R, out: W, max_len: usize) -> Self {
        LineEditor {
            keys: KeyReader::new(input),
            out,
            buffer: EditBuffer::new(max_len),
            recall: None,
            tty: None,
        }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.out
    }

    /// Reads one line. `Ok(None)` means input is exhausted.
    pub fn read_line(&mut self, prompt: &str, history: &HistoryStack) -> io::Result<Option<String>> {
        self.buffer.clear();
        self.recall = None;

        let _raw = match self.tty {
            Some(fd) => RawMode::enable(fd)?,
            None => None,
        };

        self.render(prompt)?;
        let mut state = EditorState::Reading;
        while matches!(state, EditorState::Reading | EditorState::Editing) {
            let key = match self.keys.next_key() {
                Ok(Some(key)) => key,
                Ok(None) if self.buffer.is_empty() => {
                    state = EditorState::Cancelled;
                    continue;
                }
                // Unterminated final line.
                Ok(None) => Key::Enter,
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    self.render(prompt)?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            state = self.handle_key(key, prompt, history)?;
        }

        match state {
            EditorState::Submitted => self.submit(history).map(Some),
            _ => {
                writeln!(self.out)?;
                self.out.flush()?;
                Ok(None)
            }
        }
    }

    fn handle_key(
        &mut self,
        key: Key,
        prompt: &str,
        history: &HistoryStack,
    ) -> io::Result<EditorState> {
        match key {
            Key::Char(c) => {
                if self.buffer.push(c) {
                    self.render(prompt)?;
                }
            }
            Key::Backspace => {
                if self.buffer.pop().is_some() {
                    self.render(prompt)?;
                }
            }
            Key::Up => {
                if self.recall_older(history) {
                    self.render(prompt)?;
                }
            }
            Key::Down => {
                if self.recall_newer(history) {
                    self.render(prompt)?;
                }
            }
            Key::Enter => return Ok(EditorState::Submitted),
            Key::Interrupt => {
                write!(self.out, "^C\r\n")?;
                self.buffer.clear();
                self.recall = None;
                self.render(prompt)?;
                return Ok(EditorState::Reading);
            }
            Key::EndOfTransmission if self.buffer.is_empty() => {
                return Ok(EditorState::Cancelled)
            }
            Key::EndOfTransmission | Key::Ignored => {}
        }

        Ok(if self.buffer.is_empty() {
            EditorState::Reading
        } else {
            EditorState::Editing
        })
    }

    fn recall_older(&mut self, history: &HistoryStack) -> bool {
        if history.is_empty() {
            return false;
        }
        let distance = self
            .recall
            .map_or(0, |d| (d + 1).min(history.len() - 1));
        self.show_entry(history, distance)
    }

    fn recall_newer(&mut self, history: &HistoryStack) -> bool {
        match self.recall {
            None => false,
            Some(0) => {
                self.recall = None;
                self.buffer.clear();
                true
            }
            Some(d) => self.show_entry(history, d - 1),
        }
    }

    fn show_entry(&mut self, history: &HistoryStack, distance: usize) -> bool {
        match history.recall(distance) {
            Some(entry) => {
                self.buffer.replace(entry);
                self.recall = Some(distance);
                true
            }
            None => false,
        }
    }

    fn submit(&mut self, history: &HistoryStack) -> io::Result<String> {
        writeln!(self.out)?;

        let mut line = self.buffer.to_string();
        if line == RECALL_TOKEN {
            line = match history.peek() {
                Some(entry) => {
                    writeln!(self.out, "{}", entry)?;
                    entry.to_owned()
                }
                None => {
                    writeln!(self.out, "no recent commands")?;
                    String::new()
                }
            };
        }

        self.out.flush()?;
        Ok(line)
    }

    fn render(&mut self, prompt: &str) -> io::Result<()> {
        write!(self.out, "{}{}{}", CLEAR_LINE, prompt, self.buffer)?;
        self.out.flush()
    }
}
