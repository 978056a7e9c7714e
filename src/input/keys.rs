use std::io::{self, Read};

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Up,
    Down,
    Enter,
    Interrupt,
    EndOfTransmission,
    /// Anything the editor does not act on: other control bytes, unknown
    /// escape sequences, invalid UTF-8.
    Ignored,
}

/// Decodes keystrokes from a raw byte stream.
pub struct KeyReader<R> {
    input: R,
}

impl<R: Read> KeyReader<R> {
    pub fn new(input: R) -> Self {
        KeyReader { input }
    }

    /// Next key, or `None` at end of input.
    pub fn next_key(&mut self) -> io::Result<Option<Key>> {
        let Some(byte) = self.next_byte()? else {
            return Ok(None);
        };

        let key = match byte {
            b'\r' | b'\n' => Key::Enter,
            BACKSPACE | DELETE => Key::Backspace,
            CTRL_C => Key::Interrupt,
            CTRL_D => Key::EndOfTransmission,
            ESC => self.escape_sequence()?,
            0x20..=0x7e => Key::Char(byte as char),
            0x80..=0xff => self.utf8_char(byte)?,
            _ => Key::Ignored,
        };
        Ok(Some(key))
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.input.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    // CSI (`ESC [`) and SS3 (`ESC O`) forms both carry arrow keys.
    fn escape_sequence(&mut self) -> io::Result<Key> {
        match self.next_byte()? {
            Some(b'[') => {
                let mut last = None;
                while let Some(byte) = self.next_byte()? {
                    last = Some(byte);
                    if (0x40..=0x7e).contains(&byte) {
                        break;
                    }
                }
                Ok(arrow(last))
            }
            Some(b'O') => Ok(arrow(self.next_byte()?)),
            _ => Ok(Key::Ignored),
        }
    }

    fn utf8_char(&mut self, lead: u8) -> io::Result<Key> {
        let width = match lead {
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Ok(Key::Ignored),
        };

        let mut bytes = vec![lead];
        for _ in 1..width {
            match self.next_byte()? {
                Some(byte) => bytes.push(byte),
                None => return Ok(Key::Ignored),
            }
        }

        Ok(std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .filter(|c| !c.is_control())
            .map_or(Key::Ignored, Key::Char))
    }
}

fn arrow(final_byte: Option<u8>) -> Key {
    match final_byte {
        Some(b'A') => Key::Up,
        Some(b'B') => Key::Down,
        _ => Key::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(input: &[u8]) -> Vec<Key> {
        let mut reader = KeyReader::new(input);
        let mut keys = Vec::new();
        while let Some(key) = reader.next_key().unwrap() {
            keys.push(key);
        }
        keys
    }

    #[test]
    fn test_printable_and_enter() {
        assert_eq!(
            keys(b"ls\n"),
            vec![Key::Char('l'), Key::Char('s'), Key::Enter]
        );
        assert_eq!(keys(b"\r"), vec![Key::Enter]);
    }

    #[test]
    fn test_backspace_variants() {
        assert_eq!(keys(&[0x7f, 0x08]), vec![Key::Backspace, Key::Backspace]);
    }

    #[test]
    fn test_arrows() {
        assert_eq!(keys(b"\x1b[A\x1b[B"), vec![Key::Up, Key::Down]);
        assert_eq!(keys(b"\x1bOA\x1bOB"), vec![Key::Up, Key::Down]);
    }

    #[test]
    fn test_other_sequences_are_ignored() {
        // Right arrow, then Delete (`ESC [ 3 ~`), then a plain char.
        assert_eq!(
            keys(b"\x1b[C\x1b[3~x"),
            vec![Key::Ignored, Key::Ignored, Key::Char('x')]
        );
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(
            keys(&[0x03, 0x04, 0x01]),
            vec![Key::Interrupt, Key::EndOfTransmission, Key::Ignored]
        );
    }

    #[test]
    fn test_utf8() {
        assert_eq!(keys("é🦀".as_bytes()), vec![Key::Char('é'), Key::Char('🦀')]);
        assert_eq!(keys(&[0xc3]), vec![Key::Ignored]);
    }
}
