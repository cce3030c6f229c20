//! Raw keystroke line editing.

use crate::sanitize::CRLF;

/// Horizontal tab.
const TAB: u8 = 0x09;

/// Line feed.
const LF: u8 = 0x0a;

/// Carriage return.
const CR: u8 = 0x0d;

/// Delete, sent by terminals for the backspace key.
const DEL: u8 = 0x7f;

/// Erase the character left of the cursor: back, blank, back.
pub const ERASE: &[u8] = b"\x08 \x08";

/// Completed input line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Line {
    /// Line with at least one character.
    Text(String),

    /// Empty line, or the stream closed before a terminator.
    EndOfInput,
}

/// Line buffer fed one byte at a time.
///
/// Bytes are kept as received so multi-byte UTF-8 characters stay together
/// and are erased as a whole.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineEditor {
    buffer: Vec<u8>,
}

impl LineEditor {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes accumulated for the current line.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Is the current line empty?
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard the current line.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Apply one input byte, appending the bytes to send back to the
    /// remote terminal to `echo`.
    ///
    /// Returns the line once the byte completes it.
    pub fn feed(&mut self, byte: u8, echo: &mut Vec<u8>) -> Option<Line> {
        match byte {
            TAB => None,
            CR | LF => {
                echo.extend_from_slice(CRLF.as_bytes());
                Some(self.take())
            }
            DEL => {
                if self.erase() {
                    echo.extend_from_slice(ERASE);
                }
                None
            }
            _ => {
                self.buffer.push(byte);
                echo.push(byte);
                None
            }
        }
    }

    /// Finish the current line as if the stream had closed.
    pub fn finish(&mut self) -> Line {
        self.clear();
        Line::EndOfInput
    }

    /// Take the current line, leaving the editor empty.
    fn take(&mut self) -> Line {
        if self.buffer.is_empty() {
            return Line::EndOfInput;
        }

        let bytes = core::mem::take(&mut self.buffer);
        Line::Text(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Remove the last character. Returns `false` if the line was empty.
    fn erase(&mut self) -> bool {
        let Some(last) = self.buffer.iter().rposition(|&b| !is_continuation(b)) else {
            // empty, or only stray continuation bytes
            return self.buffer.pop().is_some();
        };

        self.buffer.truncate(last);
        true
    }
}

/// Is `byte` a UTF-8 continuation byte (`0b10xx_xxxx`)?
fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}
