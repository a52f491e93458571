//! Key decoding
//!
//! Translates the raw byte stream from a raw-mode terminal into logical key
//! events. Special keys arrive as multi-byte escape sequences (`ESC [ A` for
//! arrow-up, `ESC [ 3 ~` for delete, and so on); the decoder is an explicit
//! state machine over single-byte reads so partial sequences and timeouts can
//! be exercised with an in-memory reader.
//!
//! A read that returns zero bytes is the timeout signal (stdin configured
//! with `VMIN = 0` / `VTIME = 1`). A timeout in the middle of a sequence
//! means the user pressed the ESC key itself; the decoder degrades to
//! [`Key::Escape`] rather than blocking or erroring.

use std::io::{self, ErrorKind, Read};

/// Mask a byte down to its control code (what the terminal sends for
/// Ctrl plus that key).
pub const fn ctrl(byte: u8) -> u8 {
    byte & 0x1f
}

/// A decoded key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable or control byte delivered as-is
    Char(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    /// A bare ESC keypress, or an unrecognized/truncated sequence
    Escape,
}

/// Decoder state while inside an escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// ESC consumed, next byte selects the sequence family
    EscapeSeen,
    /// `ESC [` consumed
    BracketSeen,
    /// `ESC [ <digit>` consumed, expecting the `~` terminator
    DigitSeen(u8),
    /// `ESC O` consumed (application-mode Home/End)
    OSeen,
}

/// Pull-based key decoder over any byte source.
#[derive(Debug)]
pub struct KeyDecoder<R> {
    source: R,
}

impl<R: Read> KeyDecoder<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Block until the next logical key, retrying idle timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error only when the underlying read fails for a reason
    /// other than an interrupted system call.
    pub fn read_key(&mut self) -> io::Result<Key> {
        let byte = loop {
            if let Some(byte) = self.read_byte()? {
                break byte;
            }
        };

        if byte == 0x1b {
            self.decode_escape()
        } else {
            Ok(Key::Char(byte))
        }
    }

    /// Read one byte; `None` means the read timed out with no input.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.source.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                // Interrupted reads are retried silently.
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Run the sequence state machine after a leading ESC byte.
    ///
    /// Any short read degrades to a literal [`Key::Escape`]; the decoder
    /// never blocks past one read timeout inside a sequence.
    fn decode_escape(&mut self) -> io::Result<Key> {
        let mut state = State::EscapeSeen;
        loop {
            let Some(byte) = self.read_byte()? else {
                return Ok(Key::Escape);
            };

            state = match (state, byte) {
                (State::EscapeSeen, b'[') => State::BracketSeen,
                (State::EscapeSeen, b'O') => State::OSeen,
                (State::BracketSeen, b'0'..=b'9') => State::DigitSeen(byte),
                (State::BracketSeen, b'A') => return Ok(Key::ArrowUp),
                (State::BracketSeen, b'B') => return Ok(Key::ArrowDown),
                (State::BracketSeen, b'C') => return Ok(Key::ArrowRight),
                (State::BracketSeen, b'D') => return Ok(Key::ArrowLeft),
                (State::BracketSeen | State::OSeen, b'H') => return Ok(Key::Home),
                (State::BracketSeen | State::OSeen, b'F') => return Ok(Key::End),
                (State::DigitSeen(digit), b'~') => return Ok(vt_key(digit)),
                _ => return Ok(Key::Escape),
            };
        }
    }
}

/// Map a `ESC [ <digit> ~` sequence digit to its key.
fn vt_key(digit: u8) -> Key {
    match digit {
        b'1' | b'7' => Key::Home,
        b'3' => Key::Delete,
        b'4' | b'8' => Key::End,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    }
}
