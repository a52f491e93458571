//! Frame composition buffer
//!
//! A [`Frame`] accumulates one refresh worth of text and escape sequences and
//! is flushed to the terminal in a single write. Batching the whole frame
//! into one write is what keeps the screen from tearing between the clear
//! and the redraw.
//!
//! The buffer is built fresh each frame and discarded after the flush.

use std::io::{self, Write};

/// Append-only byte buffer for one frame of terminal output.
#[derive(Debug, Default)]
pub struct Frame {
    data: Vec<u8>,
}

impl Frame {
    /// Create a frame sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Hide the cursor while the frame is being painted.
    pub fn hide_cursor(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25l");
    }

    /// Show the cursor again once painting is done.
    pub fn show_cursor(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25h");
    }

    /// Move the cursor to the top-left corner.
    pub fn cursor_home(&mut self) {
        self.data.extend_from_slice(b"\x1b[H");
    }

    /// Position the cursor using 1-indexed terminal coordinates.
    pub fn cursor_goto(&mut self, row: usize, col: usize) {
        // Writes into a Vec cannot fail.
        let _ = write!(self.data, "\x1b[{row};{col}H");
    }

    /// Erase from the cursor to the end of the current line.
    pub fn clear_line(&mut self) {
        self.data.extend_from_slice(b"\x1b[K");
    }

    /// Carriage-return/newline pair between rows.
    pub fn newline(&mut self) {
        self.data.extend_from_slice(b"\r\n");
    }

    /// Flush the frame to a writer in a single write call.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_goto_is_one_indexed_literal() {
        let mut frame = Frame::new();
        frame.cursor_goto(1, 1);
        assert_eq!(frame.as_bytes(), b"\x1b[1;1H");

        let mut frame = Frame::new();
        frame.cursor_goto(24, 80);
        assert_eq!(frame.as_bytes(), b"\x1b[24;80H");
    }

    #[test]
    fn test_control_sequences_literal() {
        let mut frame = Frame::new();
        frame.hide_cursor();
        frame.cursor_home();
        frame.clear_line();
        frame.newline();
        frame.show_cursor();
        assert_eq!(frame.as_bytes(), b"\x1b[?25l\x1b[H\x1b[K\r\n\x1b[?25h");
    }

    #[test]
    fn test_accumulates_in_order() {
        let mut frame = Frame::with_capacity(16);
        frame.push_bytes(b"one");
        frame.push_bytes(b"two");
        assert_eq!(frame.as_bytes(), b"onetwo");
        assert_eq!(frame.len(), 6);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_flush_writes_everything() {
        let mut frame = Frame::new();
        frame.push_bytes(b"payload");

        let mut sink = Vec::new();
        frame.flush_to(&mut sink).expect("flush");
        assert_eq!(sink, b"payload");
    }
}
