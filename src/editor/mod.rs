//! Editor state and the refresh/dispatch cycle
//!
//! Holds the cursor, the viewport offsets, the terminal dimensions, and the
//! loaded document. The cursor addresses the full document, not the screen:
//! `cx`/`cy` may range anywhere inside it, and [`Editor::scroll`] recomputes
//! the minimal row/column offsets that keep the cursor visible before each
//! frame is composed.
//!
//! Frame composition follows a fixed order: hide cursor, home, one pass over
//! the visible rows (each ending in erase-to-end-of-line, all but the last
//! followed by `\r\n` so the terminal never scrolls on its own), reposition
//! the cursor, show it again. The result is a pure function of the state, so
//! two refreshes without an intervening keypress paint identical bytes.

use std::io::{self, Write};
use std::path::Path;

use crate::buffer::{BufferError, Row, RowStore};
use crate::input::{ctrl, Key};
use crate::screen::Frame;

/// Banner shown across an empty document.
const WELCOME: &str = concat!("mino viewer -- version ", env!("CARGO_PKG_VERSION"));

/// What the main loop should do after a dispatched key
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Paint one final frame, then exit with success
    Quit,
}

/// Cursor, viewport, and document state
#[derive(Debug)]
pub struct Editor {
    /// Cursor column within the document (0-indexed)
    cx: usize,
    /// Cursor row within the document (0-indexed, may equal the row count)
    cy: usize,
    /// First visible document row
    rowoff: usize,
    /// First visible document column
    coloff: usize,
    screenrows: usize,
    screencols: usize,
    rows: RowStore,
}

impl Editor {
    /// Create an editor over an empty document.
    pub fn new(screenrows: usize, screencols: usize) -> Self {
        Self::with_rows(screenrows, screencols, RowStore::new())
    }

    /// Create an editor over an already-built document.
    pub fn with_rows(screenrows: usize, screencols: usize, rows: RowStore) -> Self {
        Self {
            cx: 0,
            cy: 0,
            rowoff: 0,
            coloff: 0,
            screenrows,
            screencols,
            rows,
        }
    }

    /// Replace the document with the contents of a file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or read; fatal at startup.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), BufferError> {
        self.rows = RowStore::load(path)?;
        Ok(())
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    pub fn offsets(&self) -> (usize, usize) {
        (self.rowoff, self.coloff)
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    fn current_row(&self) -> Option<&Row> {
        self.rows.get(self.cy)
    }

    /// Length of the row at `index`, or 0 past the end of the document.
    fn row_len(&self, index: usize) -> usize {
        self.rows.get(index).map_or(0, Row::len)
    }

    /// Recompute the viewport offsets so the cursor stays on-screen.
    ///
    /// Scrolls by the minimum amount on each axis and never moves the
    /// viewport when the cursor is already visible.
    pub fn scroll(&mut self) {
        if self.cy < self.rowoff {
            self.rowoff = self.cy;
        }
        if self.cy >= self.rowoff + self.screenrows {
            self.rowoff = self.cy - self.screenrows + 1;
        }
        if self.cx < self.coloff {
            self.coloff = self.cx;
        }
        if self.cx >= self.coloff + self.screencols {
            self.coloff = self.cx - self.screencols + 1;
        }
    }

    /// Apply one arrow-key movement.
    ///
    /// Left wraps to the end of the previous line; right wraps to the start
    /// of the next. After any move the column snaps to the new row's length,
    /// which is what keeps `cx` inside the row everywhere else.
    pub fn move_cursor(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.row_len(self.cy);
                }
            }
            Key::ArrowRight => {
                if let Some(row) = self.current_row() {
                    if self.cx < row.len() {
                        self.cx += 1;
                    } else {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Key::ArrowUp => {
                if self.cy > 0 {
                    self.cy -= 1;
                }
            }
            Key::ArrowDown => {
                if self.cy < self.rows.len() {
                    self.cy += 1;
                }
            }
            _ => {}
        }

        // Snap left if the new row is shorter than the old column.
        let len = self.row_len(self.cy);
        if self.cx > len {
            self.cx = len;
        }
    }

    /// Dispatch one decoded key.
    pub fn process_key(&mut self, key: Key) -> Step {
        match key {
            Key::Char(c) if c == ctrl(b'q') => return Step::Quit,
            Key::Home => self.cx = 0,
            Key::End => self.cx = self.row_len(self.cy),
            Key::PageUp => {
                for _ in 0..self.screenrows {
                    self.move_cursor(Key::ArrowUp);
                }
            }
            Key::PageDown => {
                for _ in 0..self.screenrows {
                    self.move_cursor(Key::ArrowDown);
                }
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.move_cursor(key);
            }
            // Delete, Escape, and ordinary characters do nothing in a viewer.
            _ => {}
        }
        Step::Continue
    }

    /// Compose one frame of output for the current state.
    ///
    /// Assumes [`Editor::scroll`] has run since the last cursor move, so the
    /// offsets already track the cursor.
    pub fn render(&self) -> Frame {
        let mut frame = Frame::with_capacity(self.screenrows * (self.screencols + 8) + 32);

        frame.hide_cursor();
        frame.cursor_home();

        self.draw_rows(&mut frame);

        frame.cursor_goto(
            self.cy.saturating_sub(self.rowoff) + 1,
            self.cx.saturating_sub(self.coloff) + 1,
        );
        frame.show_cursor();

        frame
    }

    fn draw_rows(&self, frame: &mut Frame) {
        for y in 0..self.screenrows {
            let filerow = y + self.rowoff;
            match self.rows.get(filerow) {
                Some(row) => frame.push_bytes(row.window(self.coloff, self.screencols)),
                None => {
                    if self.rows.is_empty() && y == self.screenrows / 3 {
                        self.draw_welcome(frame);
                    } else {
                        frame.push_bytes(b"~");
                    }
                }
            }

            frame.clear_line();
            // No newline after the last row, or the terminal scrolls.
            if y + 1 < self.screenrows {
                frame.newline();
            }
        }
    }

    /// Centered welcome banner, truncated to the screen width.
    fn draw_welcome(&self, frame: &mut Frame) {
        let width = WELCOME.len().min(self.screencols);
        let mut padding = (self.screencols - width) / 2;
        if padding > 0 {
            frame.push_bytes(b"~");
            padding -= 1;
        }
        for _ in 0..padding {
            frame.push_bytes(b" ");
        }
        frame.push_bytes(&WELCOME.as_bytes()[..width]);
    }

    /// Scroll, compose, and write one frame in a single output call.
    ///
    /// # Errors
    ///
    /// Returns an error if the write to the terminal fails.
    pub fn refresh<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.scroll();
        self.render().flush_to(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store(lines: &[&str]) -> RowStore {
        let mut rows = RowStore::new();
        for line in lines {
            rows.push(Row::new(line.as_bytes()));
        }
        rows
    }

    fn editor(lines: &[&str]) -> Editor {
        Editor::with_rows(24, 80, store(lines))
    }

    #[test]
    fn test_left_wraps_to_previous_line_end() {
        let mut ed = editor(&["abc", "de"]);
        ed.move_cursor(Key::ArrowDown);
        assert_eq!(ed.cursor(), (0, 1));

        ed.move_cursor(Key::ArrowLeft);
        assert_eq!(ed.cursor(), (3, 0));
    }

    #[test]
    fn test_left_at_origin_stays_put() {
        let mut ed = editor(&["abc"]);
        ed.move_cursor(Key::ArrowLeft);
        assert_eq!(ed.cursor(), (0, 0));
    }

    #[test]
    fn test_right_wraps_to_next_line_start() {
        let mut ed = editor(&["ab", "cd"]);
        ed.move_cursor(Key::ArrowRight);
        ed.move_cursor(Key::ArrowRight);
        assert_eq!(ed.cursor(), (2, 0));

        ed.move_cursor(Key::ArrowRight);
        assert_eq!(ed.cursor(), (0, 1));
    }

    #[test]
    fn test_right_past_document_end_stays_put() {
        let mut ed = editor(&["a"]);
        ed.move_cursor(Key::ArrowDown);
        // cy == numrows: no current row, right is a no-op.
        ed.move_cursor(Key::ArrowRight);
        assert_eq!(ed.cursor(), (0, 1));
    }

    #[test]
    fn test_vertical_clamps_to_document() {
        let mut ed = editor(&["a", "b"]);
        ed.move_cursor(Key::ArrowUp);
        assert_eq!(ed.cursor(), (0, 0));

        for _ in 0..10 {
            ed.move_cursor(Key::ArrowDown);
        }
        // One past the last row is allowed, no further.
        assert_eq!(ed.cursor(), (0, 2));
    }

    #[test]
    fn test_vertical_move_snaps_column() {
        let mut ed = editor(&["long line here", "ok"]);
        let _ = ed.process_key(Key::End);
        assert_eq!(ed.cursor(), (14, 0));

        ed.move_cursor(Key::ArrowDown);
        assert_eq!(ed.cursor(), (2, 1));
    }

    #[test]
    fn test_home_and_row_aware_end() {
        let mut ed = editor(&["hello"]);
        let _ = ed.process_key(Key::End);
        assert_eq!(ed.cursor(), (5, 0));

        let _ = ed.process_key(Key::Home);
        assert_eq!(ed.cursor(), (0, 0));
    }

    #[test]
    fn test_end_past_document_is_zero() {
        let mut ed = editor(&["hello"]);
        ed.move_cursor(Key::ArrowDown);
        let _ = ed.process_key(Key::End);
        assert_eq!(ed.cursor(), (0, 1));
    }

    #[test]
    fn test_page_down_moves_a_screenful() {
        let lines: Vec<String> = (0..100).map(|i| format!("line{i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut ed = editor(&refs);

        let _ = ed.process_key(Key::PageDown);
        assert_eq!(ed.cursor().1, 24);

        let _ = ed.process_key(Key::PageUp);
        assert_eq!(ed.cursor().1, 0);
    }

    #[test]
    fn test_quit_key() {
        let mut ed = editor(&[]);
        assert_eq!(ed.process_key(Key::Char(ctrl(b'q'))), Step::Quit);
        assert_eq!(ed.process_key(Key::Char(b'q')), Step::Continue);
    }

    #[test]
    fn test_ignored_keys_do_not_move() {
        let mut ed = editor(&["abc"]);
        assert_eq!(ed.process_key(Key::Delete), Step::Continue);
        assert_eq!(ed.process_key(Key::Escape), Step::Continue);
        assert_eq!(ed.process_key(Key::Char(b'x')), Step::Continue);
        assert_eq!(ed.cursor(), (0, 0));
    }

    #[test]
    fn test_scroll_down_minimal() {
        let lines: Vec<String> = (0..100).map(|i| format!("line{i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut ed = editor(&refs);

        for _ in 0..50 {
            ed.move_cursor(Key::ArrowDown);
        }
        ed.scroll();
        // Cursor on the last visible row, scrolled no further than needed.
        assert_eq!(ed.offsets().0, 50 - 24 + 1);

        // Already visible: a second scroll is a no-op.
        let before = ed.offsets();
        ed.scroll();
        assert_eq!(ed.offsets(), before);
    }

    #[test]
    fn test_scroll_up_tracks_cursor() {
        let lines: Vec<String> = (0..100).map(|i| format!("l{i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut ed = editor(&refs);

        for _ in 0..50 {
            ed.move_cursor(Key::ArrowDown);
        }
        ed.scroll();
        for _ in 0..50 {
            ed.move_cursor(Key::ArrowUp);
        }
        ed.scroll();
        assert_eq!(ed.offsets(), (0, 0));
    }

    #[test]
    fn test_scroll_horizontal() {
        let long = "x".repeat(200);
        let mut ed = editor(&[long.as_str()]);

        let _ = ed.process_key(Key::End);
        ed.scroll();
        assert_eq!(ed.offsets().1, 200 - 80 + 1);

        let _ = ed.process_key(Key::Home);
        ed.scroll();
        assert_eq!(ed.offsets().1, 0);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut ed = editor(&["alpha", "beta"]);
        ed.scroll();
        assert_eq!(ed.render().as_bytes(), ed.render().as_bytes());
    }

    #[test]
    fn test_render_clips_rows_to_viewport() {
        let mut ed = Editor::with_rows(2, 4, store(&["abcdefgh", "ij"]));
        ed.scroll();
        let frame = ed.render();
        let bytes = frame.as_bytes();

        let expected = b"\x1b[?25l\x1b[H\
            abcd\x1b[K\r\n\
            ij\x1b[K\
            \x1b[1;1H\x1b[?25h";
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_render_empty_rows_show_placeholder() {
        let mut ed = Editor::with_rows(3, 10, store(&["hi"]));
        ed.scroll();
        let text = String::from_utf8(ed.render().as_bytes().to_vec()).unwrap();

        let body: Vec<&str> = text
            .trim_start_matches("\x1b[?25l\x1b[H")
            .split("\r\n")
            .collect();
        assert_eq!(body.len(), 3);
        assert!(body[0].starts_with("hi"));
        assert!(body[1].starts_with('~'));
        assert!(body[2].starts_with('~'));
    }

    fn arb_key() -> impl Strategy<Value = Key> {
        prop_oneof![
            Just(Key::ArrowUp),
            Just(Key::ArrowDown),
            Just(Key::ArrowLeft),
            Just(Key::ArrowRight),
            Just(Key::Home),
            Just(Key::End),
            Just(Key::PageUp),
            Just(Key::PageDown),
        ]
    }

    proptest! {
        #[test]
        fn test_cursor_never_leaves_document(
            keys in proptest::collection::vec(arb_key(), 0..200)
        ) {
            let mut ed = Editor::with_rows(
                10,
                20,
                store(&["", "short", "a much longer line of text", "mid", ""]),
            );
            for key in keys {
                let _ = ed.process_key(key);
                let (cx, cy) = ed.cursor();
                prop_assert!(cy <= ed.rows().len());
                let limit = ed.rows().get(cy).map_or(0, |r| r.len());
                prop_assert!(cx <= limit);
            }
        }

        #[test]
        fn test_viewport_keeps_cursor_visible(
            keys in proptest::collection::vec(arb_key(), 0..200)
        ) {
            let lines: Vec<String> = (0..40).map(|i| "ab".repeat(i)).collect();
            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            let mut ed = Editor::with_rows(10, 20, store(&refs));

            for key in keys {
                let _ = ed.process_key(key);
                ed.scroll();
                let (cx, cy) = ed.cursor();
                let (rowoff, coloff) = ed.offsets();
                prop_assert!(rowoff <= cy && cy < rowoff + 10);
                prop_assert!(coloff <= cx && cx < coloff + 20);
            }
        }
    }
}
