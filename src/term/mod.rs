//! Raw terminal session management
//!
//! This module owns the controlling terminal's raw-mode configuration and the
//! window-size query. Raw mode is a process-wide singleton: [`RawMode`] is a
//! scoped guard that captures the original attributes on entry and restores
//! them when dropped, so the shell is never left in raw mode on quit, fatal
//! error, or panic.
//!
//! Reads in raw mode use `VMIN = 0` / `VTIME = 1`: a read returns within
//! roughly 100ms with zero bytes when no input is pending. This is the
//! blocking-with-timeout behavior the key decoder relies on to distinguish a
//! bare ESC keypress from the start of an escape sequence.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use nix::libc;
use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
    Termios,
};
use tracing::{debug, error};

/// Error type for terminal session operations
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    #[error("failed to get terminal attributes: {0}")]
    GetAttr(#[source] nix::Error),

    #[error("failed to set terminal attributes: {0}")]
    SetAttr(#[source] nix::Error),

    #[error("raw mode is already active")]
    AlreadyActive,

    #[error("failed to probe terminal size: {0}")]
    SizeProbe(#[source] io::Error),

    #[error("terminal did not report a usable size")]
    SizeParse,
}

/// Terminal dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: usize,
    pub cols: usize,
}

/// Guards against a second raw-mode session in the same process.
static RAW_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Scoped raw-mode session for the controlling terminal.
///
/// Enabling captures the current attributes and applies a raw configuration:
/// no echo, no canonical line buffering, no input/output translation, no
/// signal-generating control characters, and timed reads. Dropping the guard
/// restores the captured attributes exactly once.
#[derive(Debug)]
pub struct RawMode {
    orig: Termios,
}

impl RawMode {
    /// Put the terminal into raw mode, returning the restore guard.
    ///
    /// # Errors
    ///
    /// Fails if another `RawMode` is still alive, or if the terminal
    /// attributes cannot be read or written (e.g. stdin is not a tty).
    pub fn enable() -> Result<Self, TermError> {
        if RAW_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(TermError::AlreadyActive);
        }

        match Self::apply_raw() {
            Ok(orig) => Ok(Self { orig }),
            Err(e) => {
                RAW_ACTIVE.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Capture current attributes and switch stdin to raw mode.
    fn apply_raw() -> Result<Termios, TermError> {
        let orig = termios::tcgetattr(io::stdin()).map_err(TermError::GetAttr)?;

        let mut raw = orig.clone();
        raw.input_flags.remove(
            InputFlags::BRKINT
                | InputFlags::ICRNL
                | InputFlags::INPCK
                | InputFlags::ISTRIP
                | InputFlags::IXON,
        );
        raw.output_flags.remove(OutputFlags::OPOST);
        raw.control_flags.insert(ControlFlags::CS8);
        raw.local_flags.remove(
            LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG,
        );
        // Timed reads: return after 1/10s even with no pending input.
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 1;

        termios::tcsetattr(io::stdin(), SetArg::TCSAFLUSH, &raw).map_err(TermError::SetAttr)?;
        Ok(orig)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = termios::tcsetattr(io::stdin(), SetArg::TCSAFLUSH, &self.orig) {
            error!("failed to restore terminal attributes: {e}");
        }
        RAW_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// Query the terminal window size.
///
/// Prefers the `TIOCGWINSZ` ioctl; when that fails or reports zero columns,
/// falls back to pushing the cursor to the bottom-right corner and asking the
/// terminal for a cursor position report. The fallback requires raw mode to
/// be active so the report can be read unbuffered from stdin.
///
/// # Errors
///
/// Returns an error when both paths fail to produce a usable size.
pub fn window_size() -> Result<WindowSize, TermError> {
    let mut ws = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ is a valid ioctl for querying window size and only
    // writes into the winsize struct we hand it
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if rc == -1 || ws.ws_col == 0 {
        debug!("TIOCGWINSZ unavailable, falling back to cursor probe");
        return cursor_probe_size();
    }

    Ok(WindowSize {
        rows: ws.ws_row as usize,
        cols: ws.ws_col as usize,
    })
}

/// Measure the window by moving the cursor to an arbitrarily large offset and
/// reading back the resulting cursor position report.
fn cursor_probe_size() -> Result<WindowSize, TermError> {
    let mut stdout = io::stdout();
    stdout
        .write_all(b"\x1b[999C\x1b[999B\x1b[6n")
        .map_err(TermError::SizeProbe)?;
    stdout.flush().map_err(TermError::SizeProbe)?;

    // Reply has the form `ESC [ <rows> ; <cols> R`. Read byte-wise up to the
    // terminator; a timed-out read ends the reply early and fails parsing.
    let mut reply = Vec::with_capacity(32);
    let mut stdin = io::stdin();
    let mut byte = [0u8; 1];
    while reply.len() < 31 {
        let n = stdin.read(&mut byte).map_err(TermError::SizeProbe)?;
        if n == 0 || byte[0] == b'R' {
            break;
        }
        reply.push(byte[0]);
    }

    parse_cursor_report(&reply).ok_or(TermError::SizeParse)
}

/// Parse a cursor position report (without the trailing `R`).
fn parse_cursor_report(reply: &[u8]) -> Option<WindowSize> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let body = std::str::from_utf8(body).ok()?;
    let (rows, cols) = body.split_once(';')?;
    let size = WindowSize {
        rows: rows.parse().ok()?,
        cols: cols.parse().ok()?,
    };
    (size.cols > 0).then_some(size)
}
