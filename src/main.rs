//! Mino Terminal Text Viewer
//!
//! Puts the terminal into raw mode, loads the file named by the single
//! optional argument, and runs the refresh/keypress loop until Ctrl-Q.

use std::io::{self, Write};
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use mino::editor::{Editor, Step};
use mino::input::KeyDecoder;
use mino::term::{self, RawMode};
use mino::Error;

fn main() -> ExitCode {
    // Quiet by default so diagnostics never land on the raw screen;
    // RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The raw-mode guard has already restored cooked mode by the
            // time run() returns; leave a clean screen before reporting.
            let mut stdout = io::stdout();
            let _ = stdout.write_all(b"\x1b[2J\x1b[H");
            let _ = stdout.flush();
            error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let _raw = RawMode::enable()?;
    let size = term::window_size()?;

    let mut editor = Editor::new(size.rows, size.cols);
    if let Some(path) = std::env::args_os().nth(1) {
        editor.open(path)?;
    }

    let mut keys = KeyDecoder::new(io::stdin().lock());
    let mut out = io::stdout();
    loop {
        editor.refresh(&mut out)?;
        if editor.process_key(keys.read_key()?) == Step::Quit {
            editor.refresh(&mut out)?;
            return Ok(());
        }
    }
}
