//! Mino Terminal Text Viewer Library
//!
//! A raw-mode terminal text viewer built from scratch without terminal UI
//! libraries. This crate provides the core functionality for viewing a file
//! in the terminal:
//!
//! - `term`: raw-mode session guard and window-size query
//! - `input`: escape-sequence key decoder
//! - `buffer`: row storage and file loading
//! - `screen`: single-write frame buffer
//! - `editor`: cursor state, scrolling, frame composition, key dispatch

pub mod buffer;
pub mod editor;
pub mod input;
pub mod screen;
pub mod term;

/// Top-level error type for the viewer binary
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Term(#[from] term::TermError),

    #[error(transparent)]
    Buffer(#[from] buffer::BufferError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
