//! Row storage
//!
//! The document is an ordered, growable sequence of [`Row`]s loaded from a
//! file. Rows are raw byte lines with their terminators stripped; within this
//! crate's scope the store is append-only and rows are immutable after load.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Error type for document loading
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One line of the document, stored without its line terminator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    chars: Vec<u8>,
}

impl Row {
    pub fn new(chars: impl Into<Vec<u8>>) -> Self {
        Self {
            chars: chars.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.chars
    }

    /// Visible slice of the row through a window starting at `coloff`, at
    /// most `width` bytes wide. Empty when the window starts past the end.
    pub fn window(&self, coloff: usize, width: usize) -> &[u8] {
        let start = coloff.min(self.chars.len());
        let end = start.saturating_add(width).min(self.chars.len());
        &self.chars[start..end]
    }
}

/// Ordered, growable sequence of rows
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Load a document from a file, one row per input line.
    ///
    /// Lines are read as raw bytes with no length limit; all trailing `\n`
    /// and `\r` bytes are stripped. A final line without a terminator still
    /// produces a row.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BufferError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BufferError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let mut store = Self::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| BufferError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            store.push(Row::new(line.as_slice()));
        }

        Ok(store)
    }
}
