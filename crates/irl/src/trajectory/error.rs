use std::{io, num::ParseFloatError, path::PathBuf};

use thiserror::Error;

/// A sample file's text does not follow the expected layout.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: missing {field}")]
    MissingLine { line: usize, field: &'static str },

    #[error("line {line}: expected a blank line")]
    ExpectedBlank { line: usize },

    #[error("line {line}: invalid number {text:?}")]
    Number {
        line: usize,
        text: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("line {line}: no tuples found")]
    NoTuples { line: usize },

    #[error("line {line}: tuple {index} has {found} components, expected {expected}")]
    Ragged {
        line: usize,
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// A parsed file cannot be cut into windows of the requested length.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("sample length must be at least 2, got {0}")]
    Length(usize),

    #[error("{steps} recorded actions are fewer than the sample length {length}")]
    TooShort { steps: usize, length: usize },

    #[error("window at step {start} has no state; only {states} were recorded")]
    MissingState { start: usize, states: usize },
}

/// Loading a sample file failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to window {}", path.display())]
    Window {
        path: PathBuf,
        #[source]
        source: WindowError,
    },
}
