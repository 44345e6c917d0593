use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by matrix arithmetic, construction and persistence.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Operand shapes are incompatible for `op`. Shapes are `(rows, cols)`.
    ///
    /// For `load`, `left` is the declared shape of the destination matrix and
    /// `right` is what the file actually provided.
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// A token in a saved matrix file is not a float. `line` and `column` are zero-based.
    #[error("cannot parse {token:?} at line {line}, column {column}: {source}")]
    ParseError {
        line: usize,
        column: usize,
        token: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("I/O failure on {}: {source}", .path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store config: {0}")]
    Config(#[from] serde_json::Error),
}

impl MatrixError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> MatrixError {
        MatrixError::IoFailure { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;
