//! Error types for model assembly.
//!
//! Every builder fails synchronously from `init`, before any layer is
//! constructed. Errors fall into two classes:
//!
//! ```text
//! Seq2SeqError
//! ├── Config(ConfigError)  -- shape, depth and option-combination problems
//! └── Cell(CellError)      -- options rejected by cell construction
//! ```

use thiserror::Error;

/// Result alias used by every builder in the crate.
pub type Result<T> = std::result::Result<T, Seq2SeqError>;

/// The canonical error type returned by model builders.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Seq2SeqError {
    /// The architecture description is incomplete or inconsistent
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cell construction rejected the forwarded options
    #[error("Cell construction error: {0}")]
    Cell(#[from] CellError),
}

/// Errors raised while normalizing an architecture description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no input shape; set `batch_input_shape`, `input_shape` or `input_dim`")]
    MissingInputShape,

    #[error("the input feature dimension must be known to size the first layer")]
    MissingFeatureDim,

    #[error("option `{key}` expects {expected} entries, got {actual}")]
    InvalidShape {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("option `{key}` expects a value of type {expected}")]
    InvalidOptionType { key: String, expected: &'static str },

    #[error("depth must be at least 1 on both sides, got ({encoder}, {decoder})")]
    ZeroDepth { encoder: usize, decoder: usize },

    #[error("`{name}` must be greater than zero")]
    ZeroDimension { name: &'static str },

    #[error("dropout rate must lie in [0, 1), got {0}")]
    InvalidDropout(f64),

    #[error("incompatible options: {0}")]
    IncompatibleOptions(String),
}

/// Errors raised while turning the remaining options into cell settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    #[error("unknown cell option `{0}`")]
    UnknownOption(String),

    #[error("cell option `{key}` expects a value of type {expected}")]
    InvalidValue { key: String, expected: &'static str },
}
