//! Free-form options bag forwarded to model builders.
//!
//! Shape keys, `unroll` and `stateful` are consumed during normalization.
//! Whatever is left over is handed to cell construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const BATCH_INPUT_SHAPE: &str = "batch_input_shape";
pub const INPUT_SHAPE: &str = "input_shape";
pub const INPUT_DIM: &str = "input_dim";
pub const INPUT_LENGTH: &str = "input_length";
pub const UNROLL: &str = "unroll";
pub const STATEFUL: &str = "stateful";

/// A single value in the options bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A shape where `None` marks an unspecified dimension
    Shape(Vec<Option<usize>>),
}

impl OptionValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "int",
            OptionValue::Float(_) => "float",
            OptionValue::Text(_) => "text",
            OptionValue::Shape(_) => "shape",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            OptionValue::Int(i) => usize::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Floats accept integer values as well.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&[Option<usize>]> {
        match self {
            OptionValue::Shape(dims) => Some(dims),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<usize> for OptionValue {
    fn from(value: usize) -> Self {
        OptionValue::Int(value as i64)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<Vec<Option<usize>>> for OptionValue {
    fn from(value: Vec<Option<usize>>) -> Self {
        OptionValue::Shape(value)
    }
}

impl<const N: usize> From<[Option<usize>; N]> for OptionValue {
    fn from(value: [Option<usize>; N]) -> Self {
        OptionValue::Shape(value.to_vec())
    }
}

/// Options bag passed to a builder alongside its typed arguments.
///
/// # Example
///
/// ```rust
/// use seq2seq::config::CellOptions;
///
/// let options = CellOptions::new()
///     .with_input_dim(8)
///     .with_input_length(10)
///     .with("forget_bias", 0.5);
///
/// assert_eq!(options.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellOptions {
    values: BTreeMap<String, OptionValue>,
}

impl CellOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary option
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_batch_input_shape(self, shape: [Option<usize>; 3]) -> Self {
        self.with(BATCH_INPUT_SHAPE, shape)
    }

    pub fn with_input_shape(self, shape: [Option<usize>; 2]) -> Self {
        self.with(INPUT_SHAPE, shape)
    }

    pub fn with_input_dim(self, input_dim: usize) -> Self {
        self.with(INPUT_DIM, input_dim)
    }

    pub fn with_input_length(self, input_length: usize) -> Self {
        self.with(INPUT_LENGTH, input_length)
    }

    pub fn with_unroll(self, unroll: bool) -> Self {
        self.with(UNROLL, unroll)
    }

    pub fn with_stateful(self, stateful: bool) -> Self {
        self.with(STATEFUL, stateful)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove and return an option
    pub fn take(&mut self, key: &str) -> Option<OptionValue> {
        self.values.remove(key)
    }

    pub fn take_bool(&mut self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.take_typed(key, "bool", OptionValue::as_bool)
    }

    pub fn take_usize(&mut self, key: &str) -> Result<Option<usize>, ConfigError> {
        self.take_typed(key, "non-negative int", OptionValue::as_usize)
    }

    pub fn take_shape(&mut self, key: &str) -> Result<Option<Vec<Option<usize>>>, ConfigError> {
        self.take_typed(key, "shape", |v| v.as_shape().map(<[_]>::to_vec))
    }

    fn take_typed<T>(
        &mut self,
        key: &str,
        expected: &'static str,
        extract: impl Fn(&OptionValue) -> Option<T>,
    ) -> Result<Option<T>, ConfigError> {
        match self.take(key) {
            None => Ok(None),
            Some(value) => extract(&value)
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidOptionType {
                    key: key.to_string(),
                    expected,
                }),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl IntoIterator for CellOptions {
    type Item = (String, OptionValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
