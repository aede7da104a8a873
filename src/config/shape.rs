//! Input shape resolution.
//!
//! Three conventions describe the input tensor, checked in a fixed order:
//! an explicit batch shape, an input shape without the batch dimension, and
//! an input feature dimension with an optional sequence length.

use serde::{Deserialize, Serialize};

use super::options::{CellOptions, BATCH_INPUT_SHAPE, INPUT_DIM, INPUT_LENGTH, INPUT_SHAPE};
use crate::error::ConfigError;

/// Resolved `(batch, time_steps, features)` triple. Any entry may be unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInputShape {
    pub batch: Option<usize>,
    pub time_steps: Option<usize>,
    pub features: Option<usize>,
}

impl BatchInputShape {
    pub fn new(batch: Option<usize>, time_steps: Option<usize>, features: Option<usize>) -> Self {
        Self {
            batch,
            time_steps,
            features,
        }
    }

    pub fn as_tuple(&self) -> (Option<usize>, Option<usize>, Option<usize>) {
        (self.batch, self.time_steps, self.features)
    }

    /// Feature dimension, required to size the first layer
    pub fn require_features(&self) -> Result<usize, ConfigError> {
        match self.features {
            Some(0) => Err(ConfigError::ZeroDimension { name: "input_dim" }),
            Some(features) => Ok(features),
            None => Err(ConfigError::MissingFeatureDim),
        }
    }
}

/// The shape convention a caller used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeSpec {
    ExplicitBatchShape([Option<usize>; 3]),
    InputShape([Option<usize>; 2]),
    InputDimWithOptionalLength {
        input_dim: usize,
        input_length: Option<usize>,
    },
}

impl ShapeSpec {
    /// Pick the highest-precedence shape convention present in `options`
    /// and remove every shape key from the bag.
    ///
    /// Only the winning convention's values are type-checked; lower-precedence
    /// keys are dropped as they are.
    pub fn take_from(options: &mut CellOptions) -> Result<Self, ConfigError> {
        let present = (
            options.contains(BATCH_INPUT_SHAPE),
            options.contains(INPUT_SHAPE),
            options.contains(INPUT_DIM),
        );

        let spec = match present {
            (true, _, _) => ShapeSpec::ExplicitBatchShape(take_fixed(options, BATCH_INPUT_SHAPE)?),
            (false, true, _) => ShapeSpec::InputShape(take_fixed(options, INPUT_SHAPE)?),
            (false, false, true) => ShapeSpec::InputDimWithOptionalLength {
                input_dim: options
                    .take_usize(INPUT_DIM)?
                    .ok_or(ConfigError::MissingInputShape)?,
                input_length: options.take_usize(INPUT_LENGTH)?,
            },
            (false, false, false) => return Err(ConfigError::MissingInputShape),
        };

        let ignored: Vec<&str> = [BATCH_INPUT_SHAPE, INPUT_SHAPE, INPUT_DIM, INPUT_LENGTH]
            .into_iter()
            .filter(|key| options.take(key).is_some())
            .collect();
        if !ignored.is_empty() {
            log::warn!("{spec:?} takes precedence, ignoring shape options {ignored:?}");
        }

        Ok(spec)
    }

    pub fn resolve(&self) -> BatchInputShape {
        match *self {
            ShapeSpec::ExplicitBatchShape([batch, time_steps, features]) => {
                BatchInputShape::new(batch, time_steps, features)
            }
            ShapeSpec::InputShape([time_steps, features]) => {
                BatchInputShape::new(None, time_steps, features)
            }
            ShapeSpec::InputDimWithOptionalLength {
                input_dim,
                input_length,
            } => BatchInputShape::new(None, input_length, Some(input_dim)),
        }
    }
}

fn take_fixed<const N: usize>(
    options: &mut CellOptions,
    key: &str,
) -> Result<[Option<usize>; N], ConfigError> {
    let dims = options
        .take_shape(key)?
        .ok_or(ConfigError::MissingInputShape)?;
    fixed_arity(key, &dims)
}

fn fixed_arity<const N: usize>(
    key: &str,
    dims: &[Option<usize>],
) -> Result<[Option<usize>; N], ConfigError> {
    <[Option<usize>; N]>::try_from(dims).map_err(|_| ConfigError::InvalidShape {
        key: key.to_string(),
        expected: N,
        actual: dims.len(),
    })
}

/// Resolve the input shape from `options`, consuming the shape keys.
pub fn resolve_input_shape(options: &mut CellOptions) -> Result<BatchInputShape, ConfigError> {
    ShapeSpec::take_from(options).map(|spec| spec.resolve())
}
