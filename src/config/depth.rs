use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of stacked recurrent cells on each side of the model.
///
/// A scalar depth puts the same number of cells in the encoder and the
/// decoder. A pair sets them independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Depth {
    Uniform(usize),
    Split { encoder: usize, decoder: usize },
}

impl Depth {
    /// Returns `(encoder_depth, decoder_depth)`
    pub fn normalize(&self) -> (usize, usize) {
        match *self {
            Depth::Uniform(depth) => (depth, depth),
            Depth::Split { encoder, decoder } => (encoder, decoder),
        }
    }

    /// Normalize and reject empty stacks
    pub fn validate(&self) -> Result<(usize, usize), ConfigError> {
        let (encoder, decoder) = self.normalize();
        if encoder == 0 || decoder == 0 {
            return Err(ConfigError::ZeroDepth { encoder, decoder });
        }
        Ok((encoder, decoder))
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth::Uniform(1)
    }
}

impl From<usize> for Depth {
    fn from(depth: usize) -> Self {
        Depth::Uniform(depth)
    }
}

impl From<(usize, usize)> for Depth {
    fn from((encoder, decoder): (usize, usize)) -> Self {
        Depth::Split { encoder, decoder }
    }
}
