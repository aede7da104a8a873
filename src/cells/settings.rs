use crate::config::CellOptions;
use crate::error::CellError;

use super::{AttentionDecoderCellConfig, LSTMCellConfig, LSTMDecoderCellConfig};

pub const BIAS: &str = "bias";
pub const FORGET_BIAS: &str = "forget_bias";

/// Cell options left over after architecture normalization.
///
/// Every cell a builder creates receives the same settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSettings {
    pub bias: bool,
    pub forget_bias: f64,
}

impl Default for CellSettings {
    fn default() -> Self {
        Self {
            bias: true,
            forget_bias: 1.0,
        }
    }
}

impl CellSettings {
    /// Parse the remaining options. Unknown keys are rejected.
    pub fn from_options(options: CellOptions) -> Result<Self, CellError> {
        let mut settings = Self::default();

        for (key, value) in options {
            match key.as_str() {
                BIAS => {
                    settings.bias = value.as_bool().ok_or_else(|| CellError::InvalidValue {
                        key: key.clone(),
                        expected: "bool",
                    })?;
                }
                FORGET_BIAS => {
                    settings.forget_bias = value.as_f64().ok_or_else(|| CellError::InvalidValue {
                        key: key.clone(),
                        expected: "float",
                    })?;
                }
                _ => return Err(CellError::UnknownOption(key.clone())),
            }
        }

        Ok(settings)
    }

    pub fn lstm(&self, d_input: usize, d_hidden: usize) -> LSTMCellConfig {
        LSTMCellConfig::new(d_input, d_hidden)
            .with_bias(self.bias)
            .with_forget_bias(self.forget_bias)
    }

    pub fn decoder(
        &self,
        d_input: usize,
        d_hidden: usize,
        d_output: Option<usize>,
    ) -> LSTMDecoderCellConfig {
        LSTMDecoderCellConfig::new(d_input, d_hidden)
            .with_d_output(d_output)
            .with_bias(self.bias)
            .with_forget_bias(self.forget_bias)
    }

    pub fn attention(
        &self,
        d_input: usize,
        d_memory: usize,
        d_hidden: usize,
        d_output: usize,
    ) -> AttentionDecoderCellConfig {
        AttentionDecoderCellConfig::new(d_input, d_memory, d_hidden, d_output)
            .with_bias(self.bias)
            .with_forget_bias(self.forget_bias)
    }
}
