//! Normalized architecture description shared by the three builders.

use serde::{Deserialize, Serialize};

use super::depth::Depth;
use super::options::{CellOptions, STATEFUL, UNROLL};
use super::shape::{BatchInputShape, ShapeSpec};
use crate::error::{ConfigError, Result};

/// How the encoder's context vector reaches the decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecoderInputMode {
    /// The decoder only sees its own previous output (and a broadcast state)
    NoContext,
    /// The context seeds the first step; later steps see the previous output
    #[default]
    ContextOnce,
    /// The context is added to the decoder input at every step ("peek")
    ContextEveryStep,
}

impl DecoderInputMode {
    pub fn from_peek(peek: bool) -> Self {
        if peek {
            DecoderInputMode::ContextEveryStep
        } else {
            DecoderInputMode::ContextOnce
        }
    }

    pub fn uses_context(&self) -> bool {
        !matches!(self, DecoderInputMode::NoContext)
    }
}

/// Model-specific switches. Each builder sets the ones it supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureFlags {
    pub broadcast_state: bool,
    pub inner_broadcast_state: bool,
    pub teacher_force: bool,
    pub decoder_input: DecoderInputMode,
    pub bidirectional: bool,
}

impl Default for ArchitectureFlags {
    fn default() -> Self {
        Self {
            broadcast_state: false,
            inner_broadcast_state: false,
            teacher_force: false,
            decoder_input: DecoderInputMode::ContextOnce,
            bidirectional: false,
        }
    }
}

impl ArchitectureFlags {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.decoder_input == DecoderInputMode::NoContext && !self.broadcast_state {
            return Err(ConfigError::IncompatibleOptions(
                "a decoder without context input needs `broadcast_state`".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fully normalized parameters for one builder invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    pub output_dim: usize,
    pub output_length: usize,
    pub hidden_dim: usize,
    pub encoder_depth: usize,
    pub decoder_depth: usize,
    pub dropout: f64,
    pub input_shape: BatchInputShape,
    pub unroll: bool,
    pub stateful: bool,
    pub flags: ArchitectureFlags,
}

impl ArchitectureConfig {
    /// Normalize builder arguments.
    ///
    /// Takes the options bag by value and returns it with the shape,
    /// `unroll` and `stateful` keys removed; the remainder belongs to cell
    /// construction.
    pub fn resolve(
        output_dim: usize,
        output_length: usize,
        hidden_dim: Option<usize>,
        depth: Depth,
        dropout: f64,
        mut options: CellOptions,
    ) -> Result<(Self, CellOptions)> {
        if output_dim == 0 {
            return Err(ConfigError::ZeroDimension { name: "output_dim" }.into());
        }
        if output_length == 0 {
            return Err(ConfigError::ZeroDimension {
                name: "output_length",
            }
            .into());
        }
        if hidden_dim == Some(0) {
            return Err(ConfigError::ZeroDimension { name: "hidden_dim" }.into());
        }
        if !(0.0..1.0).contains(&dropout) {
            return Err(ConfigError::InvalidDropout(dropout).into());
        }
        let (encoder_depth, decoder_depth) = depth.validate()?;

        let input_shape = ShapeSpec::take_from(&mut options)?.resolve();
        if input_shape.time_steps == Some(0) {
            return Err(ConfigError::ZeroDimension {
                name: "input_length",
            }
            .into());
        }
        if input_shape.batch == Some(0) {
            return Err(ConfigError::ZeroDimension { name: "batch" }.into());
        }
        let unroll = options.take_bool(UNROLL)?.unwrap_or(false);
        let stateful = options.take_bool(STATEFUL)?.unwrap_or(false);

        let config = Self {
            output_dim,
            output_length,
            hidden_dim: hidden_dim.unwrap_or(output_dim),
            encoder_depth,
            decoder_depth,
            dropout,
            input_shape,
            unroll,
            stateful,
            flags: ArchitectureFlags::default(),
        };

        Ok((config, options))
    }

    /// Attach model flags, rejecting combinations that cannot be wired
    pub fn with_flags(mut self, flags: ArchitectureFlags) -> Result<Self> {
        flags.validate()?;
        self.flags = flags;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Seq2SeqError;

    fn options() -> CellOptions {
        CellOptions::new().with_input_dim(8).with_input_length(10)
    }

    #[test]
    fn test_hidden_dim_defaults_to_output_dim() {
        let (config, _) =
            ArchitectureConfig::resolve(12, 5, None, Depth::Uniform(1), 0.0, options()).unwrap();
        assert_eq!(config.hidden_dim, 12);

        let (config, _) =
            ArchitectureConfig::resolve(12, 5, Some(32), Depth::Uniform(1), 0.0, options())
                .unwrap();
        assert_eq!(config.hidden_dim, 32);
    }

    #[test]
    fn test_unroll_and_stateful_consumed() {
        let options = options()
            .with_unroll(true)
            .with_stateful(true)
            .with("forget_bias", 0.0);
        let (config, remaining) =
            ArchitectureConfig::resolve(4, 3, None, Depth::from((2, 3)), 0.1, options).unwrap();

        assert!(config.unroll);
        assert!(config.stateful);
        assert_eq!((config.encoder_depth, config.decoder_depth), (2, 3));
        assert_eq!(remaining.keys().collect::<Vec<_>>(), vec!["forget_bias"]);
    }

    #[test]
    fn test_missing_shape_is_config_error() {
        let empty = CellOptions::new();
        let err = ArchitectureConfig::resolve(4, 3, None, Depth::Uniform(1), 0.0, empty)
            .unwrap_err();
        assert_eq!(err, Seq2SeqError::Config(ConfigError::MissingInputShape));
    }

    #[test]
    fn test_invalid_dropout() {
        let err = ArchitectureConfig::resolve(4, 3, None, Depth::Uniform(1), 1.0, options())
            .unwrap_err();
        assert_eq!(err, Seq2SeqError::Config(ConfigError::InvalidDropout(1.0)));
    }

    #[test]
    fn test_zero_time_steps_and_batch_rejected() {
        let zero_length = CellOptions::new().with_input_dim(8).with_input_length(0);
        let err = ArchitectureConfig::resolve(4, 3, None, Depth::Uniform(1), 0.0, zero_length)
            .unwrap_err();
        assert_eq!(
            err,
            Seq2SeqError::Config(ConfigError::ZeroDimension {
                name: "input_length"
            })
        );

        let zero_batch = CellOptions::new().with_batch_input_shape([Some(0), Some(5), Some(8)]);
        let err = ArchitectureConfig::resolve(4, 3, None, Depth::Uniform(1), 0.0, zero_batch)
            .unwrap_err();
        assert_eq!(
            err,
            Seq2SeqError::Config(ConfigError::ZeroDimension { name: "batch" })
        );

        let unknown = CellOptions::new().with_batch_input_shape([None, None, Some(8)]);
        let resolved = ArchitectureConfig::resolve(4, 3, None, Depth::Uniform(1), 0.0, unknown);
        assert!(resolved.is_ok());
    }

    #[test]
    fn test_no_context_requires_broadcast() {
        let (config, _) =
            ArchitectureConfig::resolve(4, 3, None, Depth::Uniform(1), 0.0, options()).unwrap();
        let flags = ArchitectureFlags {
            decoder_input: DecoderInputMode::NoContext,
            ..ArchitectureFlags::default()
        };

        assert!(matches!(
            config.clone().with_flags(flags),
            Err(Seq2SeqError::Config(ConfigError::IncompatibleOptions(_)))
        ));

        let flags = ArchitectureFlags {
            broadcast_state: true,
            ..flags
        };
        assert!(config.with_flags(flags).is_ok());
    }

    #[test]
    fn test_peek_maps_to_mode() {
        assert_eq!(
            DecoderInputMode::from_peek(true),
            DecoderInputMode::ContextEveryStep
        );
        assert_eq!(
            DecoderInputMode::from_peek(false),
            DecoderInputMode::ContextOnce
        );
    }
}
