//! # Encoder-Decoder Models
//!
//! Each builder is a Burn [`Config`](burn::config::Config): required
//! arguments go through `new(output_dim, output_length)`, optional ones
//! through the generated `with_*` setters, and `init` normalizes the
//! arguments, assembles the containers and returns the composed module.
//!
//! | Model | Encoder | Decoder coupling |
//! |-------|---------|------------------|
//! | [`SimpleSeq2Seq`] | LSTM stack, final output | context vector seeds the first step |
//! | [`Seq2Seq`] | LSTM stack with readout | context, encoder state, peek, teacher forcing |
//! | [`AttentionSeq2Seq`] | (bi)directional LSTM stack, full sequence | attention over every encoder step |
//!
//! The input shape, `unroll` and `stateful` travel in the [`CellOptions`]
//! bag; whatever is left is handed to cell construction.
//!
//! A model built with `stateful` continues from the [`Seq2SeqState`] its
//! `forward_with_state` returned on the previous call.
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use seq2seq::config::CellOptions;
//! use seq2seq::models::Seq2SeqConfig;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let model = Seq2SeqConfig::new(8, 8)
//!     .with_hidden_dim(Some(20))
//!     .with_options(CellOptions::new().with_input_shape([Some(5), Some(4)]))
//!     .init::<Backend>(&device)
//!     .unwrap();
//!
//! let input = Tensor::<Backend, 3>::zeros([2, 5, 4], &device);
//! assert_eq!(model.forward(input, None).dims(), [2, 8, 8]);
//! ```

mod attention;
mod seq2seq;
mod simple;

pub use attention::{AttentionSeq2Seq, AttentionSeq2SeqConfig};
pub use seq2seq::{Seq2Seq, Seq2SeqConfig};
pub use simple::{SimpleSeq2Seq, SimpleSeq2SeqConfig};

use burn::tensor::backend::Backend;

use crate::cells::{CellSettings, LstmState};
use crate::config::{ArchitectureConfig, ArchitectureFlags, CellOptions, Depth};
use crate::error::Result;

/// Recurrent state carried from one call of a stateful model to the next.
#[derive(Clone, Debug)]
pub struct Seq2SeqState<B: Backend> {
    /// Final state of the top encoder cell (the forward direction when bidirectional)
    pub encoder: LstmState<B>,
    /// Final state of the top decoder cell, or of the attention cell
    pub decoder: LstmState<B>,
}

impl<B: Backend> Seq2SeqState<B> {
    /// Split a carried state into its encoder and decoder parts.
    ///
    /// A model that was not built `stateful` drops it and starts from zeros.
    pub(crate) fn unpack(
        state: Option<Self>,
        stateful: bool,
    ) -> (Option<LstmState<B>>, Option<LstmState<B>>) {
        match state {
            Some(state) if stateful => (Some(state.encoder), Some(state.decoder)),
            Some(_) => {
                log::warn!("model is not stateful, ignoring the carried state");
                (None, None)
            }
            None => (None, None),
        }
    }
}

/// Arguments every builder accepts.
pub(crate) struct BuilderArgs<'a> {
    pub output_dim: usize,
    pub output_length: usize,
    pub hidden_dim: Option<usize>,
    pub depth: Depth,
    pub dropout: f64,
    pub options: &'a CellOptions,
}

/// Normalize builder arguments and parse the leftover cell options.
///
/// Runs before any layer is created, so a failing builder never
/// allocates parameters.
pub(crate) fn prepare(
    model: &str,
    args: BuilderArgs<'_>,
    flags: ArchitectureFlags,
) -> Result<(ArchitectureConfig, usize, CellSettings)> {
    let (config, remaining) = ArchitectureConfig::resolve(
        args.output_dim,
        args.output_length,
        args.hidden_dim,
        args.depth,
        args.dropout,
        args.options.clone(),
    )?;
    let config = config.with_flags(flags)?;
    let features = config.input_shape.require_features()?;
    let cell = CellSettings::from_options(remaining)?;

    log::debug!(
        "{}: input shape {:?}, depth ({}, {}), hidden {}, output {}x{}",
        model,
        config.input_shape.as_tuple(),
        config.encoder_depth,
        config.decoder_depth,
        config.hidden_dim,
        config.output_length,
        config.output_dim
    );

    Ok((config, features, cell))
}
