//! # seq2seq - Encoder-Decoder Models for Burn
//!
//! Builders that assemble recurrent sequence-to-sequence networks from a
//! handful of high-level parameters.
//!
//! ## Features
//!
//! - **SimpleSeq2Seq**: LSTM encoder whose final output seeds an LSTM decoder
//! - **Seq2Seq**: state broadcasting, readout feedback, peek and teacher forcing
//! - **AttentionSeq2Seq**: bidirectional encoder with an attention decoder
//! - **Shape resolution**: `batch_input_shape`, `input_shape` or `input_dim` + `input_length`
//! - **Typed errors**: every invalid combination fails from `init`, before any layer exists
//!
//! ## Quick Start
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use seq2seq::prelude::*;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let model = AttentionSeq2SeqConfig::new(8, 5)
//!     .with_hidden_dim(Some(16))
//!     .with_depth(Depth::from(2))
//!     .with_options(CellOptions::new().with_input_dim(3).with_input_length(7))
//!     .init::<Backend>(&device)
//!     .unwrap();
//!
//! let input = Tensor::<Backend, 3>::zeros([4, 7, 3], &device);
//! let (output, weights) = model.forward_with_alignments(input);
//!
//! assert_eq!(output.dims(), [4, 5, 8]);
//! assert_eq!(weights.dims(), [4, 5, 7]);
//! ```
//!
//! ## Layering
//!
//! ```text
//! models  ── builders and composed modules
//!   └─ rnn     ── sequence containers (encoders, decoders, layouts)
//!        └─ cells  ── single-step LSTM, decoder and attention cells
//! config  ── argument normalization shared by every builder
//! ```

pub mod cells;
pub mod config;
pub mod error;
pub mod models;
pub mod rnn;

pub mod prelude {
    pub use crate::cells::{
        AttentionDecoderCell, CellSettings, LSTMCell, LSTMDecoderCell, LstmState,
    };
    pub use crate::config::{CellOptions, DecoderInputMode, Depth};
    pub use crate::error::{CellError, ConfigError, Result, Seq2SeqError};
    pub use crate::models::{
        AttentionSeq2Seq, AttentionSeq2SeqConfig, Seq2Seq, Seq2SeqConfig, Seq2SeqState,
        SimpleSeq2Seq, SimpleSeq2SeqConfig,
    };
    pub use crate::rnn::{AttentionDecoder, AttentionEncoder, RecurrentDecoder, RecurrentEncoder};
}
