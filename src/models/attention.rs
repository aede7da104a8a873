//! Attention encoder-decoder
//!
//! The encoder keeps its whole output sequence as a memory bank. At every
//! output step the decoder weighs each memory entry against its own state,
//! so no single vector has to carry the whole input.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::{prepare, BuilderArgs, Seq2SeqState};
use crate::config::{ArchitectureConfig, ArchitectureFlags, CellOptions, Depth};
use crate::error;
use crate::rnn::{
    AttentionDecoder, AttentionDecoderConfig, AttentionEncoder, RecurrentEncoderConfig,
};

/// Builder for [`AttentionSeq2Seq`].
#[derive(Config, Debug)]
pub struct AttentionSeq2SeqConfig {
    /// Features per output step
    pub output_dim: usize,
    /// Number of output steps
    pub output_length: usize,
    /// Width of every cell, `output_dim` when unset
    pub hidden_dim: Option<usize>,
    #[config(default = "Depth::Uniform(1)")]
    pub depth: Depth,
    #[config(default = 0.0)]
    pub dropout: f64,
    /// Sum a time-reversed encoder pass into the memory bank
    #[config(default = true)]
    pub bidirectional: bool,
    /// Input shape, `unroll`, `stateful` and cell options
    #[config(default = "CellOptions::default()")]
    pub options: CellOptions,
}

impl AttentionSeq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<AttentionSeq2Seq<B>> {
        let flags = ArchitectureFlags {
            bidirectional: self.bidirectional,
            ..ArchitectureFlags::default()
        };
        let (config, features, cell) = prepare(
            "AttentionSeq2Seq",
            BuilderArgs {
                output_dim: self.output_dim,
                output_length: self.output_length,
                hidden_dim: self.hidden_dim,
                depth: self.depth,
                dropout: self.dropout,
                options: &self.options,
            },
            flags,
        )?;
        let hidden = config.hidden_dim;
        let input_length = config.input_shape.time_steps;

        let encoder_config = RecurrentEncoderConfig::new(features, hidden, config.encoder_depth)
            .with_dropout(config.dropout)
            .with_unroll(config.unroll)
            .with_stateful(config.stateful)
            .with_input_length(input_length);
        let bidirectional = config.flags.bidirectional;
        let encoder = AttentionEncoder::new(&encoder_config, bidirectional, &cell, device);

        let decoder = AttentionDecoderConfig::new(
            hidden,
            hidden,
            config.output_dim,
            config.decoder_depth,
            config.output_length,
        )
        .with_dropout(config.dropout)
        .with_unroll(config.unroll)
        .with_stateful(config.stateful)
        .with_input_length(input_length)
        .init(&cell, device);

        Ok(AttentionSeq2Seq {
            encoder,
            decoder,
            architecture: Ignored(config),
        })
    }
}

#[derive(Module, Debug)]
pub struct AttentionSeq2Seq<B: Backend> {
    encoder: AttentionEncoder<B>,
    decoder: AttentionDecoder<B>,
    architecture: Ignored<ArchitectureConfig>,
}

impl<B: Backend> AttentionSeq2Seq<B> {
    pub fn encoder(&self) -> &AttentionEncoder<B> {
        &self.encoder
    }

    pub fn decoder(&self) -> &AttentionDecoder<B> {
        &self.decoder
    }

    pub fn architecture(&self) -> &ArchitectureConfig {
        &self.architecture
    }

    /// `[batch, seq, features]` → `[batch, output_length, output_dim]`
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        self.decoder.forward(self.encoder.forward(input))
    }

    /// Outputs together with the attention weights of every output step,
    /// `[batch, output_length, seq]`
    pub fn forward_with_alignments(&self, input: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 3>) {
        self.decoder
            .forward_with_alignments(self.encoder.forward(input))
    }

    /// Run one call of a stateful model, continuing from `state`
    ///
    /// The carried decoder state seeds the attention cell.
    pub fn forward_with_state(
        &self,
        input: Tensor<B, 3>,
        state: Option<Seq2SeqState<B>>,
    ) -> (Tensor<B, 3>, Seq2SeqState<B>) {
        let (encoder_state, decoder_state) =
            Seq2SeqState::unpack(state, self.architecture.stateful);

        let (memory, encoder_carry) = self.encoder.forward_with_state(input, encoder_state);
        let decoded = self.decoder.forward_with_state(memory, decoder_state);

        let state = Seq2SeqState {
            encoder: encoder_carry,
            decoder: decoded.state,
        };
        (decoded.output, state)
    }
}
