//! Plain encoder-decoder
//!
//! The encoder's final output is the context vector. It is the decoder's
//! first input; every later step is fed the previous decoder output.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::{prepare, BuilderArgs, Seq2SeqState};
use crate::config::{ArchitectureConfig, ArchitectureFlags, CellOptions, DecoderInputMode, Depth};
use crate::error;
use crate::rnn::{
    DecoderInputs, RecurrentDecoder, RecurrentDecoderConfig, RecurrentEncoder,
    RecurrentEncoderConfig,
};

/// Builder for [`SimpleSeq2Seq`].
#[derive(Config, Debug)]
pub struct SimpleSeq2SeqConfig {
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
    /// Input shape, `unroll`, `stateful` and cell options
    #[config(default = "CellOptions::default()")]
    pub options: CellOptions,
}

impl SimpleSeq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<SimpleSeq2Seq<B>> {
        let (config, features, cell) = prepare(
            "SimpleSeq2Seq",
            BuilderArgs {
                output_dim: self.output_dim,
                output_length: self.output_length,
                hidden_dim: self.hidden_dim,
                depth: self.depth,
                dropout: self.dropout,
                options: &self.options,
            },
            ArchitectureFlags::default(),
        )?;
        let hidden = config.hidden_dim;
        let input_length = config.input_shape.time_steps;

        let decoder_config =
            RecurrentDecoderConfig::new(hidden, hidden, config.decoder_depth, config.output_length)
                .with_dropout(config.dropout)
                .with_input_mode(DecoderInputMode::ContextOnce)
                .with_unroll(config.unroll)
                .with_stateful(config.stateful)
                .with_input_length(input_length);
        decoder_config.validate()?;

        let encoder = RecurrentEncoderConfig::new(features, hidden, config.encoder_depth)
            .with_dropout(config.dropout)
            .with_unroll(config.unroll)
            .with_stateful(config.stateful)
            .with_input_length(input_length)
            .init(&cell, device);

        let decoder = decoder_config.init(&cell, device);

        let readout = (hidden != config.output_dim)
            .then(|| LinearConfig::new(hidden, config.output_dim).init(device));

        Ok(SimpleSeq2Seq {
            encoder,
            decoder,
            readout,
            architecture: Ignored(config),
        })
    }
}

#[derive(Module, Debug)]
pub struct SimpleSeq2Seq<B: Backend> {
    encoder: RecurrentEncoder<B>,
    decoder: RecurrentDecoder<B>,
    /// Maps hidden-width decoder outputs to `output_dim`
    readout: Option<Linear<B>>,
    architecture: Ignored<ArchitectureConfig>,
}

impl<B: Backend> SimpleSeq2Seq<B> {
    pub fn encoder(&self) -> &RecurrentEncoder<B> {
        &self.encoder
    }

    pub fn decoder(&self) -> &RecurrentDecoder<B> {
        &self.decoder
    }

    pub fn architecture(&self) -> &ArchitectureConfig {
        &self.architecture
    }

    /// `[batch, seq, features]` → `[batch, output_length, output_dim]`
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        self.forward_with_state(input, None).0
    }

    /// Run one call of a stateful model, continuing from `state`
    pub fn forward_with_state(
        &self,
        input: Tensor<B, 3>,
        state: Option<Seq2SeqState<B>>,
    ) -> (Tensor<B, 3>, Seq2SeqState<B>) {
        let (encoder_state, decoder_state) =
            Seq2SeqState::unpack(state, self.architecture.stateful);

        let encoded = self.encoder.forward_with_state(input, encoder_state);
        let inputs = DecoderInputs::from_context(encoded.summary())
            .with_initial_state(decoder_state);
        let (output, decoder_carry) = self.decoder.forward_with_state(inputs);

        let output = match &self.readout {
            Some(readout) => readout.forward(output),
            None => output,
        };
        let state = Seq2SeqState {
            encoder: encoded.carry,
            decoder: decoder_carry,
        };

        (output, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn options() -> CellOptions {
        CellOptions::new().with_input_dim(5).with_input_length(7)
    }

    #[test]
    fn test_readout_only_when_widths_differ() {
        let device = Default::default();

        let same = SimpleSeq2SeqConfig::new(6, 3)
            .with_options(options())
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(same.readout.is_none());

        let wide = SimpleSeq2SeqConfig::new(6, 3)
            .with_hidden_dim(Some(12))
            .with_options(options())
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(wide.readout.is_some());
        assert_eq!(wide.decoder().output_size(), 12);
    }

    #[test]
    fn test_input_length_recorded() {
        let device = Default::default();
        let model = SimpleSeq2SeqConfig::new(6, 3)
            .with_options(options().with_unroll(true))
            .init::<TestBackend>(&device)
            .unwrap();

        assert_eq!(model.encoder().input_length(), Some(7));
        assert_eq!(model.decoder().input_length(), Some(7));
        assert!(model.encoder().unroll());
        assert!(model.decoder().unroll());
    }
}
