//! State-broadcasting encoder-decoder
//!
//! ```text
//! x ──(input projection)──► encoder ──► last output ──(context projection)──► C
//!                              │
//!                              └── final (h, c) ──(broadcast_state)──► decoder state
//! ```
//!
//! The encoder adds its previous output to each new input. The decoder
//! receives `C` according to its [`DecoderInputMode`] and, with teacher
//! forcing, the ground-truth sequence in place of its own predictions.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::{prepare, BuilderArgs, Seq2SeqState};
use crate::cells::LstmState;
use crate::config::{ArchitectureConfig, ArchitectureFlags, CellOptions, DecoderInputMode, Depth};
use crate::error::{self, ConfigError};
use crate::rnn::{
    DecoderInputs, DropoutPlacement, EncoderOutput, RecurrentDecoder, RecurrentDecoderConfig,
    RecurrentEncoder, RecurrentEncoderConfig,
};

/// Builder for [`Seq2Seq`].
#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
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
    /// Seed the decoder with the encoder's final state
    #[config(default = true)]
    pub broadcast_state: bool,
    /// Share one state across the cells of each stack
    #[config(default = true)]
    pub inner_broadcast_state: bool,
    /// Feed ground truth instead of predictions when it is supplied
    #[config(default = false)]
    pub teacher_force: bool,
    #[config(default = "DecoderInputMode::ContextOnce")]
    pub decoder_input: DecoderInputMode,
    /// Project input features to `hidden_dim`; without it they must already match
    #[config(default = true)]
    pub project_input: bool,
    /// Input shape, `unroll`, `stateful` and cell options
    #[config(default = "CellOptions::default()")]
    pub options: CellOptions,
}

impl Seq2SeqConfig {
    /// Add the context vector to every decoder input instead of only the first
    pub fn with_peek(mut self, peek: bool) -> Self {
        self.decoder_input = DecoderInputMode::from_peek(peek);
        self
    }

    pub fn peek(&self) -> bool {
        self.decoder_input == DecoderInputMode::ContextEveryStep
    }

    fn flags(&self) -> ArchitectureFlags {
        ArchitectureFlags {
            broadcast_state: self.broadcast_state,
            inner_broadcast_state: self.inner_broadcast_state,
            teacher_force: self.teacher_force,
            decoder_input: self.decoder_input,
            bidirectional: false,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<Seq2Seq<B>> {
        let (config, features, cell) = prepare(
            "Seq2Seq",
            BuilderArgs {
                output_dim: self.output_dim,
                output_length: self.output_length,
                hidden_dim: self.hidden_dim,
                depth: self.depth,
                dropout: self.dropout,
                options: &self.options,
            },
            self.flags(),
        )?;
        let hidden = config.hidden_dim;
        let flags = config.flags;
        let input_length = config.input_shape.time_steps;

        if !self.project_input && features != hidden {
            return Err(ConfigError::IncompatibleOptions(format!(
                "unprojected input features ({features}) must equal hidden_dim ({hidden})"
            ))
            .into());
        }

        let decoder_config = RecurrentDecoderConfig::new(
            config.output_dim,
            hidden,
            config.decoder_depth,
            config.output_length,
        )
        .with_d_output(Some(config.output_dim))
        .with_dropout(config.dropout)
        .with_dropout_placement(DropoutPlacement::Before)
        .with_input_mode(flags.decoder_input)
        .with_teacher_force(flags.teacher_force)
        .with_state_sync(flags.inner_broadcast_state)
        .with_unroll(config.unroll)
        .with_stateful(config.stateful)
        .with_input_length(input_length);
        decoder_config.validate()?;

        let input_projection = self
            .project_input
            .then(|| LinearConfig::new(features, hidden).init(device));

        let encoder = RecurrentEncoderConfig::new(hidden, hidden, config.encoder_depth)
            .with_dropout(config.dropout)
            .with_dropout_placement(DropoutPlacement::After)
            .with_readout(true)
            .with_return_states(flags.broadcast_state)
            .with_state_sync(flags.inner_broadcast_state)
            .with_unroll(config.unroll)
            .with_stateful(config.stateful)
            .with_input_length(input_length)
            .init(&cell, device);

        let context_projection = LinearConfig::new(hidden, config.output_dim).init(device);
        let decoder = decoder_config.init(&cell, device);

        Ok(Seq2Seq {
            input_projection,
            encoder,
            context_projection,
            decoder,
            architecture: Ignored(config),
        })
    }
}

#[derive(Module, Debug)]
pub struct Seq2Seq<B: Backend> {
    input_projection: Option<Linear<B>>,
    encoder: RecurrentEncoder<B>,
    context_projection: Linear<B>,
    decoder: RecurrentDecoder<B>,
    architecture: Ignored<ArchitectureConfig>,
}

impl<B: Backend> Seq2Seq<B> {
    pub fn encoder(&self) -> &RecurrentEncoder<B> {
        &self.encoder
    }

    pub fn decoder(&self) -> &RecurrentDecoder<B> {
        &self.decoder
    }

    pub fn architecture(&self) -> &ArchitectureConfig {
        &self.architecture
    }

    /// Run the input projection and the encoder only
    pub fn encode(&self, input: Tensor<B, 3>) -> EncoderOutput<B> {
        self.encode_with_state(input, None)
    }

    /// [`Seq2Seq::encode`] continuing from a carried encoder state
    pub fn encode_with_state(
        &self,
        input: Tensor<B, 3>,
        state: Option<LstmState<B>>,
    ) -> EncoderOutput<B> {
        let input = match &self.input_projection {
            Some(projection) => projection.forward(input),
            None => input,
        };
        self.encoder.forward_with_state(input, state)
    }

    /// Everything the decoder receives for one encoded batch
    pub fn decoder_inputs(
        &self,
        encoded: &EncoderOutput<B>,
        ground_truth: Option<Tensor<B, 3>>,
    ) -> DecoderInputs<B> {
        let context = self.context_projection.forward(encoded.summary());

        DecoderInputs::from_context(context)
            .with_initial_state(encoded.state.clone())
            .with_ground_truth(ground_truth)
    }

    /// `[batch, seq, features]` → `[batch, output_length, output_dim]`
    ///
    /// `ground_truth` (`[batch, output_length, output_dim]`) is only read
    /// when the model was built with teacher forcing.
    pub fn forward(&self, input: Tensor<B, 3>, ground_truth: Option<Tensor<B, 3>>) -> Tensor<B, 3> {
        self.forward_with_state(input, ground_truth, None).0
    }

    /// Run one call of a stateful model, continuing from `state`
    ///
    /// A broadcast encoder state still seeds the decoder; the carried
    /// decoder state is used when nothing is broadcast.
    pub fn forward_with_state(
        &self,
        input: Tensor<B, 3>,
        ground_truth: Option<Tensor<B, 3>>,
        state: Option<Seq2SeqState<B>>,
    ) -> (Tensor<B, 3>, Seq2SeqState<B>) {
        let (encoder_state, decoder_state) =
            Seq2SeqState::unpack(state, self.architecture.stateful);

        let encoded = self.encode_with_state(input, encoder_state);
        let mut inputs = self.decoder_inputs(&encoded, ground_truth);
        if inputs.initial_state.is_none() {
            inputs.initial_state = decoder_state;
        }
        let (output, decoder_carry) = self.decoder.forward_with_state(inputs);

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
    use crate::error::Seq2SeqError;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn config() -> Seq2SeqConfig {
        Seq2SeqConfig::new(4, 6)
            .with_hidden_dim(Some(10))
            .with_options(CellOptions::new().with_input_shape([Some(5), Some(3)]))
    }

    #[test]
    fn test_peek_maps_to_input_mode() {
        let peeked = config().with_peek(true);
        assert!(peeked.peek());
        assert_eq!(peeked.decoder_input, DecoderInputMode::ContextEveryStep);

        let plain = config().with_peek(false);
        assert!(!plain.peek());
        assert_eq!(plain.decoder_input, DecoderInputMode::ContextOnce);
    }

    #[test]
    fn test_unprojected_input_must_match_hidden() {
        let device = Default::default();
        let result = config()
            .with_project_input(false)
            .init::<TestBackend>(&device);

        assert!(matches!(
            result,
            Err(Seq2SeqError::Config(ConfigError::IncompatibleOptions(_)))
        ));

        let model = Seq2SeqConfig::new(4, 6)
            .with_hidden_dim(Some(3))
            .with_project_input(false)
            .with_options(CellOptions::new().with_input_shape([Some(5), Some(3)]))
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(model.input_projection.is_none());
    }

    #[test]
    fn test_no_context_requires_broadcast_state() {
        let device = Default::default();
        let result = config()
            .with_decoder_input(DecoderInputMode::NoContext)
            .with_broadcast_state(false)
            .init::<TestBackend>(&device);

        assert!(matches!(
            result,
            Err(Seq2SeqError::Config(ConfigError::IncompatibleOptions(_)))
        ));
    }

    #[test]
    fn test_container_layouts() {
        let device = Default::default();
        let model = config()
            .with_depth(Depth::Uniform(2))
            .init::<TestBackend>(&device)
            .unwrap();

        use crate::rnn::LayerKind::{Cell, Dropout};
        let encoder_kinds = model.encoder().layout().kinds();
        let decoder_kinds = model.decoder().layout().kinds();
        assert_eq!(encoder_kinds, &[Cell, Dropout, Cell, Dropout]);
        assert_eq!(decoder_kinds, &[Dropout, Cell, Dropout, Cell]);
        assert!(model.encoder().settings().readout);
        assert!(model.encoder().settings().state_sync);
        assert!(model.decoder().settings().state_sync);
    }
}
