//! Recurrent decoder container
//!
//! Generates a fixed number of steps by feeding the stack's previous output
//! back as its next input.
//!
//! ## Step input
//!
//! | `input_mode` | step 0 | step t > 0 |
//! |--------------|--------|------------|
//! | `NoContext` | `r0` | `y(t-1)` |
//! | `ContextOnce` | `r0` | `y(t-1)` |
//! | `ContextEveryStep` | `C + r0` | `C + y(t-1)` |
//!
//! `C` is the context vector and `r0` the initial readout, which defaults to
//! `C` (or zeros without a context). With teacher forcing and a ground-truth
//! sequence, `y(t-1)` is replaced by the true value at step `t-1`.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Dropout, DropoutConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::stack::{run_stack, DropoutPlacement, LayerLayout, StackState};
use crate::cells::{CellSettings, LSTMDecoderCell, LstmState};
use crate::config::DecoderInputMode;
use crate::error::ConfigError;

/// Configuration for [`RecurrentDecoder`].
#[derive(Config, Debug)]
pub struct RecurrentDecoderConfig {
    /// Width of the step input. Must equal the width the stack emits.
    pub d_input: usize,
    pub d_hidden: usize,
    /// Projection width of every cell. `None` emits hidden states.
    pub d_output: Option<usize>,
    pub num_layers: usize,
    /// Number of steps to generate
    pub output_length: usize,
    #[config(default = 0.0)]
    pub dropout: f64,
    #[config(default = "DropoutPlacement::Between")]
    pub dropout_placement: DropoutPlacement,
    #[config(default = "DecoderInputMode::ContextOnce")]
    pub input_mode: DecoderInputMode,
    #[config(default = false)]
    pub teacher_force: bool,
    #[config(default = false)]
    pub state_sync: bool,
    #[config(default = false)]
    pub unroll: bool,
    #[config(default = false)]
    pub stateful: bool,
    pub input_length: Option<usize>,
}

impl RecurrentDecoderConfig {
    fn output_width(&self) -> usize {
        self.d_output.unwrap_or(self.d_hidden)
    }

    /// Outputs are fed back as inputs, so both widths must agree
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_width() != self.d_input {
            return Err(ConfigError::IncompatibleOptions(format!(
                "decoder emits {} features but consumes {}",
                self.output_width(),
                self.d_input
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, cell: &CellSettings, device: &B::Device) -> RecurrentDecoder<B> {
        let layout = LayerLayout::with_placement(self.dropout_placement, self.num_layers);
        let width = self.output_width();

        let cells = (0..self.num_layers)
            .map(|i| {
                let d_input = if i == 0 { self.d_input } else { width };
                cell.decoder(d_input, self.d_hidden, self.d_output)
                    .init(device)
            })
            .collect();

        let dropouts = (0..layout.dropout_count())
            .map(|_| DropoutConfig::new(self.dropout).init())
            .collect();

        log::debug!(
            "decoder stack: {:?} ({:?}, {} steps)",
            layout.kinds(),
            self.input_mode,
            self.output_length
        );

        RecurrentDecoder {
            cells,
            dropouts,
            layout: Ignored(layout),
            settings: Ignored(DecoderSettings {
                input_size: self.d_input,
                hidden_size: self.d_hidden,
                output_size: width,
                output_length: self.output_length,
                input_mode: self.input_mode,
                teacher_force: self.teacher_force,
                state_sync: self.state_sync,
                unroll: self.unroll,
                stateful: self.stateful,
                input_length: self.input_length,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderSettings {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub output_length: usize,
    pub input_mode: DecoderInputMode,
    pub teacher_force: bool,
    pub state_sync: bool,
    pub unroll: bool,
    pub stateful: bool,
    pub input_length: Option<usize>,
}

/// Everything a decoder call may receive besides its weights.
#[derive(Clone, Debug)]
pub struct DecoderInputs<B: Backend> {
    /// Context vector `[batch, input_size]`
    pub input: Option<Tensor<B, 2>>,
    /// `[batch, output_length, output_size]`
    pub ground_truth: Option<Tensor<B, 3>>,
    pub initial_readout: Option<Tensor<B, 2>>,
    pub initial_state: Option<LstmState<B>>,
    batch_size: usize,
    device: B::Device,
}

impl<B: Backend> DecoderInputs<B> {
    pub fn new(batch_size: usize, device: &B::Device) -> Self {
        Self {
            input: None,
            ground_truth: None,
            initial_readout: None,
            initial_state: None,
            batch_size,
            device: device.clone(),
        }
    }

    /// Inputs carrying a context vector
    pub fn from_context(context: Tensor<B, 2>) -> Self {
        let [batch_size, _] = context.dims();
        Self::new(batch_size, &context.device()).with_input(context)
    }

    /// Inputs carrying only an initial state
    pub fn from_state(state: LstmState<B>) -> Self {
        let [batch_size, _] = state.hidden.dims();
        Self::new(batch_size, &state.hidden.device()).with_initial_state(Some(state))
    }

    pub fn with_input(mut self, input: Tensor<B, 2>) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_ground_truth(mut self, ground_truth: Option<Tensor<B, 3>>) -> Self {
        self.ground_truth = ground_truth;
        self
    }

    pub fn with_initial_readout(mut self, readout: Tensor<B, 2>) -> Self {
        self.initial_readout = Some(readout);
        self
    }

    pub fn with_initial_state(mut self, state: Option<LstmState<B>>) -> Self {
        self.initial_state = state;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[derive(Module, Debug)]
pub struct RecurrentDecoder<B: Backend> {
    cells: Vec<LSTMDecoderCell<B>>,
    dropouts: Vec<Dropout>,
    layout: Ignored<LayerLayout>,
    settings: Ignored<DecoderSettings>,
}

impl<B: Backend> RecurrentDecoder<B> {
    pub fn layout(&self) -> &LayerLayout {
        &self.layout
    }

    pub fn settings(&self) -> &DecoderSettings {
        &self.settings
    }

    pub fn cells(&self) -> &[LSTMDecoderCell<B>] {
        &self.cells
    }

    pub fn input_size(&self) -> usize {
        self.settings.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.settings.hidden_size
    }

    pub fn output_size(&self) -> usize {
        self.settings.output_size
    }

    pub fn output_length(&self) -> usize {
        self.settings.output_length
    }

    pub fn input_mode(&self) -> DecoderInputMode {
        self.settings.input_mode
    }

    pub fn teacher_force(&self) -> bool {
        self.settings.teacher_force
    }

    pub fn unroll(&self) -> bool {
        self.settings.unroll
    }

    pub fn stateful(&self) -> bool {
        self.settings.stateful
    }

    pub fn input_length(&self) -> Option<usize> {
        self.settings.input_length
    }

    /// Generate `[batch, output_length, output_size]`
    pub fn forward(&self, inputs: DecoderInputs<B>) -> Tensor<B, 3> {
        self.forward_with_state(inputs).0
    }

    /// Generate a sequence and return the top cell's final state with it
    pub fn forward_with_state(&self, inputs: DecoderInputs<B>) -> (Tensor<B, 3>, LstmState<B>) {
        let DecoderInputs {
            input,
            ground_truth,
            initial_readout,
            initial_state,
            batch_size,
            device,
        } = inputs;

        let context = input.filter(|_| self.settings.input_mode.uses_context());
        let truth = ground_truth.filter(|_| self.settings.teacher_force);

        let mut readout = initial_readout
            .or_else(|| context.clone())
            .unwrap_or_else(|| Tensor::zeros([batch_size, self.settings.input_size], &device));

        let mut stack = StackState::init(
            &self.cells,
            self.settings.state_sync,
            batch_size,
            initial_state,
            &device,
        );

        let mut outputs: Vec<Tensor<B, 2>> = Vec::with_capacity(self.settings.output_length);

        for t in 0..self.settings.output_length {
            let fed = match &truth {
                Some(truth) if t > 0 => truth.clone().narrow(1, t - 1, 1).squeeze::<2>(1),
                _ => readout,
            };

            let step_input = match (&self.settings.input_mode, &context) {
                (DecoderInputMode::ContextEveryStep, Some(context)) => context.clone() + fed,
                _ => fed,
            };

            let output = run_stack(
                self.layout.kinds(),
                &self.cells,
                &self.dropouts,
                step_input,
                &mut stack,
            );
            readout = output.clone();
            outputs.push(output);
        }

        let carry = stack
            .last()
            .cloned()
            .unwrap_or_else(|| LstmState::zeros(batch_size, self.settings.hidden_size, &device));

        (Tensor::stack::<3>(outputs, 1), carry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rnn::LayerKind;
    use burn::backend::NdArray;
    use burn::tensor::backend::Backend as BurnBackend;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;
    type TestDevice = <TestBackend as BurnBackend>::Device;

    fn get_test_device() -> TestDevice {
        Default::default()
    }

    fn decoder(config: RecurrentDecoderConfig) -> RecurrentDecoder<TestBackend> {
        config.validate().unwrap();
        config.init(&CellSettings::default(), &get_test_device())
    }

    fn max_abs_diff(a: Tensor<TestBackend, 3>, b: Tensor<TestBackend, 3>) -> f32 {
        (a - b).abs().max().into_scalar()
    }

    #[test]
    fn test_validate_rejects_width_mismatch() {
        let config = RecurrentDecoderConfig::new(3, 16, 1, 5).with_d_output(Some(4));
        assert!(matches!(config.validate(), Err(ConfigError::IncompatibleOptions(_))));

        let config = RecurrentDecoderConfig::new(16, 16, 1, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_decoder_layout() {
        let decoder = decoder(
            RecurrentDecoderConfig::new(4, 16, 2, 6)
                .with_d_output(Some(4))
                .with_dropout_placement(DropoutPlacement::Before),
        );

        assert_eq!(
            decoder.layout().kinds(),
            &[
                LayerKind::Dropout,
                LayerKind::Cell,
                LayerKind::Dropout,
                LayerKind::Cell,
            ]
        );
        assert!(decoder.cells().iter().all(|cell| cell.has_projection()));
    }

    #[test]
    fn test_decoder_output_shape() {
        let decoder = decoder(RecurrentDecoderConfig::new(4, 16, 2, 6).with_d_output(Some(4)));
        let device = get_test_device();

        let context = Tensor::<TestBackend, 2>::random([3, 4], Distribution::Default, &device);
        let (output, state) = decoder.forward_with_state(DecoderInputs::from_context(context));

        assert_eq!(output.dims(), [3, 6, 4]);
        assert_eq!(state.hidden.dims(), [3, 16]);
    }

    #[test]
    fn test_initial_state_changes_output() {
        let decoder = decoder(RecurrentDecoderConfig::new(4, 8, 1, 3).with_d_output(Some(4)));
        let device = get_test_device();
        let context = Tensor::<TestBackend, 2>::random([2, 4], Distribution::Default, &device);

        let state = LstmState::new(
            Tensor::random([2, 8], Distribution::Default, &device),
            Tensor::random([2, 8], Distribution::Default, &device),
        );

        let plain = decoder.forward(DecoderInputs::from_context(context.clone()));
        let seeded = decoder.forward(
            DecoderInputs::from_context(context).with_initial_state(Some(state)),
        );

        assert!(max_abs_diff(plain, seeded) > 0.0);
    }

    #[test]
    fn test_no_context_runs_from_state() {
        let decoder = decoder(
            RecurrentDecoderConfig::new(4, 8, 1, 5)
                .with_d_output(Some(4))
                .with_input_mode(DecoderInputMode::NoContext),
        );
        let device = get_test_device();

        let state = LstmState::zeros(2, 8, &device);
        let output = decoder.forward(DecoderInputs::from_state(state));

        assert_eq!(output.dims(), [2, 5, 4]);
    }

    #[test]
    fn test_peek_first_step_sees_doubled_context() {
        let device = get_test_device();
        let once = decoder(RecurrentDecoderConfig::new(4, 8, 1, 1).with_d_output(Some(4)));
        let every = RecurrentDecoder {
            settings: Ignored(DecoderSettings {
                input_mode: DecoderInputMode::ContextEveryStep,
                ..once.settings().clone()
            }),
            ..once.clone()
        };

        let context = Tensor::<TestBackend, 2>::random([2, 4], Distribution::Default, &device);

        let peeked = every.forward(DecoderInputs::from_context(context.clone()));
        let doubled = once.forward(DecoderInputs::from_context(context.clone() * 2.0));

        assert!(max_abs_diff(peeked, doubled) < 1e-6);
    }

    #[test]
    fn test_teacher_forcing_uses_ground_truth() {
        let device = get_test_device();
        let free = decoder(RecurrentDecoderConfig::new(4, 8, 1, 4).with_d_output(Some(4)));
        let forced = RecurrentDecoder {
            settings: Ignored(DecoderSettings {
                teacher_force: true,
                ..free.settings().clone()
            }),
            ..free.clone()
        };

        let context = Tensor::<TestBackend, 2>::random([2, 4], Distribution::Default, &device);
        let truth = Tensor::<TestBackend, 3>::random([2, 4, 4], Distribution::Default, &device);

        // Without a ground truth the forced decoder runs on its own predictions
        let a = free.forward(DecoderInputs::from_context(context.clone()));
        let b = forced.forward(DecoderInputs::from_context(context.clone()));
        assert!(max_abs_diff(a.clone(), b) < 1e-6);

        let c = forced.forward(
            DecoderInputs::from_context(context.clone()).with_ground_truth(Some(truth.clone())),
        );
        // The first step only sees the context
        let first = |x: Tensor<TestBackend, 3>| x.narrow(1, 0, 1);
        assert!(max_abs_diff(first(a.clone()), first(c.clone())) < 1e-6);
        assert!(max_abs_diff(a.clone(), c) > 0.0);

        // The free-running decoder ignores ground truth
        let inputs = DecoderInputs::from_context(context).with_ground_truth(Some(truth));
        let d = free.forward(inputs);
        assert!(max_abs_diff(a, d) < 1e-6);
    }
}
