//! Recurrent encoder container
//!
//! Unrolls a stack of [`LSTMCell`]s over an input sequence.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Dropout, DropoutConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::stack::{run_stack, DropoutPlacement, LayerLayout, StackState};
use crate::cells::{CellSettings, LSTMCell, LstmState};

/// Configuration for [`RecurrentEncoder`].
#[derive(Config, Debug)]
pub struct RecurrentEncoderConfig {
    /// Number of input features
    pub d_input: usize,
    /// Hidden size of every cell
    pub d_hidden: usize,
    /// Number of stacked cells
    pub num_layers: usize,
    #[config(default = 0.0)]
    pub dropout: f64,
    #[config(default = "DropoutPlacement::Between")]
    pub dropout_placement: DropoutPlacement,
    /// Emit every timestep instead of only the last one
    #[config(default = false)]
    pub return_sequences: bool,
    /// Export the final state of the top cell
    #[config(default = false)]
    pub return_states: bool,
    /// Share one state across the cells of the stack
    #[config(default = false)]
    pub state_sync: bool,
    /// Add the previous output to the next input
    #[config(default = false)]
    pub readout: bool,
    #[config(default = false)]
    pub unroll: bool,
    #[config(default = false)]
    pub stateful: bool,
    pub input_length: Option<usize>,
}

impl RecurrentEncoderConfig {
    pub fn init<B: Backend>(&self, cell: &CellSettings, device: &B::Device) -> RecurrentEncoder<B> {
        let layout = LayerLayout::with_placement(self.dropout_placement, self.num_layers);

        let cells = (0..self.num_layers)
            .map(|i| {
                let d_input = if i == 0 { self.d_input } else { self.d_hidden };
                cell.lstm(d_input, self.d_hidden).init(device)
            })
            .collect();

        let dropouts = (0..layout.dropout_count())
            .map(|_| DropoutConfig::new(self.dropout).init())
            .collect();

        log::debug!(
            "encoder stack: {:?} ({} -> {})",
            layout.kinds(),
            self.d_input,
            self.d_hidden
        );

        RecurrentEncoder {
            cells,
            dropouts,
            layout: Ignored(layout),
            settings: Ignored(EncoderSettings {
                input_size: self.d_input,
                hidden_size: self.d_hidden,
                return_sequences: self.return_sequences,
                return_states: self.return_states,
                state_sync: self.state_sync,
                readout: self.readout,
                unroll: self.unroll,
                stateful: self.stateful,
                input_length: self.input_length,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderSettings {
    pub input_size: usize,
    pub hidden_size: usize,
    pub return_sequences: bool,
    pub return_states: bool,
    pub state_sync: bool,
    pub readout: bool,
    pub unroll: bool,
    pub stateful: bool,
    pub input_length: Option<usize>,
}

/// Encoder result.
#[derive(Clone, Debug)]
pub struct EncoderOutput<B: Backend> {
    /// `[batch, seq, hidden]` with `return_sequences`, otherwise `[batch, 1, hidden]`
    pub output: Tensor<B, 3>,
    /// Final state of the top cell, present with `return_states`
    pub state: Option<LstmState<B>>,
    /// Final state of the top cell, always present; pass it back through
    /// [`RecurrentEncoder::forward_with_state`] to carry state across calls
    pub carry: LstmState<B>,
}

impl<B: Backend> EncoderOutput<B> {
    /// Output at the last timestep, `[batch, hidden]`
    pub fn summary(&self) -> Tensor<B, 2> {
        let [_, seq_len, _] = self.output.dims();
        self.output
            .clone()
            .narrow(1, seq_len - 1, 1)
            .squeeze::<2>(1)
    }
}

#[derive(Module, Debug)]
pub struct RecurrentEncoder<B: Backend> {
    cells: Vec<LSTMCell<B>>,
    dropouts: Vec<Dropout>,
    layout: Ignored<LayerLayout>,
    settings: Ignored<EncoderSettings>,
}

impl<B: Backend> RecurrentEncoder<B> {
    pub fn layout(&self) -> &LayerLayout {
        &self.layout
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    pub fn cells(&self) -> &[LSTMCell<B>] {
        &self.cells
    }

    pub fn input_size(&self) -> usize {
        self.settings.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.settings.hidden_size
    }

    pub fn return_sequences(&self) -> bool {
        self.settings.return_sequences
    }

    pub fn return_states(&self) -> bool {
        self.settings.return_states
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

    /// Encode a `[batch, seq, features]` sequence from a zero state
    pub fn forward(&self, input: Tensor<B, 3>) -> EncoderOutput<B> {
        self.forward_with_state(input, None)
    }

    /// Encode a sequence starting from a carried `state`
    ///
    /// The state seeds the shared stack state with `state_sync`, and the
    /// lowest cell otherwise. Only a `stateful` encoder accepts one; any
    /// other encoder starts from zeros.
    pub fn forward_with_state(
        &self,
        input: Tensor<B, 3>,
        state: Option<LstmState<B>>,
    ) -> EncoderOutput<B> {
        let device = input.device();
        let [batch_size, seq_len, _] = input.dims();

        let state = match state {
            Some(_) if !self.settings.stateful => {
                log::warn!("encoder is not stateful, ignoring the carried state");
                None
            }
            state => state,
        };

        let mut stack = StackState::init(
            &self.cells,
            self.settings.state_sync,
            batch_size,
            state,
            &device,
        );

        let hidden_size = self.settings.hidden_size;
        let mut previous = Tensor::<B, 2>::zeros([batch_size, hidden_size], &device);
        let mut outputs: Vec<Tensor<B, 2>> = Vec::with_capacity(seq_len);

        for t in 0..seq_len {
            let mut step_input = input.clone().narrow(1, t, 1).squeeze::<2>(1);
            if self.settings.readout {
                step_input = step_input + previous;
            }

            let output = run_stack(
                self.layout.kinds(),
                &self.cells,
                &self.dropouts,
                step_input,
                &mut stack,
            );
            previous = output.clone();

            if self.settings.return_sequences || t == seq_len - 1 {
                outputs.push(output);
            }
        }

        let carry = stack
            .last()
            .cloned()
            .unwrap_or_else(|| LstmState::zeros(batch_size, hidden_size, &device));

        EncoderOutput {
            output: Tensor::stack(outputs, 1),
            state: self.settings.return_states.then(|| carry.clone()),
            carry,
        }
    }
}
