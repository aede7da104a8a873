//! LSTM decoder cell
//!
//! An LSTM followed by an output projection, so the decoder can emit vectors
//! of a different width than its hidden state and feed them back as input.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::{LSTMCell, LSTMCellConfig, LstmState, RecurrentCell};

/// Configuration for [`LSTMDecoderCell`].
#[derive(Config, Debug)]
pub struct LSTMDecoderCellConfig {
    /// Width of the fed-back input
    pub d_input: usize,
    /// Width of the LSTM state
    pub d_hidden: usize,
    /// Width of the emitted output. `None` emits the hidden state directly.
    pub d_output: Option<usize>,
    #[config(default = true)]
    pub bias: bool,
    #[config(default = 1.0)]
    pub forget_bias: f64,
}

impl LSTMDecoderCellConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LSTMDecoderCell<B> {
        let lstm = LSTMCellConfig::new(self.d_input, self.d_hidden)
            .with_bias(self.bias)
            .with_forget_bias(self.forget_bias)
            .init(device);

        let projection = self
            .d_output
            .map(|d_output| LinearConfig::new(self.d_hidden, d_output).init(device));

        LSTMDecoderCell {
            output_size: self.d_output.unwrap_or(self.d_hidden),
            lstm,
            projection,
        }
    }
}

/// y(t) = W·LSTM(s(t-1), x(t)) + b
#[derive(Module, Debug)]
pub struct LSTMDecoderCell<B: Backend> {
    output_size: usize,
    lstm: LSTMCell<B>,
    projection: Option<Linear<B>>,
}

impl<B: Backend> LSTMDecoderCell<B> {
    pub fn lstm(&self) -> &LSTMCell<B> {
        &self.lstm
    }

    pub fn has_projection(&self) -> bool {
        self.projection.is_some()
    }

    pub fn forward(
        &self,
        input: Tensor<B, 2>,
        state: LstmState<B>,
    ) -> (Tensor<B, 2>, LstmState<B>) {
        let next = self.lstm.forward(input, state);
        let output = match &self.projection {
            Some(projection) => projection.forward(next.hidden.clone()),
            None => next.hidden.clone(),
        };
        (output, next)
    }
}

impl<B: Backend> RecurrentCell<B> for LSTMDecoderCell<B> {
    fn input_size(&self) -> usize {
        self.lstm.input_size()
    }

    fn hidden_size(&self) -> usize {
        self.lstm.hidden_size()
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> (Tensor<B, 2>, LstmState<B>) {
        self.forward(input, state)
    }
}
