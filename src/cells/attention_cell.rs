//! Attention decoder cell
//!
//! At every output step the cell:
//!
//! ```text
//! e(j)   = v · tanh(W_s · s(i-1) + W_h · H(j))     alignment score per input step
//! α(j)   = softmax_j(e(j))                         distribution over input steps
//! c(i)   = Σ_j α(j) · H(j)                         context vector
//! s(i)   = LSTM(s(i-1), [c(i), y(i-1)])
//! y(i)   = W_o · h(i) + b_o
//! ```
//!
//! `H` is the encoder's full output sequence (the memory bank) and `s` the
//! cell's own LSTM state.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::{LSTMCell, LSTMCellConfig, LstmState};

/// Configuration for [`AttentionDecoderCell`].
#[derive(Config, Debug)]
pub struct AttentionDecoderCellConfig {
    /// Width of the fed-back previous output
    pub d_input: usize,
    /// Width of each memory bank entry
    pub d_memory: usize,
    /// Width of the LSTM state and of the scoring network
    pub d_hidden: usize,
    /// Width of the emitted output
    pub d_output: usize,
    #[config(default = true)]
    pub bias: bool,
    #[config(default = 1.0)]
    pub forget_bias: f64,
}

impl AttentionDecoderCellConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AttentionDecoderCell<B> {
        AttentionDecoderCell {
            input_size: self.d_input,
            memory_size: self.d_memory,
            output_size: self.d_output,
            memory_proj: LinearConfig::new(self.d_memory, self.d_hidden)
                .with_bias(false)
                .init(device),
            state_proj: LinearConfig::new(self.d_hidden, self.d_hidden).init(device),
            score: LinearConfig::new(self.d_hidden, 1)
                .with_bias(false)
                .init(device),
            lstm: LSTMCellConfig::new(self.d_memory + self.d_input, self.d_hidden)
                .with_bias(self.bias)
                .with_forget_bias(self.forget_bias)
                .init(device),
            projection: LinearConfig::new(self.d_hidden, self.d_output).init(device),
        }
    }
}

/// Memory bank together with its projection into the scoring space.
///
/// The projection does not depend on the decoder state, so it is computed
/// once per sequence.
#[derive(Clone, Debug)]
pub struct AttendedMemory<B: Backend> {
    /// `[batch, input_length, memory_size]`
    pub memory: Tensor<B, 3>,
    /// `[batch, input_length, hidden_size]`
    pub projected: Tensor<B, 3>,
}

/// Result of one attention decoder step.
#[derive(Clone, Debug)]
pub struct AttentionStep<B: Backend> {
    /// `[batch, output_size]`
    pub output: Tensor<B, 2>,
    pub state: LstmState<B>,
    /// Attention weights, `[batch, input_length]`, each row sums to one
    pub weights: Tensor<B, 2>,
}

#[derive(Module, Debug)]
pub struct AttentionDecoderCell<B: Backend> {
    input_size: usize,
    memory_size: usize,
    output_size: usize,
    memory_proj: Linear<B>,
    state_proj: Linear<B>,
    score: Linear<B>,
    lstm: LSTMCell<B>,
    projection: Linear<B>,
}

impl<B: Backend> AttentionDecoderCell<B> {
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    pub fn hidden_size(&self) -> usize {
        self.lstm.hidden_size()
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn attend(&self, memory: Tensor<B, 3>) -> AttendedMemory<B> {
        let projected = self.memory_proj.forward(memory.clone());
        AttendedMemory { memory, projected }
    }

    /// Attention weights of every memory entry given the previous hidden state
    ///
    /// # Returns
    /// `[batch, input_length]` probabilities
    pub fn alignment(&self, memory: &AttendedMemory<B>, hidden: Tensor<B, 2>) -> Tensor<B, 2> {
        let query = self.state_proj.forward(hidden).unsqueeze_dim::<3>(1);
        let features = (memory.projected.clone() + query).tanh();
        let energy = self.score.forward(features);
        Self::normalize(energy.squeeze::<2>(2))
    }

    /// Softmax over the input-step axis
    pub fn normalize(scores: Tensor<B, 2>) -> Tensor<B, 2> {
        activation::softmax(scores, 1)
    }

    /// Probability-weighted sum of memory entries
    pub fn context(weights: Tensor<B, 2>, memory: Tensor<B, 3>) -> Tensor<B, 2> {
        (memory * weights.unsqueeze_dim::<3>(2))
            .sum_dim(1)
            .squeeze::<2>(1)
    }

    pub fn forward(
        &self,
        input: Tensor<B, 2>,
        state: LstmState<B>,
        memory: &AttendedMemory<B>,
    ) -> AttentionStep<B> {
        let weights = self.alignment(memory, state.hidden.clone());
        let context = Self::context(weights.clone(), memory.memory.clone());

        let step_input = Tensor::cat(vec![context, input], 1);
        let next = self.lstm.forward(step_input, state);
        let output = self.projection.forward(next.hidden.clone());

        AttentionStep {
            output,
            state: next,
            weights,
        }
    }
}
