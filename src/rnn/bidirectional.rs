//! Memory-bank encoder for attention models
//!
//! Emits the full output sequence. When bidirectional, a second stack with
//! its own weights reads the time-reversed input; its outputs are reversed
//! back and summed with the forward outputs step by step:
//!
//! ```text
//! H(t) = fwd(x)(t) + rev(bwd(rev(x)))(t)
//! ```

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::encoder::{EncoderOutput, RecurrentEncoder, RecurrentEncoderConfig};
use crate::cells::{CellSettings, LstmState};

/// Reverse a `[batch, seq, features]` tensor along the time axis
pub fn reverse_time<B: Backend>(input: Tensor<B, 3>) -> Tensor<B, 3> {
    let [_, seq_len, _] = input.dims();
    let steps = (0..seq_len)
        .rev()
        .map(|t| input.clone().narrow(1, t, 1))
        .collect();
    Tensor::cat(steps, 1)
}

#[derive(Module, Debug)]
pub struct AttentionEncoder<B: Backend> {
    forward_encoder: RecurrentEncoder<B>,
    backward_encoder: Option<RecurrentEncoder<B>>,
}

impl<B: Backend> AttentionEncoder<B> {
    /// Build from a container config; `return_sequences` is always forced on
    pub fn new(
        config: &RecurrentEncoderConfig,
        bidirectional: bool,
        cell: &CellSettings,
        device: &B::Device,
    ) -> Self {
        let config = config.clone().with_return_sequences(true);

        let forward_encoder = config.init(cell, device);
        let backward_encoder = bidirectional.then(|| config.init(cell, device));

        log::debug!("attention encoder: bidirectional={}", bidirectional);

        Self {
            forward_encoder,
            backward_encoder,
        }
    }

    pub fn is_bidirectional(&self) -> bool {
        self.backward_encoder.is_some()
    }

    pub fn forward_encoder(&self) -> &RecurrentEncoder<B> {
        &self.forward_encoder
    }

    pub fn backward_encoder(&self) -> Option<&RecurrentEncoder<B>> {
        self.backward_encoder.as_ref()
    }

    pub fn hidden_size(&self) -> usize {
        self.forward_encoder.hidden_size()
    }

    /// # Returns
    /// Memory bank `[batch, seq, hidden]`
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        self.forward_with_state(input, None).0
    }

    /// Memory bank and the forward direction's final state
    ///
    /// `state` seeds the forward direction only. The backward direction
    /// reads each call from its last step, so it always starts from zeros.
    pub fn forward_with_state(
        &self,
        input: Tensor<B, 3>,
        state: Option<LstmState<B>>,
    ) -> (Tensor<B, 3>, LstmState<B>) {
        let forward = &self.forward_encoder;
        let EncoderOutput { output, carry, .. } = forward.forward_with_state(input.clone(), state);

        let memory = match &self.backward_encoder {
            Some(backward_encoder) => {
                let backward = backward_encoder.forward(reverse_time(input)).output;
                output + reverse_time(backward)
            }
            None => output,
        };

        (memory, carry)
    }
}
