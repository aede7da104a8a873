//! Attention decoder container
//!
//! Layout for `n` layers:
//!
//! ```text
//! [Dropout, Attention] + [Dropout, Cell] × (n - 1)
//! ```
//!
//! The leading dropout acts on the memory bank. Attention is computed once
//! per step on the lowest layer; the upper cells refine its output. With a
//! single layer the attention cell projects straight to the output width,
//! otherwise it emits `hidden` features and the top cell projects.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Dropout, DropoutConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::stack::{run_stack, LayerKind, LayerLayout, StackState};
use crate::cells::{AttentionDecoderCell, CellSettings, LSTMDecoderCell, LstmState};

/// Configuration for [`AttentionDecoder`].
#[derive(Config, Debug)]
pub struct AttentionDecoderConfig {
    /// Width of each memory bank entry
    pub d_memory: usize,
    pub d_hidden: usize,
    pub d_output: usize,
    pub num_layers: usize,
    pub output_length: usize,
    #[config(default = 0.0)]
    pub dropout: f64,
    #[config(default = false)]
    pub unroll: bool,
    #[config(default = false)]
    pub stateful: bool,
    pub input_length: Option<usize>,
}

impl AttentionDecoderConfig {
    pub fn init<B: Backend>(&self, cell: &CellSettings, device: &B::Device) -> AttentionDecoder<B> {
        let upper = self.num_layers.saturating_sub(1);
        let attention_width = if upper == 0 {
            self.d_output
        } else {
            self.d_hidden
        };

        let layout = LayerLayout::new()
            .push(LayerKind::Dropout)
            .push(LayerKind::Attention)
            .extend(&LayerLayout::dropout_then_cell(upper));

        let attention = cell
            .attention(self.d_output, self.d_memory, self.d_hidden, attention_width)
            .init(device);

        let cells = (0..upper)
            .map(|i| {
                let d_output = if i + 1 == upper {
                    self.d_output
                } else {
                    self.d_hidden
                };
                cell.decoder(self.d_hidden, self.d_hidden, Some(d_output))
                    .init(device)
            })
            .collect();

        let dropouts = (0..upper)
            .map(|_| DropoutConfig::new(self.dropout).init())
            .collect();

        log::debug!(
            "attention decoder stack: {:?} (memory {} -> {}, {} steps)",
            layout.kinds(),
            self.d_memory,
            self.d_output,
            self.output_length
        );

        AttentionDecoder {
            memory_dropout: DropoutConfig::new(self.dropout).init(),
            attention,
            cells,
            dropouts,
            layout: Ignored(layout),
            settings: Ignored(AttentionDecoderSettings {
                output_size: self.d_output,
                output_length: self.output_length,
                unroll: self.unroll,
                stateful: self.stateful,
                input_length: self.input_length,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttentionDecoderSettings {
    pub output_size: usize,
    pub output_length: usize,
    pub unroll: bool,
    pub stateful: bool,
    pub input_length: Option<usize>,
}

/// Attention decoder result.
#[derive(Clone, Debug)]
pub struct AttentionDecoderOutput<B: Backend> {
    /// `[batch, output_length, output]`
    pub output: Tensor<B, 3>,
    /// `[batch, output_length, input_length]`
    pub alignments: Tensor<B, 3>,
    /// Final state of the attention cell
    pub state: LstmState<B>,
}

#[derive(Module, Debug)]
pub struct AttentionDecoder<B: Backend> {
    memory_dropout: Dropout,
    attention: AttentionDecoderCell<B>,
    cells: Vec<LSTMDecoderCell<B>>,
    dropouts: Vec<Dropout>,
    layout: Ignored<LayerLayout>,
    settings: Ignored<AttentionDecoderSettings>,
}

impl<B: Backend> AttentionDecoder<B> {
    /// Full stack layout, attention layer included
    pub fn layout(&self) -> &LayerLayout {
        &self.layout
    }

    pub fn attention(&self) -> &AttentionDecoderCell<B> {
        &self.attention
    }

    pub fn cells(&self) -> &[LSTMDecoderCell<B>] {
        &self.cells
    }

    pub fn output_size(&self) -> usize {
        self.settings.output_size
    }

    pub fn output_length(&self) -> usize {
        self.settings.output_length
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

    /// Decode from a `[batch, input_length, memory]` bank
    pub fn forward(&self, memory: Tensor<B, 3>) -> Tensor<B, 3> {
        self.forward_with_state(memory, None).output
    }

    /// # Returns
    /// `(outputs [batch, output_length, output], weights [batch, output_length, input_length])`
    pub fn forward_with_alignments(&self, memory: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 3>) {
        let decoded = self.forward_with_state(memory, None);
        (decoded.output, decoded.alignments)
    }

    /// Decode with the attention cell seeded from a carried `state`
    ///
    /// Only a `stateful` decoder accepts one; any other decoder starts from
    /// zeros.
    pub fn forward_with_state(
        &self,
        memory: Tensor<B, 3>,
        state: Option<LstmState<B>>,
    ) -> AttentionDecoderOutput<B> {
        let device = memory.device();
        let [batch_size, _, _] = memory.dims();
        let output_length = self.settings.output_length;

        let state = match state {
            Some(_) if !self.settings.stateful => {
                log::warn!("attention decoder is not stateful, ignoring the carried state");
                None
            }
            state => state,
        };

        let memory = self.attention.attend(self.memory_dropout.forward(memory));

        // Entries after the attention layer: the upper cells and their dropouts
        let upper = &self.layout.kinds()[2..];

        let mut attention_state = match state {
            Some(state) => state,
            None => LstmState::zeros(batch_size, self.attention.hidden_size(), &device),
        };
        let mut stack = StackState::init(&self.cells, false, batch_size, None, &device);
        let mut previous = Tensor::<B, 2>::zeros([batch_size, self.settings.output_size], &device);

        let mut outputs: Vec<Tensor<B, 2>> = Vec::with_capacity(output_length);
        let mut alignments: Vec<Tensor<B, 2>> = Vec::with_capacity(output_length);

        for _ in 0..output_length {
            let step = self.attention.forward(previous, attention_state, &memory);
            attention_state = step.state;
            alignments.push(step.weights);

            let output = run_stack(upper, &self.cells, &self.dropouts, step.output, &mut stack);
            previous = output.clone();
            outputs.push(output);
        }

        AttentionDecoderOutput {
            output: Tensor::stack::<3>(outputs, 1),
            alignments: Tensor::stack::<3>(alignments, 1),
            state: attention_state,
        }
    }
}
