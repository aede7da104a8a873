//! # Recurrent Cell Implementations
//!
//! Single-timestep cells. The sequence containers in [`crate::rnn`] unroll
//! them over time; the model builders in [`crate::models`] pick which cells
//! go where.
//!
//! ## Cell Types
//!
//! | Cell | Output | Used by |
//! |------|--------|---------|
//! | [`LSTMCell`] | hidden state | every encoder, `SimpleSeq2Seq` decoder |
//! | [`LSTMDecoderCell`] | projected hidden state | `Seq2Seq` decoder, upper attention decoder layers |
//! | [`AttentionDecoderCell`] | projected hidden state + attention weights | lowest `AttentionSeq2Seq` decoder layer |
//!
//! ## Tensor Shapes
//!
//! | Tensor | Shape |
//! |--------|-------|
//! | `input` | `[batch, input_size]` |
//! | `state.hidden`, `state.cell` | `[batch, hidden_size]` |
//! | `output` | `[batch, output_size]` |
//! | attention memory | `[batch, input_length, memory_size]` |
//!
//! ## Example
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use seq2seq::cells::{LSTMDecoderCellConfig, LstmState};
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let cell = LSTMDecoderCellConfig::new(4, 16)
//!     .with_d_output(Some(4))
//!     .init::<Backend>(&device);
//!
//! let input = Tensor::<Backend, 2>::zeros([2, 4], &device);
//! let (output, state) = cell.forward(input, LstmState::zeros(2, 16, &device));
//!
//! assert_eq!(output.dims(), [2, 4]);
//! assert_eq!(state.hidden.dims(), [2, 16]);
//! ```

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

pub mod attention_cell;
pub mod decoder_cell;
pub mod lstm_cell;
pub mod settings;

pub use attention_cell::{
    AttendedMemory, AttentionDecoderCell, AttentionDecoderCellConfig, AttentionStep,
};
pub use decoder_cell::{LSTMDecoderCell, LSTMDecoderCellConfig};
pub use lstm_cell::{LSTMCell, LSTMCellConfig, LstmState};
pub use settings::CellSettings;

/// A cell that maps one input step and the previous state to an output and
/// the next state.
pub trait RecurrentCell<B: Backend> {
    fn input_size(&self) -> usize;

    fn hidden_size(&self) -> usize;

    fn output_size(&self) -> usize;

    fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> (Tensor<B, 2>, LstmState<B>);
}
