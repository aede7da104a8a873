//! # Sequence Containers
//!
//! Containers unroll stacks of cells from [`crate::cells`] over time and keep
//! track of recurrent state. The model builders in [`crate::models`] wire
//! them together; they can also be used on their own.
//!
//! ## Available Containers
//!
//! | Container | Role | Stack |
//! |-----------|------|-------|
//! | [`RecurrentEncoder`] | sequence → final output or full sequence | `LSTMCell`s |
//! | [`RecurrentDecoder`] | context/state → fixed-length sequence | `LSTMDecoderCell`s |
//! | [`AttentionEncoder`] | sequence → memory bank, optionally bidirectional | two `RecurrentEncoder`s |
//! | [`AttentionDecoder`] | memory bank → fixed-length sequence + alignments | `AttentionDecoderCell` + `LSTMDecoderCell`s |
//!
//! Every container owns a [`LayerLayout`] describing how its cells and
//! dropout layers interleave:
//!
//! | Constructor | Layout for 3 cells |
//! |-------------|--------------------|
//! | [`LayerLayout::interleaved`] | `C D C D C` |
//! | [`LayerLayout::cell_then_dropout`] | `C D C D C D` |
//! | [`LayerLayout::dropout_then_cell`] | `D C D C D C` |
//!
//! ## Tensor Shapes
//!
//! | Tensor | Shape |
//! |--------|-------|
//! | encoder input | `[batch, seq_len, features]` |
//! | encoder output, `return_sequences=true` | `[batch, seq_len, hidden]` |
//! | encoder output, `return_sequences=false` | `[batch, 1, hidden]` |
//! | decoder output | `[batch, output_length, output]` |
//! | attention weights | `[batch, output_length, seq_len]` |
//!
//! ## State
//!
//! With `state_sync` one `(h, c)` pair is threaded through every cell of
//! the stack within a timestep; otherwise each cell keeps its own. The
//! exported state is always the top cell's.
//!
//! ```ignore
//! let encoder = RecurrentEncoderConfig::new(8, 32, 2)
//!     .with_stateful(true)
//!     .init::<Backend>(&CellSettings::default(), &device);
//!
//! let first = encoder.forward(batch1);
//! let second = encoder.forward_with_state(batch2, Some(first.carry));
//! ```
//!
//! `unroll` is recorded on every container for introspection. Burn executes
//! eagerly, so it does not change the computation.

pub mod attention;
pub mod bidirectional;
pub mod decoder;
pub mod encoder;
pub mod stack;

pub use attention::{
    AttentionDecoder, AttentionDecoderConfig, AttentionDecoderOutput, AttentionDecoderSettings,
};
pub use bidirectional::{reverse_time, AttentionEncoder};
pub use decoder::{DecoderInputs, DecoderSettings, RecurrentDecoder, RecurrentDecoderConfig};
pub use encoder::{EncoderOutput, EncoderSettings, RecurrentEncoder, RecurrentEncoderConfig};
pub use stack::{run_stack, DropoutPlacement, LayerKind, LayerLayout, StackState};
