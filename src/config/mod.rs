//! # Architecture Configuration
//!
//! Argument normalization shared by every builder:
//!
//! | Step | Type | Result |
//! |------|------|--------|
//! | Depth | [`Depth`] | `(encoder_depth, decoder_depth)` |
//! | Shape | [`ShapeSpec`] | [`BatchInputShape`] |
//! | Flags | [`ArchitectureFlags`] | validated switch combination |
//! | All of the above | [`ArchitectureConfig`] | normalized config + remaining [`CellOptions`] |
//!
//! Shape conventions are honoured in a fixed order:
//! `batch_input_shape` > `input_shape` > `input_dim` (+ `input_length`).

mod architecture;
mod depth;
mod options;
mod shape;

pub use architecture::{ArchitectureConfig, ArchitectureFlags, DecoderInputMode};
pub use depth::Depth;
pub use options::{
    CellOptions, OptionValue, BATCH_INPUT_SHAPE, INPUT_DIM, INPUT_LENGTH, INPUT_SHAPE, STATEFUL,
    UNROLL,
};
pub use shape::{resolve_input_shape, BatchInputShape, ShapeSpec};
