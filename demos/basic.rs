//! Basic usage of the three encoder-decoder builders
//!
//! Builds each architecture for the same toy problem (sequences of 10 steps
//! with 8 features mapped to 6 steps with 8 features) and runs a forward pass.
//!
//! Set `RUST_LOG=debug` to see how each builder normalizes its arguments.

use burn::backend::NdArray;
use burn::tensor::{Distribution, Tensor};
use seq2seq::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== seq2seq Basic Example ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();

    // Input shape: [batch=4, seq=10, features=8]
    let input = Tensor::<Backend, 3>::random([4, 10, 8], Distribution::Uniform(-1.0, 1.0), &device);

    // Example 1: the encoder's last output seeds the decoder
    println!("Example 1: SimpleSeq2Seq");
    let simple = SimpleSeq2SeqConfig::new(8, 6)
        .with_hidden_dim(Some(20))
        .with_depth(Depth::from(2))
        .with_options(CellOptions::new().with_input_dim(8).with_input_length(10))
        .init::<Backend>(&device)?;

    let output = simple.forward(input.clone());
    println!("  Encoder layout: {:?}", simple.encoder().layout().kinds());
    println!("  Output shape:   {:?}", output.dims());
    println!();

    // Example 2: state broadcasting with peek
    println!("Example 2: Seq2Seq with peek");
    let model = Seq2SeqConfig::new(8, 6)
        .with_hidden_dim(Some(20))
        .with_depth(Depth::from((2, 3)))
        .with_peek(true)
        .with_options(CellOptions::new().with_input_shape([Some(10), Some(8)]))
        .init::<Backend>(&device)?;

    let output = model.forward(input.clone(), None);
    println!("  Decoder layout: {:?}", model.decoder().layout().kinds());
    println!("  Input mode:     {:?}", model.decoder().input_mode());
    println!("  Output shape:   {:?}", output.dims());
    println!();

    // Example 3: teacher forcing with a ground-truth sequence
    println!("Example 3: Seq2Seq with teacher forcing");
    let forced = Seq2SeqConfig::new(8, 6)
        .with_teacher_force(true)
        .with_options(CellOptions::new().with_batch_input_shape([None, Some(10), Some(8)]))
        .init::<Backend>(&device)?;

    let truth = Tensor::<Backend, 3>::random([4, 6, 8], Distribution::Uniform(-1.0, 1.0), &device);
    let output = forced.forward(input.clone(), Some(truth));
    println!("  Output shape:   {:?}", output.dims());
    println!();

    // Example 4: bidirectional encoder with attention decoder
    println!("Example 4: AttentionSeq2Seq");
    let attention = AttentionSeq2SeqConfig::new(8, 6)
        .with_hidden_dim(Some(16))
        .with_depth(Depth::from(2))
        .with_options(CellOptions::new().with_input_dim(8).with_input_length(10))
        .init::<Backend>(&device)?;

    let (output, weights) = attention.forward_with_alignments(input);
    println!(
        "  Bidirectional:  {}",
        attention.encoder().is_bidirectional()
    );
    println!("  Output shape:   {:?}", output.dims());
    println!("  Weights shape:  {:?}", weights.dims());
    println!();

    // Example 5: configuration errors surface before any layer exists
    println!("Example 5: Missing input shape");
    match SimpleSeq2SeqConfig::new(8, 6).init::<Backend>(&device) {
        Ok(_) => println!("  unexpectedly built a model"),
        Err(err) => println!("  {err}"),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
