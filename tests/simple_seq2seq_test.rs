#[cfg(test)]
mod tests {
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::{Distribution, Tensor};
    use seq2seq::config::{CellOptions, Depth};
    use seq2seq::models::{SimpleSeq2Seq, SimpleSeq2SeqConfig};
    use seq2seq::rnn::LayerKind;

    type Backend = NdArray<f32>;

    fn create_model(depth: Depth, hidden_dim: Option<usize>) -> SimpleSeq2Seq<Backend> {
        let device = Default::default();
        SimpleSeq2SeqConfig::new(6, 4)
            .with_hidden_dim(hidden_dim)
            .with_depth(depth)
            .with_dropout(0.3)
            .with_options(CellOptions::new().with_input_shape([Some(9), Some(5)]))
            .init::<Backend>(&device)
            .unwrap()
    }

    #[test]
    fn test_depth_one_has_no_dropout() {
        let model = create_model(Depth::Uniform(1), None);

        assert_eq!(model.encoder().layout().cell_count(), 1);
        assert_eq!(model.encoder().layout().dropout_count(), 0);
        assert_eq!(model.decoder().layout().cell_count(), 1);
        assert_eq!(model.decoder().layout().dropout_count(), 0);
    }

    #[test]
    fn test_depth_three_interleaves_dropout() {
        let model = create_model(Depth::Uniform(3), None);
        let kinds = model.encoder().layout().kinds();

        assert_eq!(model.encoder().layout().cell_count(), 3);
        assert_eq!(model.encoder().layout().dropout_count(), 2);
        assert_eq!(kinds[0], LayerKind::Cell);
        assert_eq!(kinds[kinds.len() - 1], LayerKind::Cell);

        // The decoder follows the same placement
        assert_eq!(model.decoder().layout().kinds(), kinds);
    }

    #[test]
    fn test_split_depth() {
        let model = create_model(Depth::from((2, 4)), None);

        assert_eq!(model.encoder().layout().cell_count(), 2);
        assert_eq!(model.decoder().layout().cell_count(), 4);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = create_model(Depth::Uniform(2), None);

        let input = Tensor::<Backend, 3>::random([3, 9, 5], Distribution::Default, &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [3, 4, 6]);
    }

    #[test]
    fn test_forward_with_wider_hidden() {
        let device = Default::default();
        let model = create_model(Depth::Uniform(1), Some(16));

        assert_eq!(model.encoder().hidden_size(), 16);

        let input = Tensor::<Backend, 3>::random([2, 9, 5], Distribution::Default, &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 4, 6]);
    }

    #[test]
    fn test_encoder_emits_final_output_only() {
        let device = Default::default();
        let model = create_model(Depth::Uniform(1), None);

        let input = Tensor::<Backend, 3>::zeros([2, 9, 5], &device);
        let encoded = model.encoder().forward(input);

        assert!(!model.encoder().return_sequences());
        assert_eq!(encoded.output.dims(), [2, 1, 6]);
    }

    #[test]
    fn test_dropout_active_with_autodiff() {
        type TrainBackend = Autodiff<NdArray<f32>>;
        let device = Default::default();
        let model = SimpleSeq2SeqConfig::new(6, 4)
            .with_depth(Depth::Uniform(2))
            .with_dropout(0.5)
            .with_options(CellOptions::new().with_input_dim(5))
            .init::<TrainBackend>(&device)
            .unwrap();

        let input = Tensor::<TrainBackend, 3>::random([2, 9, 5], Distribution::Default, &device);
        let first = model.forward(input.clone());
        let second = model.forward(input);

        let diff = (first - second).abs().max().into_scalar();
        assert!(diff > 0.0);
    }

    #[test]
    fn test_stateful_forward_carries_state() {
        let device = Default::default();
        let options = CellOptions::new()
            .with_input_shape([Some(9), Some(5)])
            .with_stateful(true);
        let model = SimpleSeq2SeqConfig::new(6, 4)
            .with_options(options)
            .init::<Backend>(&device)
            .unwrap();
        let input = Tensor::<Backend, 3>::random([2, 9, 5], Distribution::Default, &device);

        let (first, state) = model.forward_with_state(input.clone(), None);
        let (second, _) = model.forward_with_state(input, Some(state));

        assert!(model.architecture().stateful);
        assert!((first - second).abs().max().into_scalar() > 0.0);
    }

    #[test]
    fn test_stateless_forward_ignores_state() {
        let device = Default::default();
        let model = create_model(Depth::Uniform(2), None);
        let input = Tensor::<Backend, 3>::random([2, 9, 5], Distribution::Default, &device);

        let (first, state) = model.forward_with_state(input.clone(), None);
        let (second, _) = model.forward_with_state(input, Some(state));

        assert!((first - second).abs().max().into_scalar() < 1e-6);
    }
}
