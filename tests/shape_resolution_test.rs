#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use seq2seq::config::{
        resolve_input_shape, ArchitectureConfig, BatchInputShape, CellOptions, Depth, ShapeSpec,
    };
    use seq2seq::error::{CellError, ConfigError, Seq2SeqError};
    use seq2seq::models::{AttentionSeq2SeqConfig, Seq2SeqConfig, SimpleSeq2SeqConfig};

    type Backend = NdArray<f32>;

    #[test]
    fn test_three_conventions_resolve_identically() {
        let expected = BatchInputShape::new(None, Some(10), Some(8));

        let mut explicit = CellOptions::new().with_batch_input_shape([None, Some(10), Some(8)]);
        let mut input_shape = CellOptions::new().with_input_shape([Some(10), Some(8)]);
        let mut input_dim = CellOptions::new().with_input_dim(8).with_input_length(10);

        assert_eq!(resolve_input_shape(&mut explicit).unwrap(), expected);
        assert_eq!(resolve_input_shape(&mut input_shape).unwrap(), expected);
        assert_eq!(resolve_input_shape(&mut input_dim).unwrap(), expected);

        assert!(explicit.is_empty());
        assert!(input_shape.is_empty());
        assert!(input_dim.is_empty());
    }

    #[test]
    fn test_explicit_batch_shape_wins() {
        let mut options = CellOptions::new()
            .with_batch_input_shape([Some(32), Some(4), Some(2)])
            .with_input_shape([Some(10), Some(8)])
            .with_input_dim(3);

        let spec = ShapeSpec::take_from(&mut options).unwrap();

        assert_eq!(
            spec,
            ShapeSpec::ExplicitBatchShape([Some(32), Some(4), Some(2)])
        );
        assert_eq!(spec.resolve().as_tuple(), (Some(32), Some(4), Some(2)));
        assert!(options.is_empty());
    }

    #[test]
    fn test_depth_normalization() {
        assert_eq!(Depth::from(3).normalize(), (3, 3));
        assert_eq!(Depth::from((2, 5)).normalize(), (2, 5));
    }

    #[test]
    fn test_hidden_dim_defaults_to_output_dim() {
        let options = CellOptions::new().with_input_dim(8);
        let (config, _) =
            ArchitectureConfig::resolve(7, 3, None, Depth::default(), 0.0, options).unwrap();
        assert_eq!(config.hidden_dim, 7);

        let device = Default::default();
        let model = SimpleSeq2SeqConfig::new(7, 3)
            .with_options(CellOptions::new().with_input_dim(8))
            .init::<Backend>(&device)
            .unwrap();
        assert_eq!(model.encoder().hidden_size(), 7);
        assert_eq!(model.architecture().hidden_dim, 7);
    }

    #[test]
    fn test_missing_shape_fails_before_assembly() {
        let device = Default::default();
        let missing = || Err::<(), _>(Seq2SeqError::Config(ConfigError::MissingInputShape));

        let simple = SimpleSeq2SeqConfig::new(4, 2).init::<Backend>(&device);
        let seq2seq = Seq2SeqConfig::new(4, 2).init::<Backend>(&device);
        let attention = AttentionSeq2SeqConfig::new(4, 2).init::<Backend>(&device);

        assert_eq!(simple.map(|_| ()), missing());
        assert_eq!(seq2seq.map(|_| ()), missing());
        assert_eq!(attention.map(|_| ()), missing());
    }

    #[test]
    fn test_unknown_feature_dim_rejected() {
        let device = Default::default();
        let result = SimpleSeq2SeqConfig::new(4, 2)
            .with_options(CellOptions::new().with_input_shape([Some(10), None]))
            .init::<Backend>(&device);

        assert!(matches!(
            result,
            Err(Seq2SeqError::Config(ConfigError::MissingFeatureDim))
        ));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let device = Default::default();
        let result = Seq2SeqConfig::new(4, 2)
            .with_depth(Depth::from((0, 2)))
            .with_options(CellOptions::new().with_input_dim(3))
            .init::<Backend>(&device);

        assert!(matches!(
            result,
            Err(Seq2SeqError::Config(ConfigError::ZeroDepth {
                encoder: 0,
                decoder: 2
            }))
        ));
    }

    #[test]
    fn test_invalid_dropout_rejected() {
        let device = Default::default();
        let result = AttentionSeq2SeqConfig::new(4, 2)
            .with_dropout(1.0)
            .with_options(CellOptions::new().with_input_dim(3))
            .init::<Backend>(&device);

        assert!(matches!(
            result,
            Err(Seq2SeqError::Config(ConfigError::InvalidDropout(_)))
        ));
    }

    #[test]
    fn test_unknown_cell_option_rejected() {
        let device = Default::default();
        let result = SimpleSeq2SeqConfig::new(4, 2)
            .with_options(
                CellOptions::new()
                    .with_input_dim(3)
                    .with("recurrent_activation", "hard_sigmoid"),
            )
            .init::<Backend>(&device);

        assert!(matches!(
            result,
            Err(Seq2SeqError::Cell(CellError::UnknownOption(key))) if key == "recurrent_activation"
        ));
    }

    #[test]
    fn test_cell_options_reach_cells() {
        let device = Default::default();
        let model = SimpleSeq2SeqConfig::new(4, 2)
            .with_options(
                CellOptions::new()
                    .with_input_dim(3)
                    .with_stateful(true)
                    .with("forget_bias", 0.0),
            )
            .init::<Backend>(&device)
            .unwrap();

        assert!(model.encoder().stateful());
        assert_eq!(model.encoder().cells()[0].forget_bias(), 0.0);
    }

    #[test]
    fn test_malformed_losing_key_does_not_abort_build() {
        let device = Default::default();
        let options = CellOptions::new()
            .with_batch_input_shape([None, Some(10), Some(8)])
            .with("input_dim", "eight")
            .with("input_length", true);
        let model = SimpleSeq2SeqConfig::new(4, 2)
            .with_options(options)
            .init::<Backend>(&device)
            .unwrap();

        let input_shape = model.architecture().input_shape;
        assert_eq!(input_shape.as_tuple(), (None, Some(10), Some(8)));
        assert_eq!(model.encoder().input_size(), 8);
    }

    #[test]
    fn test_zero_time_steps_rejected() {
        let device = Default::default();
        let zero_length = CellOptions::new().with_input_dim(3).with_input_length(0);
        let zero_steps = CellOptions::new().with_input_shape([Some(0), Some(3)]);

        let simple = SimpleSeq2SeqConfig::new(4, 2)
            .with_options(zero_length)
            .init::<Backend>(&device);
        let seq2seq = Seq2SeqConfig::new(4, 2)
            .with_options(zero_steps)
            .init::<Backend>(&device);

        for result in [simple.map(|_| ()), seq2seq.map(|_| ())] {
            assert_eq!(
                result,
                Err(Seq2SeqError::Config(ConfigError::ZeroDimension {
                    name: "input_length"
                }))
            );
        }
    }

    #[test]
    fn test_zero_batch_rejected() {
        let device = Default::default();
        let options = CellOptions::new().with_batch_input_shape([Some(0), Some(5), Some(3)]);
        let result = AttentionSeq2SeqConfig::new(4, 2)
            .with_options(options)
            .init::<Backend>(&device);

        assert!(matches!(
            result,
            Err(Seq2SeqError::Config(ConfigError::ZeroDimension { name: "batch" }))
        ));
    }
}
