use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::RecurrentCell;

/// Hidden and cell state carried by an LSTM between timesteps.
#[derive(Clone, Debug)]
pub struct LstmState<B: Backend> {
    /// Hidden state `h`, shape `[batch_size, hidden_size]`
    pub hidden: Tensor<B, 2>,
    /// Cell state `c`, shape `[batch_size, hidden_size]`
    pub cell: Tensor<B, 2>,
}

impl<B: Backend> LstmState<B> {
    pub fn new(hidden: Tensor<B, 2>, cell: Tensor<B, 2>) -> Self {
        Self { hidden, cell }
    }

    /// All-zero state
    pub fn zeros(batch_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            hidden: Tensor::zeros([batch_size, hidden_size], device),
            cell: Tensor::zeros([batch_size, hidden_size], device),
        }
    }
}

/// Configuration for [`LSTMCell`].
#[derive(Config, Debug)]
pub struct LSTMCellConfig {
    /// Size of the input features
    pub d_input: usize,
    /// Size of the hidden state
    pub d_hidden: usize,
    /// Whether the input map carries a bias
    #[config(default = true)]
    pub bias: bool,
    /// Constant added to the forget gate pre-activation
    #[config(default = 1.0)]
    pub forget_bias: f64,
}

impl LSTMCellConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LSTMCell<B> {
        let input_map = LinearConfig::new(self.d_input, 4 * self.d_hidden)
            .with_bias(self.bias)
            .init(device);

        let recurrent_map = LinearConfig::new(self.d_hidden, 4 * self.d_hidden)
            .with_bias(false)
            .init(device);

        LSTMCell {
            input_size: self.d_input,
            hidden_size: self.d_hidden,
            forget_bias: self.forget_bias,
            input_map,
            recurrent_map,
        }
    }
}

/// Standard LSTM cell
///
/// Implements the standard LSTM equations:
/// - i = tanh(W_ii @ x + b_ii + W_hi @ h)
/// - g = sigmoid(W_ig @ x + b_ig + W_hg @ h)
/// - f = sigmoid(W_if @ x + b_if + W_hf @ h + forget_bias)
/// - o = sigmoid(W_io @ x + b_io + W_ho @ h)
/// - c' = f * c + i * g
/// - h' = o * tanh(c')
#[derive(Module, Debug)]
pub struct LSTMCell<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    forget_bias: f64,
    input_map: Linear<B>,     // Maps input to 4 * hidden_size
    recurrent_map: Linear<B>, // Maps hidden state to 4 * hidden_size (no bias)
}

impl<B: Backend> LSTMCell<B> {
    /// Create a new LSTM cell with default bias settings
    ///
    /// # Arguments
    /// * `input_size` - Size of the input features
    /// * `hidden_size` - Size of the hidden state
    /// * `device` - Device to create the module on
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        LSTMCellConfig::new(input_size, hidden_size).init(device)
    }

    /// Get the input size
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Get the hidden size
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn forget_bias(&self) -> f64 {
        self.forget_bias
    }

    /// Perform a forward pass through the LSTM cell
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, input_size]`
    /// * `state` - Previous hidden and cell state
    ///
    /// # Returns
    /// The updated state; its `hidden` tensor is the cell output
    pub fn forward(&self, input: Tensor<B, 2>, state: LstmState<B>) -> LstmState<B> {
        let LstmState { hidden, cell } = state;

        let z = self.input_map.forward(input) + self.recurrent_map.forward(hidden);

        // Split into 4 gates
        let chunks = z.chunk(4, 1);
        let input_activation = chunks[0].clone().tanh();
        let input_gate = activation::sigmoid(chunks[1].clone());
        let forget_gate = activation::sigmoid(chunks[2].clone() + self.forget_bias);
        let output_gate = activation::sigmoid(chunks[3].clone());

        let new_cell = cell * forget_gate + input_activation * input_gate;
        let new_hidden = new_cell.clone().tanh() * output_gate;

        LstmState::new(new_hidden, new_cell)
    }
}

impl<B: Backend> RecurrentCell<B> for LSTMCell<B> {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn output_size(&self) -> usize {
        self.hidden_size
    }

    fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> (Tensor<B, 2>, LstmState<B>) {
        let next = self.forward(input, state);
        (next.hidden.clone(), next)
    }
}
