pub mod activations;
pub mod params;
pub mod sample;
pub mod stats;

use crate::prelude::*;
use std::{fmt, sync::Arc};

use crate::matrix::{
    ops::{Dot, Transpose},
    Matrix,
};
use rand::Rng;
use tracing::debug;

use self::activations::{Activation, Sigmoid};

/// Step size of a backpropagation update unless configured otherwise.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Anything that turns an input column into an output column.
pub trait Classifier {
    fn feed_forward(&self, input: &Matrix) -> Result<Matrix>;
}

/// Activations of one forward pass, all post-activation.
///
/// Returned by [`Network::forward`] and handed back to
/// [`Network::backward`], so the network itself keeps no per-call state.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub input: Matrix,
    pub hidden: Matrix,
    pub output: Matrix,
}

/// Fixed three layer perceptron: input -> hidden -> output.
#[derive(Clone)]
pub struct Network {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    /// hidden x input
    weights_input_hidden: Matrix,
    /// output x hidden
    weights_hidden_output: Matrix,
    bias_hidden: Matrix,
    bias_output: Matrix,
    learning_rate: f64,
    activation: Arc<dyn Activation>,
}

impl Network {
    /// Creates a network with every weight and bias uniformly random in [-1, 1].
    /// Each layer needs at least one neuron.
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> Result<Self> {
        Self::new_with_rng(
            input_size,
            hidden_size,
            output_size,
            &mut rand::thread_rng(),
        )
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if input_size == 0 || hidden_size == 0 || output_size == 0 {
            return Err(Error::LayoutErr {
                input: input_size,
                hidden: hidden_size,
                output: output_size,
            });
        }

        let mut weights_input_hidden = Matrix::new(hidden_size, input_size);
        let mut weights_hidden_output = Matrix::new(output_size, hidden_size);
        let mut bias_hidden = Matrix::new(hidden_size, 1);
        let mut bias_output = Matrix::new(output_size, 1);

        weights_input_hidden.randomize_with(rng);
        weights_hidden_output.randomize_with(rng);
        bias_hidden.randomize_with(rng);
        bias_output.randomize_with(rng);

        Ok(Self {
            input_size,
            hidden_size,
            output_size,
            weights_input_hidden,
            weights_hidden_output,
            bias_hidden,
            bias_output,
            learning_rate: DEFAULT_LEARNING_RATE,
            activation: Arc::new(Sigmoid),
        })
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Swap the activation function of both layers. Its `derivative` is
    /// evaluated on activated values, see [`Activation`].
    pub fn with_activation(mut self, activation: impl Activation + 'static) -> Self {
        self.activation = Arc::new(activation);
        self
    }

    /// `(input, hidden, output)` neuron counts.
    pub fn layout(&self) -> (usize, usize, usize) {
        (self.input_size, self.hidden_size, self.output_size)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn weights_input_hidden(&self) -> &Matrix {
        &self.weights_input_hidden
    }

    pub fn weights_hidden_output(&self) -> &Matrix {
        &self.weights_hidden_output
    }

    pub fn bias_hidden(&self) -> &Matrix {
        &self.bias_hidden
    }

    pub fn bias_output(&self) -> &Matrix {
        &self.bias_output
    }

    /// Replaces all four parameter matrices at once, e.g. with pretrained values.
    /// Nothing is changed unless every matrix has the shape of the one it replaces.
    pub fn set_params(
        &mut self,
        bias_hidden: Matrix,
        bias_output: Matrix,
        weights_input_hidden: Matrix,
        weights_hidden_output: Matrix,
    ) -> Result<()> {
        if bias_hidden.dim() != self.bias_hidden.dim()
            || bias_output.dim() != self.bias_output.dim()
            || weights_input_hidden.dim() != self.weights_input_hidden.dim()
            || weights_hidden_output.dim() != self.weights_hidden_output.dim()
        {
            return Err(Error::DimensionErr);
        }

        self.bias_hidden = bias_hidden;
        self.bias_output = bias_output;
        self.weights_input_hidden = weights_input_hidden;
        self.weights_hidden_output = weights_hidden_output;
        debug!(layout = ?self.layout(), "replaced network parameters");
        Ok(())
    }

    /// `activation(weights * input + biases)`
    fn layer(&self, weights: &Matrix, biases: &Matrix, input: &Matrix) -> Result<Matrix> {
        let mut res = (&weights.dot(input)? + biases)?;
        res.apply(|x| self.activation.call(x));
        Ok(res)
    }

    /// Propagates one input column through both layers, keeping every activation.
    pub fn forward(&self, input: &Matrix) -> Result<ForwardPass> {
        if input.dim() != (self.input_size, 1) {
            return Err(Error::DimensionErr);
        }

        let hidden = self.layer(&self.weights_input_hidden, &self.bias_hidden, input)?;
        let output = self.layer(&self.weights_hidden_output, &self.bias_output, &hidden)?;

        Ok(ForwardPass {
            input: input.clone(),
            hidden,
            output,
        })
    }

    /// Output column for one input column.
    pub fn feed_forward(&self, input: &Matrix) -> Result<Matrix> {
        self.forward(input).map(|pass| pass.output)
    }

    /// Index of the strongest output neuron.
    pub fn predict(&self, input: &Matrix) -> Result<usize> {
        self.feed_forward(input)?
            .argmax_row()
            .ok_or(Error::DimensionErr)
    }

    /// Gradient step for one sample given the activations of its forward pass.
    ///
    /// All deltas are computed before any parameter is touched, so a shape
    /// error leaves the network unchanged.
    pub fn backward(&mut self, pass: &ForwardPass, target: &Matrix) -> Result<()> {
        if pass.input.dim() != (self.input_size, 1) {
            return Err(Error::DimensionErr);
        }

        let output_error = (target - &pass.output)?;
        let hidden_error = self.weights_hidden_output.transpose().dot(&output_error)?;

        let gradient_output = self
            .gradient(&pass.output, &output_error)?
            .scale(self.learning_rate);
        let delta_hidden_output = gradient_output.dot(&pass.hidden.transpose())?;

        let gradient_hidden = self
            .gradient(&pass.hidden, &hidden_error)?
            .scale(self.learning_rate);
        let delta_input_hidden = gradient_hidden.dot(&pass.input.transpose())?;

        self.weights_hidden_output = (&self.weights_hidden_output + &delta_hidden_output)?;
        self.bias_output = (&self.bias_output + &gradient_output)?;
        self.weights_input_hidden = (&self.weights_input_hidden + &delta_input_hidden)?;
        self.bias_hidden = (&self.bias_hidden + &gradient_hidden)?;

        Ok(())
    }

    /// `activation'(a) ⊙ error`
    fn gradient(&self, activated: &Matrix, error: &Matrix) -> Result<Matrix> {
        activated
            .map(|a| self.activation.derivative(a))
            .hadamard(error)
    }

    /// One stochastic gradient descent step towards `target`.
    pub fn train(&mut self, input: &Matrix, target: &Matrix) -> Result<()> {
        let pass = self.forward(input)?;
        self.backward(&pass, target)
    }
}

impl Classifier for Network {
    fn feed_forward(&self, input: &Matrix) -> Result<Matrix> {
        Network::feed_forward(self, input)
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("layout", &self.layout())
            .field("learning_rate", &self.learning_rate)
            .finish()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "weights_input_hidden:")?;
        write!(f, "{}", self.weights_input_hidden)?;
        writeln!(f, "weights_hidden_output:")?;
        write!(f, "{}", self.weights_hidden_output)
    }
}
