use crate::{
    activation::activation::ActivationFunction,
    error::{NnError, Result},
    layers::Layer,
    math::{matrix::Matrix, vector::Vector},
};

/// A fully connected layer: every input feeds every neuron.
///
/// `weights` has one row per neuron and `1 + input size` columns; column 0
/// holds the bias, multiplied against a constant `1.0` placed ahead of the
/// input.
#[derive(Debug, Clone)]
pub struct FullyConnected {
    weights: Matrix,
    activator: ActivationFunction,
    /// Probability of a neuron being dropped during training. Recorded for
    /// completeness; inference never reads it.
    dropout: f64,
}

impl FullyConnected {
    pub fn new(activation: ActivationFunction, dropout: f64, weights: Matrix) -> Result<FullyConnected> {
        if !(0.0..1.0).contains(&dropout) {
            return Err(NnError::InvalidArgument(format!(
                "dropout must be in [0, 1), got {dropout}"
            )));
        }

        Ok(FullyConnected {
            weights,
            activator: activation,
            dropout,
        })
    }

    /// Uniform weights in [-1, 1), bias column included.
    pub fn random(size: usize, input_size: usize, activation: ActivationFunction) -> FullyConnected {
        FullyConnected::with_weights(Matrix::random(size, input_size + 1), activation)
    }

    /// Xavier-initialized weights; pair with Sigmoid, Passthrough or Softmax.
    pub fn xavier(size: usize, input_size: usize, activation: ActivationFunction) -> FullyConnected {
        FullyConnected::with_weights(Matrix::xavier(size, input_size + 1), activation)
    }

    /// He-initialized weights; pair with ReLU.
    pub fn he(size: usize, input_size: usize, activation: ActivationFunction) -> FullyConnected {
        FullyConnected::with_weights(Matrix::he(size, input_size + 1), activation)
    }

    fn with_weights(weights: Matrix, activation: ActivationFunction) -> FullyConnected {
        FullyConnected { weights, activator: activation, dropout: 0.0 }
    }

    pub fn neuron_count(&self) -> usize {
        self.weights.rows()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activator
    }

    pub fn dropout(&self) -> f64 {
        self.dropout
    }
}

impl Layer for FullyConnected {
    fn feed(&self, input: &Vector) -> Result<Vector> {
        let z = self.weights.multiply(&input.prepend(1.0))?;
        Ok(self.activator.apply(&z))
    }

    fn output_size(&self) -> Option<usize> {
        Some(self.neuron_count())
    }

    fn name(&self) -> &str {
        "fully-connected"
    }
}
