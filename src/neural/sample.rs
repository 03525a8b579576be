use crate::{matrix::Matrix, prelude::*};

/// One network input, optionally paired with the output it should produce.
///
/// A sample without targets is only good for inference; asking it for
/// targets yields [`Error::MissingTarget`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    inputs: Matrix,
    targets: Option<Matrix>,
}

impl Sample {
    pub fn new(inputs: Matrix, targets: Matrix) -> Self {
        Self {
            inputs,
            targets: Some(targets),
        }
    }

    /// Inference-only sample.
    pub fn input(inputs: Matrix) -> Self {
        Self {
            inputs,
            targets: None,
        }
    }

    /// Builds a labelled sample from two column slices.
    pub fn from_columns(inputs: &[f64], targets: &[f64]) -> Self {
        Self::new(
            Matrix::from_column(inputs.to_vec()),
            Matrix::from_column(targets.to_vec()),
        )
    }

    pub fn inputs(&self) -> &Matrix {
        &self.inputs
    }

    pub fn targets(&self) -> Result<&Matrix> {
        self.targets.as_ref().ok_or(Error::MissingTarget)
    }

    pub fn has_targets(&self) -> bool {
        self.targets.is_some()
    }
}
