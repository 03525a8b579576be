//! Pretrained parameters as a flat list of `(matrix, row, col, value)` assignments.
//!
//! An offline training run dumps a network with [`Network::dump_params`]; a
//! freshly constructed network of the same layout takes them back with
//! [`Network::load_params`]. The JSON form is a literal value dump with no
//! versioning.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::Network;
use crate::{matrix::Matrix, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamMatrix {
    WeightsInputHidden,
    WeightsHiddenOutput,
    BiasHidden,
    BiasOutput,
}

impl ParamMatrix {
    pub const ALL: [ParamMatrix; 4] = [
        ParamMatrix::WeightsInputHidden,
        ParamMatrix::WeightsHiddenOutput,
        ParamMatrix::BiasHidden,
        ParamMatrix::BiasOutput,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamAssignment {
    pub matrix: ParamMatrix,
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl Network {
    fn param_matrix(&self, which: ParamMatrix) -> &Matrix {
        match which {
            ParamMatrix::WeightsInputHidden => &self.weights_input_hidden,
            ParamMatrix::WeightsHiddenOutput => &self.weights_hidden_output,
            ParamMatrix::BiasHidden => &self.bias_hidden,
            ParamMatrix::BiasOutput => &self.bias_output,
        }
    }

    fn param_matrix_mut(&mut self, which: ParamMatrix) -> &mut Matrix {
        match which {
            ParamMatrix::WeightsInputHidden => &mut self.weights_input_hidden,
            ParamMatrix::WeightsHiddenOutput => &mut self.weights_hidden_output,
            ParamMatrix::BiasHidden => &mut self.bias_hidden,
            ParamMatrix::BiasOutput => &mut self.bias_output,
        }
    }

    /// Every weight and bias, matrix by matrix in row-major order.
    pub fn dump_params(&self) -> Vec<ParamAssignment> {
        let mut assignments = Vec::new();
        for which in ParamMatrix::ALL {
            let matrix = self.param_matrix(which);
            for row in 0..matrix.rows() {
                for col in 0..matrix.cols() {
                    assignments.push(ParamAssignment {
                        matrix: which,
                        row,
                        col,
                        value: matrix[(row, col)],
                    });
                }
            }
        }
        assignments
    }

    /// Applies a parameter dump. Every position is checked first, so a bad
    /// assignment leaves the network untouched.
    pub fn load_params(&mut self, assignments: &[ParamAssignment]) -> Result<()> {
        for a in assignments {
            self.param_matrix(a.matrix).get(a.row, a.col)?;
        }
        for a in assignments {
            self.param_matrix_mut(a.matrix).set(a.row, a.col, a.value)?;
        }
        info!(
            assignments = assignments.len(),
            layout = ?self.layout(),
            "loaded pretrained parameters"
        );
        Ok(())
    }
}

pub fn to_json(assignments: &[ParamAssignment]) -> Result<String> {
    serde_json::to_string_pretty(assignments).map_err(|e| Error::ParamFormat(e.to_string()))
}

pub fn from_json(raw: &str) -> Result<Vec<ParamAssignment>> {
    serde_json::from_str(raw).map_err(|e| Error::ParamFormat(e.to_string()))
}
