use super::Matrix;
use crate::prelude::*;
use std::ops::{Add, Mul, Sub};

pub trait Dot<I> {
    type Output;
    fn dot(self, rhs: I) -> Result<Self::Output>;
}

pub trait Transpose {
    fn transpose(&self) -> Self;
}

impl Transpose for Matrix {
    fn transpose(&self) -> Self {
        let mut transposed = Matrix::new(self.cols(), self.rows());

        for row in 0..self.rows() {
            for col in 0..self.cols() {
                transposed[(col, row)] = self[(row, col)];
            }
        }
        transposed
    }
}

/// Standard matrix product. Requires `self.cols() == rhs.rows()`.
impl<'a> Dot<&Matrix> for &'a Matrix {
    type Output = Matrix;
    fn dot(self, rhs: &Matrix) -> Result<Self::Output> {
        if self.cols() != rhs.rows() {
            return Err(Error::DimensionErr);
        }

        let mut data = Vec::with_capacity(self.rows() * rhs.cols());

        for lhs_row in 0..self.rows() {
            for rhs_col in 0..rhs.cols() {
                let mut sum = 0.0;
                for n in 0..self.cols() {
                    sum += self[(lhs_row, n)] * rhs[(n, rhs_col)]
                }
                data.push(sum);
            }
        }

        Ok(Matrix {
            data,
            dim: (self.rows(), rhs.cols()),
        })
    }
}

impl Matrix {
    fn zip_with<F: Fn(f64, f64) -> f64>(&self, rhs: &Matrix, f: F) -> Result<Matrix> {
        if self.dim != rhs.dim {
            return Err(Error::DimensionErr);
        }

        let data = self
            .data
            .iter()
            .zip(&rhs.data)
            .map(|(&a, &b)| f(a, b))
            .collect();

        Ok(Matrix {
            data,
            dim: self.dim,
        })
    }

    /// Hadamard product: `(a, b) * (c, d) = (a*c, b*d)`.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, |a, b| a * b)
    }

    /// Multiplies every element by `factor`.
    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }
}

/// Adds two matrices element-wise.
impl<'a> Add for &'a Matrix {
    type Output = Result<Matrix>;
    fn add(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a + b)
    }
}

/// `a - b`, computed as `a + (-1 * b)`.
impl<'a> Sub for &'a Matrix {
    type Output = Result<Matrix>;
    fn sub(self, rhs: Self) -> Self::Output {
        self + &rhs.scale(-1.0)
    }
}

impl<'a> Mul<f64> for &'a Matrix {
    type Output = Matrix;
    fn mul(self, factor: f64) -> Self::Output {
        self.scale(factor)
    }
}
