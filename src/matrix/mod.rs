use crate::prelude::*;
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};
use std::{
    fmt,
    ops::{Index, IndexMut},
};

pub mod ops;

/// Dense row-major matrix of `f64`.
///
/// The dimensions are fixed at construction. Every operation in [`ops`]
/// produces a new matrix; only element writes, [`Matrix::apply`] and the
/// randomizers mutate in place.
#[derive(Debug, PartialEq, Clone)]
pub struct Matrix {
    data: Vec<f64>,
    dim: (usize, usize),
}

impl Matrix {
    /// Zero-filled matrix of the given size.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            dim: (rows, cols),
        }
    }

    pub fn from_array<const R: usize, const C: usize>(arr: [[f64; C]; R]) -> Self {
        let mut data = Vec::with_capacity(R * C);

        for row in arr {
            data.extend(row);
        }

        Self { data, dim: (R, C) }
    }

    /// Builds a matrix from nested rows, inferring the dimensions.
    /// Rows of unequal length are rejected.
    pub fn from_vec(vec: Vec<Vec<f64>>) -> Result<Self> {
        let rows = vec.len();
        let cols = vec.first().map(|row| row.len()).unwrap_or(0);

        let mut data = Vec::with_capacity(rows * cols);
        for row in vec {
            if cols != row.len() {
                return Err(Error::DimensionErr);
            }
            data.extend(row);
        }

        Ok(Self {
            data,
            dim: (rows, cols),
        })
    }

    /// An `n x 1` column vector.
    pub fn from_column(column: Vec<f64>) -> Self {
        Self {
            dim: (column.len(), 1),
            data: column,
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.dim.0
    }

    pub fn cols(&self) -> usize {
        self.dim.1
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexErr {
                row,
                col,
                dim: self.dim,
            });
        }
        Ok(())
    }

    /// Zero-based element read.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_bounds(row, col)?;
        Ok(self[(row, col)])
    }

    /// Zero-based element write.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_bounds(row, col)?;
        self[(row, col)] = value;
        Ok(())
    }

    /// Replaces every value at once. The new rows must match the current dimensions.
    pub fn set_data(&mut self, vec: Vec<Vec<f64>>) -> Result<()> {
        let replacement = Matrix::from_vec(vec)?;
        if replacement.dim != self.dim {
            return Err(Error::DimensionErr);
        }
        self.data = replacement.data;
        Ok(())
    }

    pub fn row_as_vec(&self, row: usize) -> Vec<f64> {
        (0..self.cols()).map(|col| self[(row, col)]).collect()
    }

    pub fn to_vec(&self) -> Vec<Vec<f64>> {
        if self.cols() == 0 {
            return vec![Vec::new(); self.rows()];
        }
        self.data
            .chunks(self.cols())
            .map(|row| row.to_vec())
            .collect()
    }

    /// True when every entry of `row` is exactly zero.
    pub fn is_zero_row(&self, row: usize) -> bool {
        (0..self.cols()).all(|col| self[(row, col)] == 0.0)
    }

    pub fn zero(&mut self) {
        for x in &mut self.data {
            *x = 0.0;
        }
    }

    /// Applies a function to every element of the matrix
    pub fn apply<F: Fn(f64) -> f64>(&mut self, f: F) {
        for x in &mut self.data {
            *x = f(*x);
        }
    }

    /// Like [`Matrix::apply`] but leaves `self` untouched.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        let mut out = self.clone();
        out.apply(f);
        out
    }

    /// Fills every element with a uniform value in [-1, 1].
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let die = Uniform::from(-1.0..=1.0);
        for x in &mut self.data {
            *x = die.sample(rng);
        }
    }

    /// Flattens an `r x c` matrix into an `(r*c) x 1` column.
    ///
    /// Columns are walked outermost, so `[[a, b], [c, d]]` becomes
    /// `[a, c, b, d]`. Network inputs depend on this order.
    pub fn to_single_column(&self) -> Matrix {
        let mut column = Vec::with_capacity(self.data.len());
        for col in 0..self.cols() {
            for row in 0..self.rows() {
                column.push(self[(row, col)]);
            }
        }
        Matrix::from_column(column)
    }

    /// Position of the largest element in a row-major scan.
    ///
    /// Only a strictly greater value replaces the current maximum, so the
    /// first of several equal maxima wins. `None` for an empty matrix.
    pub fn argmax(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                if best.map_or(true, |b| self[(row, col)] > self[b]) {
                    best = Some((row, col));
                }
            }
        }
        best
    }

    pub fn argmax_row(&self) -> Option<usize> {
        self.argmax().map(|(row, _)| row)
    }

    /// Column of the largest element, scanning column-major so that ties go
    /// to the leftmost column.
    pub fn argmax_col(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for col in 0..self.cols() {
            for row in 0..self.rows() {
                if best.map_or(true, |b| self[(row, col)] > self[b]) {
                    best = Some((row, col));
                }
            }
        }
        best.map(|(_, col)| col)
    }

    pub fn argmax_value(&self) -> Option<f64> {
        self.argmax().map(|pos| self[pos])
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i * self.cols() + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        let idx = i * self.cols() + j;
        &mut self.data[idx]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            write!(f, "[ ")?;
            for col in 0..self.cols() {
                write!(f, "{} ", self[(row, col)])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
