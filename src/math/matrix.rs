use rand::prelude::*;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Index, IndexMut};

use crate::error::{NnError, Result};
use crate::math::accumulator::AtomicF64;
use crate::math::vector::Vector;

/// A `rows x cols` grid of `f64`. The shape is fixed at construction; serde
/// goes through `from_data` so deserialized matrices keep the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix{
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix from row-major data. Every row must have the same,
    /// non-zero length as the first one.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, |row| row.len());
        if !data.is_empty() && cols == 0 {
            return Err(NnError::InvalidArgument("matrix rows must not be empty".to_owned()));
        }
        if let Some(row) = data.iter().find(|row| row.len() != cols) {
            return Err(NnError::DimensionMismatch {
                op: "matrix rows",
                expected: cols,
                actual: row.len(),
            });
        }

        Ok(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// Uniform samples in [-1, 1).
    pub fn random(rows: usize, cols: usize) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen::<f64>() * 2.0 - 1.0;
            }
        }

        res
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal(rng: &mut ThreadRng) -> f64 {
        // (0, 1] keeps ln() finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal(rows: usize, cols: usize, std_dev: f64) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(&mut rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// Suited to ReLU layers. `cols` is the fan-in.
    pub fn he(rows: usize, cols: usize) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / cols.max(1) as f64).sqrt())
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// Suited to Sigmoid and Passthrough layers. `cols` is the fan-in.
    pub fn xavier(rows: usize, cols: usize) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / cols.max(1) as f64).sqrt())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row]
    }

    /// Matrix-vector product, treating `vec` as a column.
    ///
    /// Rows run in parallel, and within a row every column product is added
    /// into a shared `AtomicF64`. Summation order therefore varies between
    /// runs: results agree up to rounding, not bit for bit.
    pub fn multiply(&self, vec: &Vector) -> Result<Vector> {
        if self.cols != vec.size() {
            return Err(NnError::DimensionMismatch {
                op: "matrix multiply",
                expected: self.cols,
                actual: vec.size(),
            });
        }

        let input = vec.as_slice();
        let mut res = Vector::zeros(self.rows);
        res.as_mut_slice()
            .par_iter_mut()
            .zip(self.data.par_iter())
            .for_each(|(out, row)| {
                let dot = AtomicF64::new(0.0);
                row.par_iter()
                    .zip(input.par_iter())
                    .for_each(|(w, x)| {
                        dot.add(w * x);
                    });
                *out = dot.into_inner();
            });

        Ok(res)
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NnError;

    fn try_from(data: Vec<Vec<f64>>) -> Result<Matrix> {
        Matrix::from_data(data)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.data
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row][col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row][col]
    }
}
