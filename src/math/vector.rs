use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{NnError, Result};

/// A fixed-size sequence of `f64`.
///
/// Arithmetic never mutates its operands; every operation allocates a fresh
/// vector. Elements are computed by independent rayon workers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    pub fn zeros(size: usize) -> Vector {
        Vector { data: vec![0.0; size] }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Elementwise sum. Fails with `DimensionMismatch` unless both vectors
    /// have the same size.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, rhs: &Vector) -> Result<Vector> {
        if self.size() != rhs.size() {
            return Err(NnError::DimensionMismatch {
                op: "vector add",
                expected: self.size(),
                actual: rhs.size(),
            });
        }

        let mut res = Vector::zeros(self.size());
        res.data
            .par_iter_mut()
            .zip(self.data.par_iter().zip(rhs.data.par_iter()))
            .for_each(|(out, (a, b))| *out = a + b);

        Ok(res)
    }

    /// Returns `[value, self[0], self[1], ...]`.
    ///
    /// Layers use this with `value = 1.0` so the leading weight column acts
    /// as the bias.
    pub fn prepend(&self, value: f64) -> Vector {
        let mut res = Vector::zeros(self.size() + 1);
        res.data[0] = value;
        res.data[1..]
            .par_iter_mut()
            .zip(self.data.par_iter())
            .for_each(|(out, x)| *out = *x);
        res
    }

    /// Applies `functor` to every element in parallel.
    pub fn map<F>(&self, functor: F) -> Vector
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        Vector { data: self.data.par_iter().map(|&x| functor(x)).collect() }
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Vector { data }
    }
}

impl<const N: usize> From<[f64; N]> for Vector {
    fn from(data: [f64; N]) -> Self {
        Vector { data: data.to_vec() }
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Vector { data: iter.into_iter().collect() }
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.data[i]
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}
