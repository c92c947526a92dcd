use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use std::f64::consts::E;

use crate::math::{accumulator::AtomicF64, vector::Vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    /// Every logit maps to itself.
    Passthrough,
    Sigmoid,
    ReLU,
    /// Vector-valued: every output depends on the whole logit vector.
    Softmax,
}

impl ActivationFunction {
    /// Maps a logit vector to an output vector of the same size.
    pub fn apply(&self, logit: &Vector) -> Vector {
        match self {
            ActivationFunction::Passthrough => logit.clone(),
            ActivationFunction::Sigmoid | ActivationFunction::ReLU => {
                logit.map(|x| self.apply_scalar(x))
            }
            ActivationFunction::Softmax => softmax(logit),
        }
    }

    fn apply_scalar(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Passthrough | ActivationFunction::Softmax => x,
        }
    }
}

/// Two-phase softmax. Phase one writes every exponential and adds it into a
/// shared total; phase two divides by that total. The second `for_each`
/// starts only after the first has returned, so no element is divided by a
/// partial sum.
fn softmax(logit: &Vector) -> Vector {
    if logit.size() == 0 {
        return Vector::zeros(0);
    }

    // Shifting by the max leaves the result unchanged and keeps exp() finite.
    let max = logit
        .as_slice()
        .par_iter()
        .cloned()
        .reduce(|| f64::NEG_INFINITY, f64::max);

    let mut res = Vector::zeros(logit.size());
    let sum = AtomicF64::new(0.0);

    res.as_mut_slice()
        .par_iter_mut()
        .zip(logit.as_slice().par_iter())
        .for_each(|(out, x)| {
            let d = (x - max).exp();
            *out = d;
            sum.add(d);
        });

    let total = sum.into_inner();
    res.as_mut_slice()
        .par_iter_mut()
        .for_each(|out| *out /= total);

    res
}
