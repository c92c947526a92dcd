use crate::{error::Result, layers::Layer, math::vector::Vector};

/// Forwards its input untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Layer for Identity {
    fn feed(&self, input: &Vector) -> Result<Vector> {
        Ok(input.clone())
    }

    fn name(&self) -> &str {
        "identity"
    }
}
