pub mod dense;
pub mod identity;

use std::fmt::Debug;

use crate::error::Result;
use crate::math::vector::Vector;

pub use dense::FullyConnected;
pub use identity::Identity;

/// A single forward step of a network.
///
/// This is the extension point for new layer kinds. Implementations must be
/// shareable across threads because streaming mode runs each layer on its
/// own pipeline stage.
pub trait Layer: Send + Sync + Debug {
    fn feed(&self, input: &Vector) -> Result<Vector>;

    /// Number of outputs, when the layer knows it ahead of time.
    fn output_size(&self) -> Option<usize> {
        None
    }

    /// Short label used in logs and stage failure reports.
    fn name(&self) -> &str {
        "layer"
    }
}
