pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod pipeline;

// Convenience re-exports
pub use error::{NnError, PipelineError, Result, StageFailure, StageFailureCause};
pub use math::{accumulator::AtomicF64, matrix::Matrix, vector::Vector};
pub use activation::activation::ActivationFunction;
pub use layers::{dense::FullyConnected, identity::Identity, Layer};
pub use network::{builder::NetworkBuilder, network::Network};
pub use pipeline::{CancelHandle, FeedStream, PipelineConfig};
