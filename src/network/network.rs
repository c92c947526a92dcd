use std::fmt;
use std::sync::Arc;

use crate::{
    error::Result,
    layers::Layer,
    math::vector::Vector,
    network::builder::NetworkBuilder,
    pipeline::{FeedStream, PipelineConfig},
};

/// An ordered, immutable stack of layers.
///
/// A built network holds no mutable state: every `feed` allocates fresh
/// vectors, so one instance can serve any number of threads. Cloning is
/// cheap and shares the layers.
#[derive(Clone)]
pub struct Network {
    input_size: usize,
    layers: Arc<[Arc<dyn Layer>]>,
}

impl Network {
    /// Starts building a network whose inputs have `input_size` elements.
    /// The size is recorded only; a mismatch with the first layer surfaces
    /// as `DimensionMismatch` on the first feed.
    pub fn create(input_size: usize) -> NetworkBuilder {
        NetworkBuilder::new(input_size)
    }

    pub(crate) fn from_parts(input_size: usize, layers: Arc<[Arc<dyn Layer>]>) -> Network {
        Network { input_size, layers }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Arc<dyn Layer>] {
        &self.layers
    }

    /// Forward pass for a single vector, layer 0 first.
    /// With no layers the input comes back unchanged.
    pub fn feed(&self, input: &Vector) -> Result<Vector> {
        let mut current = input.clone();
        for layer in self.layers.iter() {
            current = layer.feed(&current)?;
        }
        Ok(current)
    }

    /// Streams `inputs` through a pipeline with one stage per layer, using
    /// the default `PipelineConfig`. See `FeedStream` for ordering, failure
    /// and cancellation behaviour.
    pub fn feed_stream<I>(&self, inputs: I) -> FeedStream
    where
        I: IntoIterator<Item = Vector>,
        I::IntoIter: Send + 'static,
    {
        self.feed_stream_with(inputs, PipelineConfig::default())
    }

    pub fn feed_stream_with<I>(&self, inputs: I, config: PipelineConfig) -> FeedStream
    where
        I: IntoIterator<Item = Vector>,
        I::IntoIter: Send + 'static,
    {
        FeedStream::new(Arc::clone(&self.layers), Box::new(inputs.into_iter()), config)
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("input_size", &self.input_size)
            .field("layers", &self.layers.iter().map(|l| l.name()).collect::<Vec<_>>())
            .finish()
    }
}
