use std::sync::Arc;

use crate::{layers::Layer, network::network::Network};

/// Collects layers in order, then freezes them into a `Network`.
///
/// `build` can be called more than once; each call snapshots the layers
/// added so far.
#[derive(Debug)]
pub struct NetworkBuilder {
    input_size: usize,
    layers: Vec<Arc<dyn Layer>>,
}

impl NetworkBuilder {
    pub fn new(input_size: usize) -> NetworkBuilder {
        NetworkBuilder { input_size, layers: Vec::new() }
    }

    /// Appends a layer after the ones already added.
    pub fn add_layer<L: Layer + 'static>(self, layer: L) -> NetworkBuilder {
        self.add_shared_layer(Arc::new(layer))
    }

    /// Appends a layer that may also be referenced elsewhere.
    pub fn add_shared_layer(mut self, layer: Arc<dyn Layer>) -> NetworkBuilder {
        self.layers.push(layer);
        self
    }

    pub fn build(&self) -> Network {
        Network::from_parts(self.input_size, self.layers.iter().cloned().collect())
    }
}
