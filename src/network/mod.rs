pub mod builder;
pub mod network;

pub use builder::NetworkBuilder;
pub use network::Network;
