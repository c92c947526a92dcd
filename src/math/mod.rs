pub mod accumulator;
pub mod matrix;
pub mod vector;

pub use accumulator::AtomicF64;
pub use matrix::Matrix;
pub use vector::Vector;
