pub mod activations;
pub mod loss;
mod network;

pub use network::{Network, OUTPUT_SIZE, Shape};
