//! Step type classification from accelerometer readings.
//!
//! Lines read off a sensor link are parsed by `ingest`, scaled and fed to the two layer
//! network of `machine_learning`, and the outputs are turned into label tokens by the
//! `reporter`.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reporter;

pub use config::Config;
pub use error::{ClassifierError, Result};
