//! Run configuration.

pub mod config;

pub use config::{BatchConfig, DroneCount};
