//! Infrastructure layer
//!
//! ESP32 implementations of the core hardware seams and the tasks that run
//! them.

pub(crate) mod config;
pub mod drivers;
pub mod tasks;
pub mod types;
