//! Library half of the `aneelwatch` binary: configuration, the run pipeline,
//! and terminal display.

pub mod config;
pub mod display;
pub mod pipeline;
