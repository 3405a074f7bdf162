//! CLI library components for the unipost transformation engine.

pub mod config;
pub mod io;
pub mod logging;
