//! Utility modules shared by the pipeline stages and commands.

pub mod log;
pub mod minify;
pub mod xml;
