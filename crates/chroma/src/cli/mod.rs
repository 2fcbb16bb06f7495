//! Command handlers for the `chroma` binary.

pub mod apply;
pub mod config;
pub mod interactive;
pub mod transforms;
