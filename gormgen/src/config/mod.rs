//! Configuration: file/env settings and the per-run code config

mod code_config;
pub mod defaults;
mod settings;

pub use code_config::*;
pub use settings::*;
