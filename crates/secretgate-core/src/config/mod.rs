//! Configuration loading

mod loader;

pub use loader::{LoadedConfig, CONFIG_ENV_VAR};
