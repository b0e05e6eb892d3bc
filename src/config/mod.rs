//! Configuration — `AppConfig` defaults, TOML loading and config-file paths.
//!
//! Settings are read-only at runtime: the file is consumed at startup and
//! never written back.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AudioConfig};
