//! Cross-platform config-file location using the `dirs` crate.
//!
//! Layout:
//!
//!   Windows: %APPDATA%\earbridge\config.toml
//!   macOS:   ~/Library/Application Support/earbridge/config.toml
//!   Linux:   ~/.config/earbridge/config.toml

use std::path::PathBuf;

/// Resolved application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `config.toml`.
    pub config_dir: PathBuf,
    /// Full path to `config.toml`.
    pub config_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "earbridge";

    /// Resolves paths via the `dirs` crate, falling back to the current
    /// directory if the platform cannot provide a standard config path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let config_file = config_dir.join("config.toml");

        Self {
            config_dir,
            config_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
