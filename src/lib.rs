// LuaTools Game Checker - Steam install inspection and LuaTools download toggle
//
// This is the library crate containing the core logic and data structures.
// The binary crate (main.rs) provides the command-line entry point.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{AppId, GameRecord, Settings};
pub use services::{DownloadMode, GameResolver, ToggleEngine};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
