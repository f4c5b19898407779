use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// User settings from `LuaTools Settings.yaml`
///
/// Every field can also be set through a `LUATOOLS_`-prefixed environment
/// variable (e.g. `LUATOOLS_STEAM_PATH`), which wins over the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Steam installation root; discovered automatically when unset
    pub steam_path: Option<Utf8PathBuf>,

    /// Where verification flags and download records are kept
    pub reports_dir: Option<Utf8PathBuf>,

    pub log_dir: String,

    pub debug_mode: bool,

    pub console_output: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            steam_path: None,
            reports_dir: None,
            log_dir: default_log_dir(),
            debug_mode: false,
            console_output: true,
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}
