use crate::models::AppId;
use camino::{Utf8Path, Utf8PathBuf};
use regex::{Regex, RegexBuilder};
use std::fs;
use thiserror::Error;

/// Folder under the Steam root where the LuaTools plugin reads scripts
pub const SCRIPTS_SUBDIR: [&str; 2] = ["config", "stplug-in"];

/// Errors that can occur while locating a script
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("LuaTools directory not found: {0}")]
    PluginDirMissing(Utf8PathBuf),

    #[error("No Lua files found in {0}")]
    NoScripts(Utf8PathBuf),

    #[error("Valid Morrenus Lua file not found for AppID {0}")]
    NotFound(AppId),

    #[error("Failed to list {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The LuaTools script folder for a Steam installation
pub fn scripts_dir(steam_root: &Utf8Path) -> Utf8PathBuf {
    SCRIPTS_SUBDIR
        .iter()
        .fold(steam_root.to_path_buf(), |dir, part| dir.join(part))
}

/// The generator's signature comment for `app_id`:
/// `-- <id>'s Lua and Manifest Created by Morrenus`, whitespace-tolerant and case-insensitive.
fn signature_pattern(app_id: &AppId) -> Regex {
    let pattern = format!(
        r"--\s*{}'s\s+Lua\s+and\s+Manifest\s+Created\s+by\s+Morrenus",
        regex::escape(app_id.as_str())
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("Invalid signature regex")
}

/// Find the script generated for `app_id` in `scripts_dir`.
///
/// Candidates are the `*.lua` files directly inside the folder, checked in file
/// name order; the first one carrying the signature wins. Files that cannot be
/// read are skipped.
pub fn find_script_in(scripts_dir: &Utf8Path, app_id: &AppId) -> Result<Utf8PathBuf, LocateError> {
    if !scripts_dir.is_dir() {
        return Err(LocateError::PluginDirMissing(scripts_dir.to_path_buf()));
    }

    let entries = scripts_dir.read_dir_utf8().map_err(|source| LocateError::Io {
        path: scripts_dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<Utf8PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", scripts_dir, e);
                None
            }
        })
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("lua"))
        })
        .collect();

    if candidates.is_empty() {
        return Err(LocateError::NoScripts(scripts_dir.to_path_buf()));
    }
    candidates.sort();

    let signature = signature_pattern(app_id);
    for candidate in candidates {
        match fs::read_to_string(&candidate) {
            Ok(content) if signature.is_match(&content) => {
                tracing::info!("Found script for AppID {}: {}", app_id, candidate);
                return Ok(candidate);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping unreadable script {}: {}", candidate, e),
        }
    }

    Err(LocateError::NotFound(app_id.clone()))
}

/// Find the script for `app_id` under a Steam installation.
pub fn find_script(steam_root: &Utf8Path, app_id: &AppId) -> Result<Utf8PathBuf, LocateError> {
    find_script_in(&scripts_dir(steam_root), app_id)
}
