use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejected Steam application identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppIdError {
    #[error("AppID is empty")]
    Empty,

    #[error("AppID must contain only decimal digits: {0}")]
    NotNumeric(String),
}

/// A Steam application identifier: a non-empty string of ASCII decimal digits.
///
/// Kept as text rather than an integer so comparisons match the exact digits
/// written in manifests and scripts (`"0100"` and `"100"` are different ids).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId(String);

impl AppId {
    /// Parse an identifier, trimming surrounding whitespace first.
    pub fn new(raw: &str) -> Result<Self, AppIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppIdError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppIdError::NotNumeric(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wrap digits already matched by a `\d+` capture.
    pub(crate) fn from_digits(digits: &str) -> Self {
        debug_assert!(!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
        Self(digits.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of this app's manifest inside a library's `steamapps` folder
    pub fn manifest_file_name(&self) -> String {
        format!("appmanifest_{}.acf", self.0)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AppId {
    type Err = AppIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AppId {
    type Error = AppIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AppId> for String {
    fn from(id: AppId) -> Self {
        id.0
    }
}

/// Placeholder used when a manifest has no `name` or `buildid`
pub const UNKNOWN: &str = "Unknown";

/// Everything known about one installed game, as resolved from its manifest.
///
/// Built fresh by [`GameResolver`](crate::services::GameResolver) on every request
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub id: AppId,
    pub name: String,
    pub install_dir: String,
    pub game_path: Utf8PathBuf,
    pub build_id: String,
    pub size_on_disk: String,
    pub library_path: Utf8PathBuf,
    /// Manifest `LastUpdated` timestamp, 0 when absent or unparsable
    pub last_updated: u64,
}

impl GameRecord {
    /// Steam's reported install size in bytes, if the manifest value is numeric
    pub fn size_on_disk_bytes(&self) -> Option<u64> {
        self.size_on_disk.parse().ok()
    }

    /// Steam reports files on disk (`SizeOnDisk` other than `"0"`)
    pub fn is_fully_installed(&self) -> bool {
        self.size_on_disk != "0"
    }
}
