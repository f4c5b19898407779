//! Locally cached list of AppIDs the tool supports.
//!
//! The list is a plain text file in the reports directory with one AppID per
//! line. Fetching a fresh copy is left to the caller; this module only reads
//! the cache and reports when it has gone stale.

use crate::models::AppId;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::fs;
use std::io::ErrorKind;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Cache file name inside the reports directory
pub const ALLOW_LIST_FILE: &str = "denuvo_whitelist.txt";

/// Age after which the cache should be refreshed
pub const STALE_AFTER: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Error, Debug)]
pub enum AllowListError {
    #[error("AppID {id} is not on the allow list ({path}); only listed titles are supported")]
    NotListed { id: AppId, path: Utf8PathBuf },

    #[error("Failed to read allow list {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Snapshot of the allow list file, taken once at load
#[derive(Debug, Clone)]
pub struct AllowList {
    path: Utf8PathBuf,
    ids: IndexSet<String>,
    modified: Option<SystemTime>,
}

impl AllowList {
    /// Load `<reports_dir>/denuvo_whitelist.txt`. A missing file is an empty list.
    pub fn load(reports_dir: &Utf8Path) -> Result<Self, AllowListError> {
        Self::from_file(reports_dir.join(ALLOW_LIST_FILE))
    }

    pub fn from_file(path: Utf8PathBuf) -> Result<Self, AllowListError> {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Allow list not found at {}", path);
                return Ok(Self {
                    path,
                    ids: IndexSet::new(),
                    modified: None,
                });
            }
            Err(source) => return Err(AllowListError::Io { path, source }),
        };

        let ids: IndexSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let modified = fs::metadata(&path).and_then(|meta| meta.modified()).ok();

        tracing::debug!("Loaded {} allow-listed AppIDs from {}", ids.len(), path);
        Ok(Self {
            path,
            ids,
            modified,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Last write time of the file, if it exists
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn contains(&self, app_id: &AppId) -> bool {
        self.ids.contains(app_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The file is missing or at least [`STALE_AFTER`] old at `now`.
    pub fn needs_update(&self, now: SystemTime) -> bool {
        match self.modified {
            None => true,
            Some(modified) => now
                .duration_since(modified)
                .is_ok_and(|age| age >= STALE_AFTER),
        }
    }

    /// `Ok` if `app_id` is listed, `NotListed` otherwise
    pub fn ensure_listed(&self, app_id: &AppId) -> Result<(), AllowListError> {
        if self.contains(app_id) {
            Ok(())
        } else {
            Err(AllowListError::NotListed {
                id: app_id.clone(),
                path: self.path.clone(),
            })
        }
    }
}
