//! Tracking of Steam file verification around script installs.
//!
//! Two small marker files per app live in the reports directory:
//!
//! - `.verification_pending_<id>` holds the manifest `LastUpdated` value seen when
//!   a verification was requested. Steam bumps that timestamp once it has
//!   validated the install, so a larger current value means the check finished.
//! - `.dl_<id>.dat` records a script download as `<timestamp>|<verified>`, where
//!   `verified` is `0` until a verification completes.

use crate::models::AppId;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

#[derive(Debug, Clone)]
pub struct VerificationTracker {
    reports_dir: Utf8PathBuf,
}

impl VerificationTracker {
    /// Create a tracker, creating `reports_dir` if needed.
    pub fn new<P: AsRef<Utf8Path>>(reports_dir: P) -> Result<Self> {
        let reports_dir = reports_dir.as_ref().to_path_buf();
        fs::create_dir_all(&reports_dir)
            .with_context(|| format!("Failed to create reports directory: {}", reports_dir))?;
        Ok(Self { reports_dir })
    }

    pub fn reports_dir(&self) -> &Utf8Path {
        &self.reports_dir
    }

    fn flag_path(&self, app_id: &AppId) -> Utf8PathBuf {
        self.reports_dir
            .join(format!(".verification_pending_{}", app_id))
    }

    fn download_record_path(&self, app_id: &AppId) -> Utf8PathBuf {
        self.reports_dir.join(format!(".dl_{}.dat", app_id))
    }

    /// Mark a verification as requested at manifest time `last_updated`.
    pub fn create_flag(&self, app_id: &AppId, last_updated: u64) -> Result<()> {
        let path = self.flag_path(app_id);
        fs::write(&path, last_updated.to_string())
            .with_context(|| format!("Failed to write verification flag: {}", path))?;
        tracing::info!("Verification pending for AppID {} (LastUpdated {})", app_id, last_updated);
        Ok(())
    }

    pub fn flag_exists(&self, app_id: &AppId) -> bool {
        self.flag_path(app_id).is_file()
    }

    /// Whether a requested verification has finished.
    ///
    /// No flag means nothing is pending. An unreadable or malformed flag counts as
    /// still pending.
    pub fn is_complete(&self, app_id: &AppId, current_last_updated: u64) -> bool {
        let path = self.flag_path(app_id);
        if !path.is_file() {
            return true;
        }

        match fs::read_to_string(&path) {
            Ok(content) => match content.trim().parse::<u64>() {
                Ok(original) => current_last_updated > original,
                Err(_) => {
                    tracing::warn!("Malformed verification flag {}", path);
                    false
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read verification flag {}: {}", path, e);
                false
            }
        }
    }

    /// Remove the pending flag; a flag that is already gone is not an error.
    pub fn delete_flag(&self, app_id: &AppId) -> Result<()> {
        let path = self.flag_path(app_id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove verification flag: {}", path))?;
            tracing::debug!("Cleared verification flag: {}", path);
        }
        Ok(())
    }

    /// Record that a script was downloaded and not yet verified.
    pub fn record_download(&self, app_id: &AppId, last_updated: u64) -> Result<()> {
        let path = self.download_record_path(app_id);
        fs::write(&path, format!("{}|0", last_updated))
            .with_context(|| format!("Failed to write download record: {}", path))?;
        Ok(())
    }

    /// Flip an existing download record to verified. No record, no change.
    pub fn mark_verified(&self, app_id: &AppId) -> Result<()> {
        let path = self.download_record_path(app_id);
        if !path.is_file() {
            return Ok(());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read download record: {}", path))?;
        let timestamp = content.split('|').next().unwrap_or_default();
        fs::write(&path, format!("{}|1", timestamp))
            .with_context(|| format!("Failed to write download record: {}", path))?;
        Ok(())
    }

    /// A script was downloaded but its verification never completed.
    pub fn bypass_attempted(&self, app_id: &AppId) -> bool {
        let path = self.download_record_path(app_id);
        let Ok(content) = fs::read_to_string(&path) else {
            return false;
        };

        let mut parts = content.trim().split('|');
        match (parts.next(), parts.next()) {
            (Some(_), Some(verified)) => verified == "0",
            _ => false,
        }
    }
}
