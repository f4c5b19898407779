//! Download toggle for LuaTools scripts.
//!
//! A script is in one of two modes, recorded only by its first line:
//!
//! - **Enabled** (no header): manifest pins are commented out so the game can
//!   auto-update, and every foreign depot declaration is live.
//! - **Disabled** (first line is [`HEADER_MARKER`]): manifest pins are live, and
//!   depot declarations for anything other than the main app are commented out.
//!
//! Both directions are idempotent, and enabling a disabled script restores the
//! commenting of every pin and depot line. Lines the classifier reports as
//! [`LineCategory::PlainOther`] (including the single-argument `addappid(id)`
//! that unlocks the game itself) are never touched.

use crate::models::AppId;
use crate::services::classifier::{
    ConfigLine, DirectiveKind, HEADER_MARKER, LineCategory, LineClassifier, is_header,
};
use thiserror::Error;

/// Case-insensitive substring every genuine script contains
pub const AUTHENTICITY_MARKER: &str = "morrenus";

/// Errors raised by the toggle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToggleError {
    #[error("'morrenus' not found in the Lua file; this is not a valid LuaTools configuration file")]
    NotAuthentic,
}

/// Which way a script currently routes depot downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    Enabled,
    Disabled,
}

impl std::fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadMode::Enabled => f.write_str("updates enabled"),
            DownloadMode::Disabled => f.write_str("updates disabled"),
        }
    }
}

/// Current mode of a script, read from its first line
pub fn download_mode<S: AsRef<str>>(lines: &[S]) -> DownloadMode {
    match lines.first() {
        Some(first) if is_header(first.as_ref()) => DownloadMode::Disabled,
        _ => DownloadMode::Enabled,
    }
}

/// Whether the script was produced by the expected generator
pub fn is_authentic<S: AsRef<str>>(lines: &[S]) -> bool {
    // Lines are checked as if joined with '\n'; the marker cannot contain one
    lines
        .iter()
        .any(|line| line.as_ref().to_ascii_lowercase().contains(AUTHENTICITY_MARKER))
}

/// Applies the disable/enable rewrite to script lines.
pub struct ToggleEngine {
    classifier: LineClassifier,
}

impl ToggleEngine {
    pub fn new() -> Self {
        Self {
            classifier: LineClassifier::new(),
        }
    }

    /// Pin versions and stop downloading foreign depots.
    ///
    /// # Errors
    ///
    /// [`ToggleError::NotAuthentic`] if the script lacks [`AUTHENTICITY_MARKER`].
    pub fn apply_disable<S: AsRef<str>>(
        &self,
        lines: &[S],
        main_id: &AppId,
    ) -> Result<Vec<String>, ToggleError> {
        ensure_authentic(lines)?;

        let classified = self.classifier.classify_script(lines);
        let mut output = Vec::with_capacity(classified.len() + 1);

        if !matches!(classified.first(), Some(line) if line.category == LineCategory::Header) {
            output.push(HEADER_MARKER.to_string());
        }

        let mut changed = 0usize;
        for line in &classified {
            let rewritten = disable_line(line, main_id);
            if rewritten.is_some() {
                changed += 1;
            }
            output.push(rewritten.unwrap_or_else(|| line.raw.to_string()));
        }

        tracing::info!(
            "Disabled downloads for AppID {}: {} line(s) rewritten",
            main_id,
            changed
        );
        Ok(output)
    }

    /// Un-pin versions and resume downloading foreign depots.
    ///
    /// # Errors
    ///
    /// [`ToggleError::NotAuthentic`] if the script lacks [`AUTHENTICITY_MARKER`].
    pub fn apply_enable<S: AsRef<str>>(
        &self,
        lines: &[S],
        main_id: &AppId,
    ) -> Result<Vec<String>, ToggleError> {
        ensure_authentic(lines)?;

        let classified = self.classifier.classify_script(lines);
        let mut output = Vec::with_capacity(classified.len());

        let mut changed = 0usize;
        for line in &classified {
            if line.category == LineCategory::Header {
                continue;
            }
            let rewritten = enable_line(line, main_id);
            if rewritten.is_some() {
                changed += 1;
            }
            output.push(rewritten.unwrap_or_else(|| line.raw.to_string()));
        }

        tracing::info!(
            "Enabled downloads for AppID {}: {} line(s) rewritten",
            main_id,
            changed
        );
        Ok(output)
    }

    /// Dispatch on the requested target mode.
    pub fn apply<S: AsRef<str>>(
        &self,
        target: DownloadMode,
        lines: &[S],
        main_id: &AppId,
    ) -> Result<Vec<String>, ToggleError> {
        match target {
            DownloadMode::Disabled => self.apply_disable(lines, main_id),
            DownloadMode::Enabled => self.apply_enable(lines, main_id),
        }
    }
}

impl Default for ToggleEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_authentic<S: AsRef<str>>(lines: &[S]) -> Result<(), ToggleError> {
    if is_authentic(lines) {
        Ok(())
    } else {
        tracing::warn!("Refusing to toggle a script without the authenticity marker");
        Err(ToggleError::NotAuthentic)
    }
}

/// New text for `line` when disabling, or `None` to keep it as is
fn disable_line(line: &ConfigLine<'_>, main_id: &AppId) -> Option<String> {
    match (line.category, line.directive) {
        (LineCategory::CommentWrappedDirective, DirectiveKind::ManifestPin) => {
            Some(line.uncommented())
        }
        (LineCategory::ActiveDirective, DirectiveKind::DepotDeclaration)
            if line.is_foreign_depot(main_id) =>
        {
            Some(line.commented())
        }
        _ => None,
    }
}

/// New text for `line` when enabling, or `None` to keep it as is
fn enable_line(line: &ConfigLine<'_>, main_id: &AppId) -> Option<String> {
    match (line.category, line.directive) {
        (LineCategory::ActiveDirective, DirectiveKind::ManifestPin) => Some(line.commented()),
        (LineCategory::CommentWrappedDirective, DirectiveKind::DepotDeclaration)
            if line.is_foreign_depot(main_id) =>
        {
            Some(line.uncommented())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AppId {
        AppId::new(s).unwrap()
    }

    fn sample() -> Vec<&'static str> {
        vec![
            "-- 100's Lua and Manifest Created by Morrenus",
            "addappid(100)",
            r#"addappid(100,200,"abc")"#,
            r#"addappid(200,250,"xyz")"#,
            r#"-- setManifestid(100,"300","build1")"#,
        ]
    }

    #[test]
    fn test_disable_worked_example() {
        let engine = ToggleEngine::new();
        let out = engine.apply_disable(&sample(), &id("100")).unwrap();

        assert_eq!(
            out,
            vec![
                HEADER_MARKER,
                "-- 100's Lua and Manifest Created by Morrenus",
                "addappid(100)",
                r#"addappid(100,200,"abc")"#,
                r#"-- addappid(200,250,"xyz")"#,
                r#"setManifestid(100,"300","build1")"#,
            ]
        );
    }

    #[test]
    fn test_enable_restores_worked_example() {
        let engine = ToggleEngine::new();
        let disabled = engine.apply_disable(&sample(), &id("100")).unwrap();
        let enabled = engine.apply_enable(&disabled, &id("100")).unwrap();
        assert_eq!(enabled, sample());
    }

    #[test]
    fn test_disable_is_idempotent() {
        let engine = ToggleEngine::new();
        let once = engine.apply_disable(&sample(), &id("100")).unwrap();
        let twice = engine.apply_disable(&once, &id("100")).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_enable_on_enabled_script_is_noop() {
        let engine = ToggleEngine::new();
        let out = engine.apply_enable(&sample(), &id("100")).unwrap();
        assert_eq!(out, sample());
    }

    #[test]
    fn test_not_authentic_rejected_both_ways() {
        let engine = ToggleEngine::new();
        let lines = vec!["addappid(1)", r#"addappid(2,1,"k")"#];

        assert_eq!(
            engine.apply_disable(&lines, &id("1")),
            Err(ToggleError::NotAuthentic)
        );
        assert_eq!(
            engine.apply_enable(&lines, &id("1")),
            Err(ToggleError::NotAuthentic)
        );
    }

    #[test]
    fn test_authenticity_is_case_insensitive() {
        assert!(is_authentic(&["-- made by MORRENUS"]));
        assert!(!is_authentic::<&str>(&[]));
    }

    #[test]
    fn test_main_app_depot_left_alone_when_enabling() {
        let engine = ToggleEngine::new();
        let lines = vec![
            HEADER_MARKER,
            "-- morrenus",
            r#"-- addappid(100,1,"main")"#,
            r#"-- addappid(101,1,"dlc")"#,
        ];

        let out = engine.apply_enable(&lines, &id("100")).unwrap();
        assert_eq!(
            out,
            vec![
                "-- morrenus",
                r#"-- addappid(100,1,"main")"#,
                r#"addappid(101,1,"dlc")"#,
            ]
        );
    }

    #[test]
    fn test_enable_comments_live_pins_with_indent() {
        let engine = ToggleEngine::new();
        let lines = vec!["-- morrenus", "  setManifestid(5, \"1\")"];
        let out = engine.apply_enable(&lines, &id("5")).unwrap();
        assert_eq!(out[1], "  -- setManifestid(5, \"1\")");
    }

    #[test]
    fn test_download_mode() {
        assert_eq!(download_mode(&sample()), DownloadMode::Enabled);
        assert_eq!(
            download_mode(&[HEADER_MARKER, "-- morrenus"]),
            DownloadMode::Disabled
        );
        assert_eq!(download_mode::<&str>(&[]), DownloadMode::Enabled);
    }

    #[test]
    fn test_header_elsewhere_is_not_dropped() {
        let engine = ToggleEngine::new();
        let lines = vec!["-- morrenus", HEADER_MARKER];
        let out = engine.apply_enable(&lines, &id("1")).unwrap();
        assert_eq!(out, lines);
    }
}
