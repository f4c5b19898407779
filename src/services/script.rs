use crate::models::AppId;
use crate::services::classifier::DEPOT_KEYWORD;
use crate::services::toggle::{DownloadMode, ToggleEngine, ToggleError, download_mode};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Errors from reading, toggling or writing a script on disk
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Lua file not found: {0}")]
    Missing(Utf8PathBuf),

    #[error("Failed to access Lua file {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toggle(#[from] ToggleError),
}

/// Terminator that followed one line in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    /// Last line of a file without a trailing newline
    Unterminated,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Unterminated => "",
        }
    }

    /// Split one `split_inclusive('\n')` chunk into its text and terminator
    fn split(chunk: &str) -> (&str, Self) {
        if let Some(text) = chunk.strip_suffix("\r\n") {
            (text, LineEnding::CrLf)
        } else if let Some(text) = chunk.strip_suffix('\n') {
            (text, LineEnding::Lf)
        } else {
            (chunk, LineEnding::Unterminated)
        }
    }
}

/// UTF-8 byte order mark some editors put at the start of a script
const BOM: char = '\u{feff}';

/// A script loaded as lines, remembering how to write it back.
///
/// `endings[i]` is the terminator that followed `lines[i]`; only the last line
/// can be [`LineEnding::Unterminated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub path: Utf8PathBuf,
    pub lines: Vec<String>,
    pub endings: Vec<LineEnding>,
    /// The file started with a byte order mark
    pub bom: bool,
}

impl ScriptFile {
    pub fn read(path: &Utf8Path) -> Result<Self, ScriptError> {
        if !path.is_file() {
            return Err(ScriptError::Missing(path.to_path_buf()));
        }

        let text = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::parse(path, &text))
    }

    /// Split `text` into lines, keeping each line's own terminator.
    pub fn parse(path: &Utf8Path, text: &str) -> Self {
        let (bom, body) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (lines, endings) = body
            .split_inclusive('\n')
            .map(|chunk| {
                let (line, ending) = LineEnding::split(chunk);
                (line.to_string(), ending)
            })
            .unzip();

        Self {
            path: path.to_path_buf(),
            lines,
            endings,
            bom,
        }
    }

    /// The file contents this script would be written as
    pub fn render(&self) -> String {
        let mut text = String::new();
        if self.bom {
            text.push(BOM);
        }
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            text.push_str(line);
            text.push_str(ending.as_str());
        }
        text
    }

    pub fn write(&self) -> Result<(), ScriptError> {
        fs::write(&self.path, self.render()).map_err(|source| ScriptError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!("Wrote {} lines to {}", self.lines.len(), self.path);
        Ok(())
    }

    pub fn mode(&self) -> DownloadMode {
        download_mode(&self.lines)
    }

    /// Replace the lines with the output of a toggle.
    ///
    /// A toggle only ever adds or removes the header on line 1, so a longer
    /// result gains a terminator in front and a shorter one loses the first.
    pub fn replace_lines(&mut self, lines: Vec<String>) {
        if lines.len() == self.lines.len() + 1 {
            let ending = self.header_ending();
            self.endings.insert(0, ending);
        } else if lines.len() + 1 == self.lines.len() && !self.endings.is_empty() {
            self.endings.remove(0);
        }
        self.lines = lines;
    }

    /// Terminator for a prepended header: the first line's, else the first one in the file, else LF
    fn header_ending(&self) -> LineEnding {
        self.endings
            .iter()
            .copied()
            .find(|ending| *ending != LineEnding::Unterminated)
            .unwrap_or(LineEnding::Lf)
    }
}

/// Rewrite the script at `path` into `target` mode in place.
///
/// The file is only written when the toggle succeeds; the caller must make sure
/// nothing else (e.g. a restarting Steam client) writes it in between.
pub fn set_download_mode(
    engine: &ToggleEngine,
    path: &Utf8Path,
    main_id: &AppId,
    target: DownloadMode,
) -> Result<ScriptFile, ScriptError> {
    let mut script = ScriptFile::read(path)?;
    let lines = engine.apply(target, &script.lines, main_id)?;
    script.replace_lines(lines);
    script.write()?;

    tracing::info!("{} is now set to {}", path, target);
    Ok(script)
}

/// Disable depot downloads and pin versions in the script at `path`.
pub fn disable_downloads(path: &Utf8Path, main_id: &AppId) -> Result<ScriptFile, ScriptError> {
    set_download_mode(&ToggleEngine::new(), path, main_id, DownloadMode::Disabled)
}

/// Re-enable depot downloads and auto-updates in the script at `path`.
pub fn enable_downloads(path: &Utf8Path, main_id: &AppId) -> Result<ScriptFile, ScriptError> {
    set_download_mode(&ToggleEngine::new(), path, main_id, DownloadMode::Enabled)
}

/// Display rendering of a script: `addappid` lines flush left, other
/// non-blank lines indented four spaces, blank lines kept verbatim.
pub fn format_script<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for line in lines {
        let line = line.as_ref();
        let trimmed = line.trim();
        let is_depot = trimmed
            .get(..DEPOT_KEYWORD.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(DEPOT_KEYWORD));

        if is_depot {
            out.push_str(trimmed);
        } else if !trimmed.is_empty() {
            out.push_str("    ");
            out.push_str(trimmed);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}
