use camino::Utf8Path;
use std::fmt::Write as _;
use walkdir::WalkDir;

/// Total size in bytes of every file below `path`.
///
/// Entries that cannot be read are skipped; a missing directory is 0.
pub fn directory_size(path: &Utf8Path) -> u64 {
    if !path.is_dir() {
        return 0;
    }

    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Human-readable size: `1536` → `1.5 KB`, at most two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut len = bytes as f64;
    let mut order = 0;
    while len >= 1024.0 && order < UNITS.len() - 1 {
        order += 1;
        len /= 1024.0;
    }

    let rounded = format!("{:.2}", len);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[order])
}

/// Root-level listing of `path`: the folder name, then `[dir]` entries, then files,
/// each group sorted by name.
pub fn folder_tree(path: &Utf8Path) -> String {
    if !path.is_dir() {
        return "Directory not found".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}\\", path.file_name().unwrap_or(path.as_str()));

    let entries = match path.read_dir_utf8() {
        Ok(entries) => entries,
        Err(e) => {
            let _ = writeln!(out, "  Error reading directory: {}", e);
            return out;
        }
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => dirs.push(name),
            Ok(_) => files.push(name),
            Err(_) => {}
        }
    }
    dirs.sort();
    files.sort();

    for dir in dirs {
        let _ = writeln!(out, "  [{}]", dir);
    }
    for file in files {
        let _ = writeln!(out, "  {}", file);
    }
    out
}
