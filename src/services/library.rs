//! Steam library index and app manifest readers.

use crate::services::keyvalues::{extract_pairs, key_values, values_for};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use std::fs;
use thiserror::Error;

/// Folder under the Steam root and under every library root holding manifests
pub const STEAMAPPS_DIR: &str = "steamapps";

/// Folder under `steamapps` holding installed game directories
pub const COMMON_DIR: &str = "common";

/// Library index file name under `<steam>/steamapps`
pub const LIBRARY_INDEX_FILE: &str = "libraryfolders.vdf";

/// Errors raised while reading Steam's own files
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("libraryfolders.vdf not found at: {0}")]
    IndexFileMissing(Utf8PathBuf),

    #[error("ACF file not found: {0}")]
    ManifestMissing(Utf8PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Location of the library index for a Steam installation
pub fn library_index_path(steam_root: &Utf8Path) -> Utf8PathBuf {
    steam_root.join(STEAMAPPS_DIR).join(LIBRARY_INDEX_FILE)
}

/// Every library root listed in the index that currently exists as a directory.
///
/// Escaped separators (`\\`) are collapsed and duplicates removed; the set keeps
/// the order in which the index lists the libraries.
pub fn read_libraries(steam_root: &Utf8Path) -> Result<IndexSet<Utf8PathBuf>, LibraryError> {
    let index_path = library_index_path(steam_root);
    if !index_path.is_file() {
        return Err(LibraryError::IndexFileMissing(index_path));
    }

    let content = read_text(&index_path)?;
    let pairs = extract_pairs(&content);

    let mut libraries = IndexSet::new();
    for raw in values_for(&pairs, "path") {
        let library = Utf8PathBuf::from(raw.replace("\\\\", "\\"));
        if library.is_dir() {
            libraries.insert(library);
        } else {
            tracing::warn!("Skipping library that is not a directory: {}", library);
        }
    }

    tracing::debug!(
        "Read {} libraries from {}",
        libraries.len(),
        index_path
    );
    Ok(libraries)
}

/// Location of an app's manifest inside one library
pub fn manifest_path(library: &Utf8Path, manifest_file_name: &str) -> Utf8PathBuf {
    library.join(STEAMAPPS_DIR).join(manifest_file_name)
}

/// Raw key/value fields of one `appmanifest_*.acf` file, without coercion.
pub fn read_manifest(path: &Utf8Path) -> Result<IndexMap<String, String>, LibraryError> {
    if !path.is_file() {
        return Err(LibraryError::ManifestMissing(path.to_path_buf()));
    }

    let content = read_text(path)?;
    Ok(key_values(&content))
}

fn read_text(path: &Utf8Path) -> Result<String, LibraryError> {
    fs::read_to_string(path).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, path)
    }

    fn write_index(steam_root: &Utf8Path, libraries: &[&str]) {
        let mut body = String::from("\"libraryfolders\"\n{\n");
        for (i, lib) in libraries.iter().enumerate() {
            body.push_str(&format!(
                "\t\"{}\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t\t\"label\"\t\t\"\"\n\t}}\n",
                i, lib
            ));
        }
        body.push_str("}\n");
        fs::create_dir_all(steam_root.join(STEAMAPPS_DIR)).unwrap();
        fs::write(library_index_path(steam_root), body).unwrap();
    }

    #[test]
    fn test_missing_index_file() {
        let (_guard, root) = utf8_temp_dir();
        let err = read_libraries(&root).unwrap_err();
        assert!(matches!(err, LibraryError::IndexFileMissing(p) if p == library_index_path(&root)));
    }

    #[test]
    fn test_only_existing_directories_are_kept() {
        let (_guard, root) = utf8_temp_dir();
        let lib_a = root.join("LibA");
        fs::create_dir_all(&lib_a).unwrap();
        let missing = root.join("Gone");

        write_index(&root, &[lib_a.as_str(), missing.as_str()]);

        let libraries = read_libraries(&root).unwrap();
        assert_eq!(libraries.len(), 1);
        assert!(libraries.contains(&lib_a));
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let (_guard, root) = utf8_temp_dir();
        let lib = root.join("Lib");
        fs::create_dir_all(&lib).unwrap();

        write_index(&root, &[lib.as_str(), lib.as_str()]);

        let libraries = read_libraries(&root).unwrap();
        assert_eq!(libraries.len(), 1);
    }

    #[test]
    fn test_read_manifest_fields_verbatim() {
        let (_guard, root) = utf8_temp_dir();
        let path = root.join("appmanifest_10.acf");
        fs::write(
            &path,
            "\"AppState\"\n{\n\t\"appid\"\t\"10\"\n\t\"installdir\"\t\"Half-Life\"\n\t\"SizeOnDisk\"\t\"0042\"\n}\n",
        )
        .unwrap();

        let fields = read_manifest(&path).unwrap();
        assert_eq!(fields["installdir"], "Half-Life");
        assert_eq!(fields["SizeOnDisk"], "0042");
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn test_read_manifest_missing() {
        let (_guard, root) = utf8_temp_dir();
        let err = read_manifest(&root.join("appmanifest_1.acf")).unwrap_err();
        assert!(matches!(err, LibraryError::ManifestMissing(_)));
    }

    #[test]
    fn test_manifest_path_layout() {
        let path = manifest_path(Utf8Path::new("D:/SteamLibrary"), "appmanifest_730.acf");
        assert_eq!(
            path,
            Utf8PathBuf::from("D:/SteamLibrary/steamapps/appmanifest_730.acf")
        );
    }
}
