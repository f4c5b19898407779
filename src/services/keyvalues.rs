//! Flat key/value scanning for Valve's text formats (`libraryfolders.vdf`, `appmanifest_*.acf`).
//!
//! This is a permissive scanner, not a structural parser: every `"key" "value"` pair is
//! reported regardless of how deeply it is nested in `{ }` sections.
//!
//! ```ignore
//! let map = key_values(r#""AppState" { "appid" "440" "installdir" "Team Fortress 2" }"#);
//! assert_eq!(map.get("installdir").map(String::as_str), Some("Team Fortress 2"));
//! ```

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// `"key"` then whitespace then `"value"`. Keys must be non-empty, values may be empty.
static PAIR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s+"([^"]*)""#).expect("Invalid key/value regex"));

/// Every `"key" "value"` pair in `text`, in order of appearance.
///
/// Malformed fragments (unbalanced quotes, a key followed by `{`) are skipped.
pub fn extract_pairs(text: &str) -> Vec<(String, String)> {
    PAIR_PATTERN
        .captures_iter(text)
        .map(|cap| (cap[1].to_string(), cap[2].to_string()))
        .collect()
}

/// Collapse the pairs of `text` into a mapping; a key seen twice keeps its last value.
///
/// Insertion order is that of each key's first appearance.
pub fn key_values(text: &str) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for (key, value) in extract_pairs(text) {
        map.insert(key, value);
    }
    map
}

/// All values recorded under `key` (exact, case-sensitive match), in order.
pub fn values_for<'a>(pairs: &'a [(String, String)], key: &'a str) -> impl Iterator<Item = &'a str> {
    pairs
        .iter()
        .filter(move |(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#""AppState"
{
	"appid"		"440"
	"Universe"		"1"
	"name"		"Team Fortress 2"
	"StateFlags"		"4"
	"installdir"		"Team Fortress 2"
	"LastUpdated"		"1700000000"
	"SizeOnDisk"		"28790222851"
	"buildid"		"13217711"
	"InstalledDepots"
	{
		"441"
		{
			"manifest"		"7112347451327430298"
			"size"		"28790222851"
		}
	}
}
"#;

    #[test]
    fn test_extracts_top_level_and_nested_pairs() {
        let pairs = extract_pairs(MANIFEST);
        assert!(pairs.contains(&("appid".to_string(), "440".to_string())));
        assert!(pairs.contains(&("manifest".to_string(), "7112347451327430298".to_string())));
    }

    #[test]
    fn test_section_headers_are_not_pairs() {
        let map = key_values(MANIFEST);
        assert!(!map.contains_key("AppState"));
        assert!(!map.contains_key("InstalledDepots"));
        assert!(!map.contains_key("441"));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let map = key_values("\"k\" \"first\"\n{ \"k\" \"second\" }");
        assert_eq!(map.get("k").map(String::as_str), Some("second"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_empty_value_is_kept() {
        let map = key_values("\"LastOwner\"\t\"\"\n\"name\"\t\"Game\"");
        assert_eq!(map.get("LastOwner").map(String::as_str), Some(""));
        assert_eq!(map.get("name").map(String::as_str), Some("Game"));
    }

    #[test]
    fn test_malformed_quoting_is_skipped() {
        let pairs = extract_pairs("\"broken \"name\" \"ok\"\n\"dangling");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "ok");
    }

    #[test]
    fn test_no_pairs_in_plain_text() {
        assert!(extract_pairs("no quotes here").is_empty());
        assert!(extract_pairs("").is_empty());
    }

    #[test]
    fn test_values_for_collects_every_occurrence() {
        let pairs = extract_pairs(
            "\"0\" { \"path\" \"C:\\\\Steam\" }\n\"1\" { \"path\" \"D:\\\\Games\" \"label\" \"\" }",
        );
        let paths: Vec<&str> = values_for(&pairs, "path").collect();
        assert_eq!(paths, vec!["C:\\\\Steam", "D:\\\\Games"]);
    }
}
