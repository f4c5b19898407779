use crate::models::AppId;
use regex::Regex;

/// Lua line comment marker
pub const COMMENT_MARKER: &str = "--";

/// First line written into a script while downloads are disabled
pub const HEADER_MARKER: &str = "-- LUATOOLS: UPDATES DISABLED!";

/// Directive declaring a depot (or the app itself) to download
pub const DEPOT_KEYWORD: &str = "addappid";

/// Directive pinning a depot to a specific manifest/build
pub const MANIFEST_PIN_KEYWORD: &str = "setManifestid";

/// Coarse category of one script line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCategory {
    /// The disabled-state header on line 1
    Header,
    /// A `--` comment; may wrap a recognised directive
    CommentWrappedDirective,
    /// A recognised directive that is live
    ActiveDirective,
    /// Anything else, including blank lines and single-argument `addappid(id)`
    PlainOther,
}

/// Which directive a line carries, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    None,
    /// Three-argument `addappid(id, flag, "key")`
    DepotDeclaration,
    /// `setManifestid(...)`
    ManifestPin,
}

/// One classified script line, borrowing from the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine<'a> {
    /// Original line, leading whitespace included
    pub raw: &'a str,
    pub category: LineCategory,
    pub directive: DirectiveKind,
    /// First argument of a three-argument depot declaration
    pub embedded_id: Option<AppId>,
    /// Trimmed text with any comment marker removed
    pub content: &'a str,
}

impl<'a> ConfigLine<'a> {
    /// Leading whitespace of the original line
    pub fn indent(&self) -> &'a str {
        &self.raw[..self.raw.len() - self.raw.trim_start().len()]
    }

    /// The line as a live statement at its original indentation
    pub fn uncommented(&self) -> String {
        format!("{}{}", self.indent(), self.content)
    }

    /// The line commented out at its original indentation
    pub fn commented(&self) -> String {
        format!("{}{} {}", self.indent(), COMMENT_MARKER, self.content)
    }

    /// A depot declaration for some app other than `main_id`
    pub fn is_foreign_depot(&self, main_id: &AppId) -> bool {
        self.directive == DirectiveKind::DepotDeclaration
            && self.embedded_id.as_ref().is_some_and(|id| id != main_id)
    }
}

/// Classifies LuaTools script lines.
///
/// Classification is pure: it depends only on the line text, except that
/// [`classify_script`](Self::classify_script) checks line 1 for the header.
pub struct LineClassifier {
    /// Matches `addappid(<digits>, <digits>, "<non-empty>")`, capturing the first id
    depot_pattern: Regex,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            depot_pattern: Regex::new(
                r#"(?i)^addappid\s*\(\s*([0-9]+)\s*,\s*[0-9]+\s*,\s*"[^"]+"\s*\)"#,
            )
            .expect("Invalid depot regex"),
        }
    }

    /// Classify a single line, ignoring position.
    pub fn classify<'a>(&self, raw: &'a str) -> ConfigLine<'a> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return plain(raw, trimmed);
        }

        if let Some(rest) = trimmed.strip_prefix(COMMENT_MARKER) {
            let inner = rest.trim();
            let (directive, embedded_id) = self.directive_of(inner);
            return ConfigLine {
                raw,
                category: LineCategory::CommentWrappedDirective,
                directive,
                embedded_id,
                content: inner,
            };
        }

        match self.directive_of(trimmed) {
            (DirectiveKind::None, _) => plain(raw, trimmed),
            (directive, embedded_id) => ConfigLine {
                raw,
                category: LineCategory::ActiveDirective,
                directive,
                embedded_id,
                content: trimmed,
            },
        }
    }

    /// Classify every line; line 1 becomes [`LineCategory::Header`] if it is the header marker.
    pub fn classify_script<'a, S: AsRef<str>>(&self, lines: &'a [S]) -> Vec<ConfigLine<'a>> {
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let line = line.as_ref();
                if index == 0 && is_header(line) {
                    ConfigLine {
                        raw: line,
                        category: LineCategory::Header,
                        directive: DirectiveKind::None,
                        embedded_id: None,
                        content: line.trim(),
                    }
                } else {
                    self.classify(line)
                }
            })
            .collect()
    }

    fn directive_of(&self, text: &str) -> (DirectiveKind, Option<AppId>) {
        if starts_with_ignore_case(text, MANIFEST_PIN_KEYWORD) {
            return (DirectiveKind::ManifestPin, None);
        }

        if starts_with_ignore_case(text, DEPOT_KEYWORD) {
            if let Some(cap) = self.depot_pattern.captures(text) {
                return (
                    DirectiveKind::DepotDeclaration,
                    Some(AppId::from_digits(&cap[1])),
                );
            }
        }

        (DirectiveKind::None, None)
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `line` (trimmed) is exactly the disabled-state header
pub fn is_header(line: &str) -> bool {
    line.trim() == HEADER_MARKER
}

fn plain<'a>(raw: &'a str, trimmed: &'a str) -> ConfigLine<'a> {
    ConfigLine {
        raw,
        category: LineCategory::PlainOther,
        directive: DirectiveKind::None,
        embedded_id: None,
        content: trimmed,
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AppId {
        AppId::new(s).unwrap()
    }

    #[test]
    fn test_blank_lines_are_plain() {
        let classifier = LineClassifier::new();
        for line in ["", "   ", "\t"] {
            let classified = classifier.classify(line);
            assert_eq!(classified.category, LineCategory::PlainOther);
            assert_eq!(classified.directive, DirectiveKind::None);
        }
    }

    #[test]
    fn test_active_depot_declaration() {
        let classifier = LineClassifier::new();
        let line = classifier.classify(r#"addappid(1245621, 1, "0a1b2c3d")"#);
        assert_eq!(line.category, LineCategory::ActiveDirective);
        assert_eq!(line.directive, DirectiveKind::DepotDeclaration);
        assert_eq!(line.embedded_id, Some(id("1245621")));
    }

    #[test]
    fn test_single_argument_addappid_is_plain() {
        let classifier = LineClassifier::new();
        let line = classifier.classify("addappid(1245620)");
        assert_eq!(line.category, LineCategory::PlainOther);
        assert_eq!(line.embedded_id, None);

        let line = classifier.classify("-- addappid(1245620)");
        assert_eq!(line.category, LineCategory::CommentWrappedDirective);
        assert_eq!(line.directive, DirectiveKind::None);
    }

    #[test]
    fn test_depot_pattern_requires_non_empty_key() {
        let classifier = LineClassifier::new();
        let line = classifier.classify(r#"addappid(10,1,"")"#);
        assert_eq!(line.category, LineCategory::PlainOther);
    }

    #[test]
    fn test_keywords_are_case_insensitive_and_whitespace_tolerant() {
        let classifier = LineClassifier::new();

        let line = classifier.classify(r#"  AddAppId ( 7 , 0 , "k" )"#);
        assert_eq!(line.directive, DirectiveKind::DepotDeclaration);
        assert_eq!(line.embedded_id, Some(id("7")));
        assert_eq!(line.indent(), "  ");

        let line = classifier.classify(r#"SETMANIFESTID(7, "123")"#);
        assert_eq!(line.category, LineCategory::ActiveDirective);
        assert_eq!(line.directive, DirectiveKind::ManifestPin);
    }

    #[test]
    fn test_comment_wrapped_pin_and_depot() {
        let classifier = LineClassifier::new();

        let line = classifier.classify(r#"    --setManifestid(100, "55", 0)"#);
        assert_eq!(line.category, LineCategory::CommentWrappedDirective);
        assert_eq!(line.directive, DirectiveKind::ManifestPin);
        assert_eq!(line.uncommented(), r#"    setManifestid(100, "55", 0)"#);

        let line = classifier.classify(r#"-- addappid(200,250,"xyz")"#);
        assert_eq!(line.category, LineCategory::CommentWrappedDirective);
        assert_eq!(line.directive, DirectiveKind::DepotDeclaration);
        assert_eq!(line.embedded_id, Some(id("200")));
    }

    #[test]
    fn test_ordinary_comment() {
        let classifier = LineClassifier::new();
        let line = classifier.classify("-- 100's Lua and Manifest Created by Morrenus");
        assert_eq!(line.category, LineCategory::CommentWrappedDirective);
        assert_eq!(line.directive, DirectiveKind::None);
    }

    #[test]
    fn test_other_statements_are_plain() {
        let classifier = LineClassifier::new();
        assert_eq!(
            classifier.classify("setting = true").category,
            LineCategory::PlainOther
        );
        assert_eq!(
            classifier.classify("addtoken(1, \"x\")").category,
            LineCategory::PlainOther
        );
    }

    #[test]
    fn test_header_only_on_first_line() {
        let classifier = LineClassifier::new();
        let lines = [HEADER_MARKER, HEADER_MARKER];
        let classified = classifier.classify_script(&lines);
        assert_eq!(classified[0].category, LineCategory::Header);
        assert_eq!(
            classified[1].category,
            LineCategory::CommentWrappedDirective
        );
    }

    #[test]
    fn test_commented_keeps_indent() {
        let classifier = LineClassifier::new();
        let line = classifier.classify("\taddappid(3, 1, \"k\")   ");
        assert_eq!(line.commented(), "\t-- addappid(3, 1, \"k\")");
    }

    #[test]
    fn test_foreign_depot_check() {
        let classifier = LineClassifier::new();
        let line = classifier.classify(r#"addappid(200,250,"xyz")"#);
        assert!(line.is_foreign_depot(&id("100")));
        assert!(!line.is_foreign_depot(&id("200")));
        assert!(!classifier.classify("addappid(300)").is_foreign_depot(&id("100")));
    }
}
