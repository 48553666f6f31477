use std::collections::HashMap;
use std::ops::Range;

use log::debug;
use regex::{Regex, RegexBuilder};

/// Characters that must be escaped so they match literally inside a pattern.
const SPECIAL_CHARS: &str = ".()[\\+$^*|?";

/// Compiles search text into fuzzy patterns and finds the tightest match.
///
/// A search string is turned into a case-insensitive pattern with a minimal
/// wildcard between every non-whitespace character, so "abc" matches any
/// candidate containing a, b, c in order with arbitrary characters between
/// them. Compiled patterns are cached by search text for the lifetime of the
/// matcher; the keyspace is bounded by the keystrokes of one session.
pub struct Matcher {
    cache: HashMap<String, Regex>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Compile `search` into a reusable pattern.
    ///
    /// Returns `None` when the search contains no matchable characters; a
    /// wildcard-only pattern is degenerate and callers treat that case as
    /// "match everything" without invoking the engine.
    pub fn compile(&mut self, search: &str) -> Option<Regex> {
        if let Some(pattern) = self.cache.get(search) {
            return Some(pattern.clone());
        }

        let pattern = build_pattern(search);
        if pattern.is_empty() {
            return None;
        }

        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(compiled) => {
                self.cache.insert(search.to_string(), compiled.clone());
                Some(compiled)
            }
            Err(err) => {
                // Unreachable given the escaping above; treated as no match.
                debug!("pattern {pattern:?} failed to compile: {err}");
                None
            }
        }
    }
}

fn build_pattern(search: &str) -> String {
    let mut pattern = String::new();
    for ch in search.chars() {
        if ch.is_whitespace() {
            continue;
        }

        if !pattern.is_empty() {
            pattern.push_str(".*?");
        }

        if SPECIAL_CHARS.contains(ch) {
            pattern.push('\\');
        }

        pattern.push(ch);
    }

    pattern
}

/// Find the shortest span of `haystack` matching `pattern`.
///
/// All non-overlapping matches the engine reports are considered and the
/// shortest wins; ties go to the earliest. The span length is the ranking
/// signal, shorter meaning a tighter fuzzy fit.
pub fn find(haystack: &str, pattern: &Regex) -> Option<Range<usize>> {
    pattern
        .find_iter(haystack)
        .min_by_key(|found| found.end() - found.start())
        .map(|found| found.range())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_str<'a>(haystack: &'a str, search: &str) -> Option<&'a str> {
        let mut matcher = Matcher::new();
        let pattern = matcher.compile(search)?;
        find(haystack, &pattern).map(|span| &haystack[span])
    }

    #[test]
    fn test_empty_search_does_not_compile() {
        let mut matcher = Matcher::new();
        assert!(matcher.compile("").is_none());
        assert!(matcher.compile("   \t ").is_none());
    }

    #[test]
    fn test_characters_match_in_order_with_gaps() {
        assert_eq!(find_str("a1b2c", "abc"), Some("a1b2c"));
        assert!(find_str("Alphabet Connector", "abc").is_some());
        assert_eq!(find_str("cba", "abc"), None);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(find_str("Firefox", "FX").is_some());
        assert!(find_str("FIREFOX", "fx").is_some());
    }

    #[test]
    fn test_only_candidates_with_all_characters_match() {
        assert!(find_str("Firefox", "fx").is_some());
        assert_eq!(find_str("Files", "fx"), None);
        assert_eq!(find_str("Terminal", "fx"), None);
    }

    #[test]
    fn test_shortest_non_overlapping_match_wins() {
        // "a...b" at the start is longer than the tight "ab" further in.
        assert_eq!(find_str("axxb ab", "ab"), Some("ab"));
    }

    #[test]
    fn test_search_whitespace_is_ignored() {
        assert_eq!(find_str("a1b2c", "a b c"), Some("a1b2c"));
    }

    #[test]
    fn test_metacharacters_match_literally() {
        assert!(find_str("c++ compiler", "c++").is_some());
        assert_eq!(find_str("abc", "."), None);
        assert_eq!(find_str("a.c", "."), Some("."));
        assert_eq!(find_str("x|y", "|"), Some("|"));
    }

    #[test]
    fn test_span_contains_search_characters_in_order() {
        for (haystack, search) in [
            ("Firefox", "fx"),
            ("Visual Studio Code", "vsc"),
            ("a1b2c3", "abc"),
            ("xx c++ yy", "c+"),
        ] {
            let span = find_str(haystack, search).unwrap().to_lowercase();
            let mut rest = span.as_str();
            for ch in search.chars().filter(|ch| !ch.is_whitespace()) {
                let pos = rest
                    .find(ch.to_ascii_lowercase())
                    .unwrap_or_else(|| panic!("{ch:?} not found in order in {span:?}"));
                rest = &rest[pos + ch.len_utf8()..];
            }
        }
    }

    #[test]
    fn test_recompilation_is_cached() {
        let mut matcher = Matcher::new();
        let first = matcher.compile("abc").unwrap();
        let second = matcher.compile("abc").unwrap();
        assert_eq!(first.as_str(), second.as_str());
        assert_eq!(matcher.cache.len(), 1);
    }
}
