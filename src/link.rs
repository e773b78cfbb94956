//! Share-link parsing and the glob-like file name filter.

use regex::Regex;

use crate::error::{Error, Result};

/// Fixed prefix every Tsinghua Cloud share link starts with.
pub const SHARE_LINK_PREFIX: &str = "https://cloud.tsinghua.edu.cn/d/";

/// Extracts the share key from a share link.
///
/// The link must start with [`SHARE_LINK_PREFIX`]; the remainder with all
/// path separators removed is the key. An empty remainder is rejected so a
/// bare `.../d/` link fails here instead of producing garbage API URLs.
///
/// # Errors
///
/// Returns [`Error::InvalidLink`] for links that do not start with the
/// prefix or that contain no key.
pub fn derive_share_key(link: &str) -> Result<String> {
    let invalid = || Error::InvalidLink {
        link: link.to_string(),
        prefix: SHARE_LINK_PREFIX,
    };

    let rest = link.strip_prefix(SHARE_LINK_PREFIX).ok_or_else(invalid)?;
    let key: String = rest.chars().filter(|&c| c != '/').collect();
    if key.is_empty() {
        return Err(invalid());
    }
    Ok(key)
}

/// Compiles a glob-like pattern into an anchored regex.
///
/// `*` matches any run of characters; every other character matches
/// literally. The regex is anchored on both ends, so a match must span the
/// entire file name: `*.pdf` accepts `report.pdf` but not `report.pdf.bak`.
///
/// # Errors
///
/// Returns [`Error::Pattern`] if the resulting expression fails to compile
/// (only possible for pathologically long patterns).
pub fn pattern_to_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str(r"\A");
    for c in pattern.chars() {
        if c == '*' {
            expr.push_str(".*");
        } else {
            expr.push_str(&regex::escape(&c.to_string()));
        }
    }
    expr.push_str(r"\z");
    Regex::new(&expr).map_err(|e| Error::Pattern(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- derive_share_key ---

    #[test]
    fn key_from_plain_link() {
        let key = derive_share_key("https://cloud.tsinghua.edu.cn/d/abc123def").unwrap();
        assert_eq!(key, "abc123def");
    }

    #[test]
    fn key_strips_trailing_slash() {
        let key = derive_share_key("https://cloud.tsinghua.edu.cn/d/abc123def/").unwrap();
        assert_eq!(key, "abc123def");
    }

    #[test]
    fn key_strips_interior_slashes() {
        let key = derive_share_key("https://cloud.tsinghua.edu.cn/d/abc/123/").unwrap();
        assert_eq!(key, "abc123");
    }

    #[test]
    fn wrong_host_rejected() {
        let err = derive_share_key("https://example.com/d/abc123").unwrap_err();
        assert!(matches!(err, Error::InvalidLink { .. }));
    }

    #[test]
    fn http_scheme_rejected() {
        // The prefix is exact, including the scheme.
        assert!(derive_share_key("http://cloud.tsinghua.edu.cn/d/abc").is_err());
    }

    #[test]
    fn empty_key_rejected() {
        assert!(derive_share_key("https://cloud.tsinghua.edu.cn/d/").is_err());
        assert!(derive_share_key("https://cloud.tsinghua.edu.cn/d///").is_err());
    }

    // --- pattern_to_regex ---

    #[test]
    fn star_matches_any_prefix() {
        let re = pattern_to_regex("*.pdf").unwrap();
        assert!(re.is_match("report.pdf"));
        assert!(re.is_match(".pdf"));
    }

    #[test]
    fn match_must_span_whole_name() {
        let re = pattern_to_regex("*.pdf").unwrap();
        assert!(!re.is_match("report.pdf.bak"));
    }

    #[test]
    fn literal_pattern_is_exact() {
        let re = pattern_to_regex("data.csv").unwrap();
        assert!(re.is_match("data.csv"));
        assert!(!re.is_match("data_csv"));
        assert!(!re.is_match("mydata.csv"));
    }

    #[test]
    fn metacharacters_are_escaped() {
        let re = pattern_to_regex("a+b.txt").unwrap();
        assert!(re.is_match("a+b.txt"));
        assert!(!re.is_match("aab.txt"));
        assert!(!re.is_match("a+bxtxt"));
    }

    #[test]
    fn interior_star() {
        let re = pattern_to_regex("lec*_notes.md").unwrap();
        assert!(re.is_match("lec01_notes.md"));
        assert!(re.is_match("lec_notes.md"));
        assert!(!re.is_match("lec01_notes.md.old"));
    }

    #[test]
    fn bare_star_matches_everything() {
        let re = pattern_to_regex("*").unwrap();
        assert!(re.is_match(""));
        assert!(re.is_match("anything at all.bin"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn derived_key_never_contains_separator(tail in "[a-zA-Z0-9/]{1,40}") {
                let link = format!("{SHARE_LINK_PREFIX}{tail}");
                if let Ok(key) = derive_share_key(&link) {
                    prop_assert!(!key.contains('/'));
                    prop_assert!(!key.is_empty());
                }
            }

            #[test]
            fn literal_patterns_match_themselves(name in "[a-zA-Z0-9_.+()\\[\\]-]{1,30}") {
                // Names without '*' used as patterns must match exactly themselves.
                let re = pattern_to_regex(&name).unwrap();
                prop_assert!(re.is_match(&name));
                let with_suffix = format!("{name}x");
                prop_assert!(!re.is_match(&with_suffix));
            }
        }
    }
}
