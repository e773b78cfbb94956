//! HTML extraction helpers for the share landing and viewer pages.
//!
//! These are deliberately pure string functions with no network access, so
//! the fragile markup-dependent patterns can be pinned down by fixture
//! tests. The session code in [`crate::api`] is the only caller.

use std::sync::LazyLock;

use regex::Regex;

static CSRF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input type="hidden" name="csrfmiddlewaretoken" value="([^"]+)">"#)
        .expect("valid regex")
});

static RAW_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rawPath: '([^\n\r']+)'").expect("valid regex"));

/// Extracts the hidden CSRF token from a share landing page.
///
/// Returns `None` when the page carries no token, which is the normal case
/// for shares without a password gate.
#[must_use]
pub fn extract_csrf_token(html: &str) -> Option<&str> {
    CSRF_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Extracts the embedded `rawPath: '...'` marker from a media viewer page.
///
/// The returned value is still escaped exactly as it appears in the page
/// source; run it through [`unescape_raw_path`] before use.
#[must_use]
pub fn extract_raw_path(html: &str) -> Option<&str> {
    RAW_PATH_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Decodes an extracted raw path into the literal URL/path it denotes.
///
/// Viewer pages embed the path inside a JavaScript string literal, so
/// backslash escape sequences (`\n`, `\t`, `\uXXXX`, ...) are interpreted.
/// Percent-encoded bytes (`%20`) are decoded as well, since the markup
/// carries the path in URL-escaped form. Unknown escapes and malformed
/// percent sequences are passed through unchanged.
#[must_use]
pub fn unescape_raw_path(raw: &str) -> String {
    percent_decode(&backslash_decode(raw))
}

fn backslash_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    None => out.push_str("\\u"),
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = s.get(i + 1..i + 3)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- extract_csrf_token ---

    #[test]
    fn csrf_token_found() {
        let html = r#"<form method="post">
<input type="hidden" name="csrfmiddlewaretoken" value="Xy12abcDEF">
<input type="password" name="password">
</form>"#;
        assert_eq!(extract_csrf_token(html), Some("Xy12abcDEF"));
    }

    #[test]
    fn csrf_token_absent() {
        let html = "<html><body><div id=\"shared-dir-view\"></div></body></html>";
        assert_eq!(extract_csrf_token(html), None);
    }

    #[test]
    fn csrf_token_first_of_many() {
        let html = concat!(
            r#"<input type="hidden" name="csrfmiddlewaretoken" value="first">"#,
            "\n",
            r#"<input type="hidden" name="csrfmiddlewaretoken" value="second">"#,
        );
        assert_eq!(extract_csrf_token(html), Some("first"));
    }

    // --- extract_raw_path ---

    #[test]
    fn raw_path_found() {
        let html = "<script>\nvar pageOptions = {\nrawPath: '/seafhttp/files/abc/b.jpg',\n};\n</script>";
        assert_eq!(extract_raw_path(html), Some("/seafhttp/files/abc/b.jpg"));
    }

    #[test]
    fn raw_path_absent() {
        assert_eq!(extract_raw_path("<html>no marker here</html>"), None);
    }

    #[test]
    fn raw_path_stops_at_quote() {
        let html = "rawPath: '/a/b.mp4', other: 'x'";
        assert_eq!(extract_raw_path(html), Some("/a/b.mp4"));
    }

    #[test]
    fn raw_path_does_not_cross_lines() {
        let html = "rawPath: '/broken\nacross lines'";
        assert_eq!(extract_raw_path(html), None);
    }

    // --- unescape_raw_path ---

    #[test]
    fn unescape_plain_path_unchanged() {
        assert_eq!(unescape_raw_path("/foo/bar.mp4"), "/foo/bar.mp4");
    }

    #[test]
    fn unescape_percent_encoding() {
        assert_eq!(unescape_raw_path("/foo/bar%20baz.mp4"), "/foo/bar baz.mp4");
    }

    #[test]
    fn unescape_unicode_escape() {
        assert_eq!(unescape_raw_path(r"/dir/\u0026name.jpg"), "/dir/&name.jpg");
    }

    #[test]
    fn unescape_backslash_sequences() {
        assert_eq!(unescape_raw_path(r"a\tb"), "a\tb");
        assert_eq!(unescape_raw_path(r"a\\b"), r"a\b");
        assert_eq!(unescape_raw_path(r"a\'b"), "a'b");
    }

    #[test]
    fn unescape_unknown_escape_passes_through() {
        assert_eq!(unescape_raw_path(r"a\qb"), r"a\qb");
    }

    #[test]
    fn unescape_truncated_sequences_pass_through() {
        assert_eq!(unescape_raw_path(r"tail\u12"), r"tail\u12");
        assert_eq!(unescape_raw_path("tail%2"), "tail%2");
        assert_eq!(unescape_raw_path("bad%zz"), "bad%zz");
    }

    #[test]
    fn unescape_full_url() {
        assert_eq!(
            unescape_raw_path("https://cloud.tsinghua.edu.cn/seafhttp/files/t0k3n/b%20c.jpg"),
            "https://cloud.tsinghua.edu.cn/seafhttp/files/t0k3n/b c.jpg"
        );
    }
}
