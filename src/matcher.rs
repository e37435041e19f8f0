//! Line matcher: classifies one logical line as a section header or a
//! `key = value` property and measures its indentation depth.
//!
//! Grammar (per line, after the scanner removed blank and comment lines):
//!
//! ```text
//! section-header := indent key [ws comment]
//! key-value      := indent key ws? "=" ws? ( quoted-value [ws comment] | bare-value )
//! indent         := ("    ")*
//! key            := [A-Za-z0-9] [A-Za-z0-9/]*
//! quoted-value   := '"' [^"]* '"' | "'" [^']* "'"
//! bare-value     := non-space text, a `#` preceded by whitespace starts a comment
//! ```

use crate::error::{Error, Location};

/// Spaces per nesting level.
pub(crate) const INDENT_STEP: usize = 4;

/// A structurally classified line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MatchedLine {
    /// Nesting depth in units of [`INDENT_STEP`] spaces.
    pub(crate) depth: usize,
    pub(crate) key: String,
    /// `None` for a section header.
    pub(crate) value: Option<String>,
}

#[inline]
pub(crate) fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '/'
}

/// Whether `name` is a well-formed ZPL key.
pub(crate) fn is_valid_key(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphanumeric()) && name.chars().all(is_key_char)
}

/// Classify `text`, which must be neither blank nor a comment line.
pub(crate) fn match_line(text: &str, location: Location) -> Result<MatchedLine, Error> {
    let indent = text.bytes().take_while(|b| *b == b' ').count();
    if text[indent..].starts_with('\t') {
        return Err(Error::syntax(
            "tab character in indentation, expected multiples of 4 spaces",
            location,
        ));
    }
    if indent % INDENT_STEP != 0 {
        return Err(Error::syntax(
            format!("indentation of {indent} spaces is not a multiple of {INDENT_STEP}"),
            location,
        ));
    }

    let rest = text[indent..].trim_end();
    let key_len = rest.find(|c: char| !is_key_char(c)).unwrap_or(rest.len());
    let key = &rest[..key_len];
    if !is_valid_key(key) {
        let msg = match rest.chars().next() {
            Some('/') => "key must start with a letter or digit".to_string(),
            Some(c) => format!("expected a key (letters, digits or `/`), found `{c}`"),
            None => "expected a key".to_string(),
        };
        return Err(Error::syntax(msg, location));
    }

    let after = &rest[key_len..];
    let after_ws = after.trim_start_matches([' ', '\t']);
    let had_ws = after_ws.len() != after.len();

    let value = match after_ws.chars().next() {
        None => None,
        Some('#') if had_ws => None,
        Some('=') => Some(match_value(key, &after_ws[1..], location)?),
        Some(c) => {
            return Err(Error::syntax(
                format!("unexpected `{c}` after key `{key}`, expected `=` or end of line"),
                location,
            ));
        }
    };

    Ok(MatchedLine {
        depth: indent / INDENT_STEP,
        key: key.to_string(),
        value,
    })
}

/// Extract the value from the text following `=`.
fn match_value(key: &str, raw: &str, location: Location) -> Result<String, Error> {
    let trimmed = raw.trim_start_matches([' ', '\t']);
    match trimmed.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &trimmed[1..];
            let Some(end) = body.find(quote) else {
                return Err(Error::syntax(
                    format!("unterminated quoted value for `{key}`"),
                    location,
                ));
            };
            let tail = body[end + 1..].trim_start_matches([' ', '\t']);
            if !tail.is_empty() && !tail.starts_with('#') {
                return Err(Error::syntax(
                    format!("unexpected text after quoted value for `{key}`"),
                    location,
                ));
            }
            Ok(body[..end].to_string())
        }
        _ => {
            let value = strip_trailing_comment(raw).trim();
            if value.is_empty() {
                return Err(Error::syntax(format!("missing value for `{key}`"), location));
            }
            Ok(value.to_string())
        }
    }
}

/// Cut `raw` at the first `#` that follows whitespace.
fn strip_trailing_comment(raw: &str) -> &str {
    let mut prev_ws = false;
    for (idx, c) in raw.char_indices() {
        if c == '#' && prev_ws {
            return &raw[..idx];
        }
        prev_ws = c == ' ' || c == '\t';
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(text: &str) -> MatchedLine {
        match_line(text, Location::new(1)).unwrap()
    }

    fn err(text: &str) -> Error {
        match_line(text, Location::new(7)).unwrap_err()
    }

    #[test]
    fn section_header() {
        assert_eq!(
            ok("        frontend"),
            MatchedLine {
                depth: 2,
                key: "frontend".into(),
                value: None
            }
        );
        assert_eq!(ok("main   # the main device").value, None);
    }

    #[test]
    fn bare_value_keeps_everything_after_equals() {
        let m = ok("    bind = tcp://eth0:5555");
        assert_eq!(m.depth, 1);
        assert_eq!(m.key, "bind");
        assert_eq!(m.value.as_deref(), Some("tcp://eth0:5555"));
        assert_eq!(ok("a=b c").value.as_deref(), Some("b c"));
        assert_eq!(ok("a = x#y").value.as_deref(), Some("x#y"));
        assert_eq!(ok("a = x  # note").value.as_deref(), Some("x"));
    }

    #[test]
    fn quoted_value_preserves_hash() {
        assert_eq!(ok(r##"subscribe = "#2""##).value.as_deref(), Some("#2"));
        assert_eq!(ok("name = ' padded '").value.as_deref(), Some(" padded "));
        assert_eq!(ok(r#"name = "" # empty"#).value.as_deref(), Some(""));
    }

    #[test]
    fn keys_may_contain_slashes() {
        assert_eq!(ok("a/b/c = 1").key, "a/b/c");
    }

    #[test]
    fn rejects_malformed_lines() {
        for text in [
            "invalid line with spaces",
            "   key = three spaces",
            "\tkey = tab",
            "key =",
            "key = # only a comment",
            "key = \"open",
            "key = \"closed\" trailing",
            "/key = 1",
            "ke_y = 1",
            "= 1",
        ] {
            let error = err(text);
            assert!(
                matches!(error, Error::Syntax { location, .. } if location.line() == 7),
                "{text:?} gave {error:?}"
            );
        }
    }

    #[test]
    fn valid_key_check() {
        assert!(is_valid_key("a1/b"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("/a"));
        assert!(!is_valid_key("*"));
        assert!(!is_valid_key("with space"));
    }
}
