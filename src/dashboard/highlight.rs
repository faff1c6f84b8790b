//! JSON pretty-printing with token highlighting.
//!
//! Tokens are matched on the already escaped text and wrapped in
//! `<span class="key|string|boolean|null|number">`.

use super::escape::escape_json_text;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"("(\\u[a-zA-Z0-9]{4}|\\[^u]|[^\\"])*"(\s*:)?|\b(true|false|null)\b|-?\d+(?:\.\d*)?(?:[eE][+\-]?\d+)?)"#,
    )
    .expect("static regex")
});

/// Highlight class of one JSON token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Key,
    String,
    Boolean,
    Null,
    Number,
}

impl TokenClass {
    /// Classify a matched token.
    #[must_use]
    pub fn of(token: &str) -> Self {
        if token.starts_with('"') {
            if token.ends_with(':') {
                Self::Key
            } else {
                Self::String
            }
        } else if token.contains("true") || token.contains("false") {
            Self::Boolean
        } else if token.contains("null") {
            Self::Null
        } else {
            Self::Number
        }
    }

    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Number => "number",
        }
    }
}

/// Serialize with 4-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Wrap tokens of escaped JSON text in highlight spans.
///
/// The input must already be escaped; nothing is escaped here.
#[must_use]
pub fn highlight_escaped(escaped: &str) -> String {
    TOKEN
        .replace_all(escaped, |caps: &Captures<'_>| {
            let token = &caps[0];
            format!(
                "<span class=\"{}\">{}</span>",
                TokenClass::of(token).css_class(),
                token
            )
        })
        .into_owned()
}

/// Pretty-print, escape once, then highlight.
pub fn syntax_highlight<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let json = to_pretty_json(value)?;
    Ok(highlight_escaped(&escape_json_text(&json)))
}
