//! Escaping utilities for safe page generation.
//!
//! Node records come from the kitchen repository and may contain anything:
//! every attribute value is escaped before it is embedded in a page.

/// Escape a string for safe inclusion in HTML content.
///
/// Escapes `&`, `<`, `>`, `"` and `'`.
///
/// # Examples
///
/// ```
/// use kitchen::dashboard::escape::escape_html;
///
/// assert_eq!(escape_html("<script>alert('xss')</script>"),
///     "&lt;script&gt;alert(&#x27;xss&#x27;)&lt;/script&gt;");
///
/// assert_eq!(escape_html("safe text"), "safe text");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for safe inclusion in HTML attributes.
///
/// Stricter than content escaping: whitespace control characters are
/// encoded as well.
///
/// ```
/// use kitchen::dashboard::escape::escape_html_attr;
///
/// assert_eq!(escape_html_attr("/?roles=web\"x"), "/?roles=web&quot;x");
/// ```
pub fn escape_html_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            '\t' => result.push_str("&#9;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape serialized JSON for a `<pre>` block.
///
/// Only `&`, `<` and `>` are touched so quotes stay visible to the
/// highlighter, which matches tokens on the escaped text.
///
/// ```
/// use kitchen::dashboard::escape::escape_json_text;
///
/// assert_eq!(escape_json_text(r#"{"a": "<b> & \"c\""}"#),
///     r#"{"a": "&lt;b&gt; &amp; \"c\""}"#);
/// ```
pub fn escape_json_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}
