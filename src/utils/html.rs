//! HTML and LaTeX text escaping.
//!
//! - `escape()`, `escape_attr()` - HTML entity escaping
//! - `escape_latex()` - LaTeX special character escaping

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape("<script>"), "&lt;script&gt;");
/// assert_eq!(escape("hello"), "hello"); // No allocation
/// ```
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape HTML attribute values.
///
/// Identical to `escape()` but semantically indicates attribute context.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

// =============================================================================
// LaTeX Escaping
// =============================================================================

const LATEX_SPECIALS: [char; 10] = ['\\', '{', '}', '$', '&', '#', '%', '_', '^', '~'];

/// Escape LaTeX special characters in running text.
pub fn escape_latex(s: &str) -> Cow<'_, str> {
    if !s.contains(LATEX_SPECIALS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => result.push_str(r"\textbackslash{}"),
            '^' => result.push_str(r"\textasciicircum{}"),
            '~' => result.push_str(r"\textasciitilde{}"),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
