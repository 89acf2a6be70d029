//! Identifier slugs for anchors, labels and toggle ids.

use deunicode::deunicode;

/// Turn free text into an HTML/LaTeX-safe identifier.
///
/// Transliterates to ASCII, lowercases, and collapses every run of
/// non-alphanumeric characters into a single `-`. Leading and trailing
/// separators are dropped.
///
/// # Example
/// ```ignore
/// assert_eq!(make_id("Größe & Maß"), "grosse-mass");
/// ```
pub fn make_id(text: &str) -> String {
    let ascii = deunicode(text).to_ascii_lowercase();
    let mut id = String::with_capacity(ascii.len());
    let mut pending_sep = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !id.is_empty() {
                id.push('-');
            }
            pending_sep = false;
            id.push(c);
        } else {
            pending_sep = true;
        }
    }
    id
}
