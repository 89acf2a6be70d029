//! Private-use placeholders shielding extension output from the markdown engine.
//!
//! Directive and role output is stored aside and replaced by a token of the
//! form `\u{E000}N\u{E001}`. Block tokens sit alone in a paragraph, which the
//! restore pass unwraps together with its `<p>` wrapper.

use std::sync::OnceLock;

use regex::{Captures, Regex};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// Extension output waiting to be spliced back into a rendered body.
#[derive(Debug, Default)]
pub struct Placeholders {
    items: Vec<String>,
}

impl Placeholders {
    /// Token for inline output.
    pub fn inline(&mut self, output: String) -> String {
        self.items.push(output);
        format!("{OPEN}{}{CLOSE}", self.items.len() - 1)
    }

    /// Token for block output, separated from surrounding text by blank lines.
    pub fn block(&mut self, output: String) -> String {
        format!("\n{}\n\n", self.inline(output))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace every token in `body` with its stored output.
    pub fn restore(&self, body: &str) -> String {
        if self.items.is_empty() {
            return body.to_string();
        }
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new("<p>\u{E000}(\\d+)\u{E001}</p>\n?|\u{E000}(\\d+)\u{E001}").expect("valid regex")
        });
        re.replace_all(body, |caps: &Captures| {
            let index = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            index
                .and_then(|i| i.parse::<usize>().ok())
                .and_then(|i| self.items.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
    }
}

/// Remove placeholder delimiters from untrusted input.
pub fn sanitize(source: &str) -> std::borrow::Cow<'_, str> {
    if source.contains([OPEN, CLOSE]) {
        source.replace([OPEN, CLOSE], "").into()
    } else {
        source.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_unwraps_paragraph() {
        let mut slots = Placeholders::default();
        let token = slots.block("<div>fig</div>\n".to_string());
        let html = format!("<p>before</p>\n<p>{}</p>\n<p>after</p>\n", token.trim());
        assert_eq!(slots.restore(&html), "<p>before</p>\n<div>fig</div>\n<p>after</p>\n");
    }

    #[test]
    fn test_inline_restore() {
        let mut slots = Placeholders::default();
        let token = slots.inline(r"\(10^{6}\)".to_string());
        assert_eq!(slots.restore(&format!("<p>x = {token} m</p>")), r"<p>x = \(10^{6}\) m</p>");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a\u{E000}0\u{E001}b"), "a0b");
        assert!(matches!(sanitize("plain"), std::borrow::Cow::Borrowed(_)));
    }
}
