//! Block directive scanning.
//!
//! A directive starts at column 0 and owns every following indented or
//! blank line:
//!
//! ```text
//! .. fig:: Caption text
//!     :label: trapezoid
//!     :scale: 0.5
//!
//!     \begin{tikzpicture} ... \end{tikzpicture}
//! ```
//!
//! Option lines must directly follow the header. The remaining body is
//! dedented and becomes the content. Fenced code is passed through
//! verbatim, and directives with unknown names stay plain text.

use std::sync::OnceLock;

use regex::Regex;

/// Directive names handled by the renderer.
pub const KNOWN: [&str; 5] = ["fig", "plt", "ani", "tbl", "problem-set"];

/// A parsed block directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'s> {
    pub name: &'s str,
    /// Text after `::`, trimmed.
    pub argument: &'s str,
    pub options: Vec<(&'s str, &'s str)>,
    pub content: String,
}

impl Directive<'_> {
    /// Value of an option, `None` when absent or empty.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .filter(|v| !v.is_empty())
    }
}

/// A piece of page source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'s> {
    /// Ordinary markup line, eligible for role expansion.
    Line(&'s str),
    /// Line inside fenced code.
    Verbatim(&'s str),
    Directive(Directive<'s>),
}

/// Split source into lines and directives.
pub fn split(source: &str) -> Vec<Segment<'_>> {
    let lines: Vec<&str> = source.lines().collect();
    let mut segments = Vec::with_capacity(lines.len());
    let mut fence: Option<Fence> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        if let Some(open) = fence {
            if open.closed_by(line) {
                fence = None;
            }
            segments.push(Segment::Verbatim(line));
            continue;
        }
        if let Some(open) = Fence::opening(line) {
            fence = Some(open);
            segments.push(Segment::Verbatim(line));
            continue;
        }

        let Some((name, argument)) = header(line) else {
            segments.push(Segment::Line(line));
            continue;
        };

        let mut options = Vec::new();
        while let Some(entry) = lines.get(i).copied().filter(|l| is_indented(l)).and_then(option) {
            options.push(entry);
            i += 1;
        }

        let start = i;
        while i < lines.len() && (lines[i].trim().is_empty() || is_indented(lines[i])) {
            i += 1;
        }

        segments.push(Segment::Directive(Directive {
            name,
            argument,
            options,
            content: dedent(&lines[start..i]),
        }));
    }
    segments
}

fn header(line: &str) -> Option<(&str, &str)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\.\. ([A-Za-z][\w-]*)::(?:[ \t]+(.*))?$").expect("valid regex")
    });
    let caps = re.captures(line)?;
    let name = caps.get(1)?.as_str();
    if !KNOWN.contains(&name) {
        return None;
    }
    let argument = caps.get(2).map_or("", |m| m.as_str().trim());
    Some((name, argument))
}

fn option(line: &str) -> Option<(&str, &str)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^:([\w-]+):(?:[ \t]+(.*))?$").expect("valid regex"));
    let caps = re.captures(line.trim())?;
    let key = caps.get(1)?.as_str();
    Some((key, caps.get(2).map_or("", |m| m.as_str().trim())))
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t']) && !line.trim().is_empty()
}

/// Remove the common indentation and surrounding blank lines.
fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let body: Vec<&str> = lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or("").trim_end())
        .collect();
    let first = body.iter().position(|l| !l.is_empty());
    let last = body.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => body[first..=last].join("\n"),
        _ => String::new(),
    }
}

/// An open code fence.
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn opening(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        if line.len() - trimmed.len() > 3 {
            return None;
        }
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    fn closed_by(self, line: &str) -> bool {
        let trimmed = line.trim();
        let len = trimmed.chars().take_while(|c| *c == self.marker).count();
        len >= self.len && len == trimmed.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(source: &str) -> Vec<Directive<'_>> {
        split(source)
            .into_iter()
            .filter_map(|s| match s {
                Segment::Directive(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_directive() {
        let source = "Intro\n\n.. fig:: A trapezoid\n    :label: trap\n    :scale: 0.5\n\n    \\draw (0,0);\n      indented\n\nAfter";
        let segments = split(source);
        assert_eq!(segments.first(), Some(&Segment::Line("Intro")));
        assert_eq!(segments.last(), Some(&Segment::Line("After")));

        let found = directives(source);
        assert_eq!(found.len(), 1);
        let fig = &found[0];
        assert_eq!(fig.name, "fig");
        assert_eq!(fig.argument, "A trapezoid");
        assert_eq!(fig.option("label"), Some("trap"));
        assert_eq!(fig.option("scale"), Some("0.5"));
        assert_eq!(fig.content, "\\draw (0,0);\n  indented");
    }

    #[test]
    fn test_unknown_directive_is_text() {
        let source = ".. note:: hi\n    body";
        assert_eq!(
            split(source),
            vec![Segment::Line(".. note:: hi"), Segment::Line("    body")]
        );
    }

    #[test]
    fn test_fenced_directive_ignored() {
        let source = "```\n.. fig:: inside\n```\n.. tbl::\n    a";
        let segments = split(source);
        assert_eq!(segments[1], Segment::Verbatim(".. fig:: inside"));
        let found = directives(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "tbl");
        assert_eq!(found[0].argument, "");
        assert_eq!(found[0].content, "a");
    }

    #[test]
    fn test_options_only() {
        let found = directives(".. fig:: Cat\n    :image: cat.png\nNext paragraph");
        assert_eq!(found[0].option("image"), Some("cat.png"));
        assert!(found[0].content.is_empty());
    }
}
