//! Page metadata from frontmatter or from the document's leading headings.

use serde::Serialize;

/// Title block of a page.
///
/// # Sources (first match wins per field)
///
/// | Field      | Frontmatter      | Body fallback                          |
/// |------------|------------------|----------------------------------------|
/// | `title`    | `title: ...`     | first level-1 heading                  |
/// | `subtitle` | `subtitle: ...`  | level-2 heading directly after title   |
/// | `author`   | `author: ...`    | `:Author: name` docinfo line           |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
}

impl PageMeta {
    /// Extract metadata from raw page source.
    pub fn parse(source: &str) -> Self {
        let (frontmatter, body) = split_frontmatter(source);
        let mut meta = frontmatter.map(parse_frontmatter).unwrap_or_default();
        meta.fill_from_body(body);
        meta
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.subtitle.is_none() && self.author.is_none()
    }

    /// Fill missing fields from headings and docinfo lines.
    fn fill_from_body(&mut self, body: &str) {
        let mut in_fence = false;
        let mut title_found = false;
        let mut expect_subtitle = false;
        let mut title = None;
        let mut subtitle = None;
        let mut author = None;

        for line in body.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                expect_subtitle = false;
                continue;
            }
            if in_fence || trimmed.is_empty() {
                continue;
            }

            if author.is_none()
                && let Some(rest) = trimmed.strip_prefix(":Author:")
            {
                let name = rest.trim();
                if !name.is_empty() {
                    author = Some(name.to_string());
                }
                continue;
            }

            match atx_heading(line) {
                Some((1, text)) if !title_found => {
                    title = Some(text.to_string());
                    title_found = true;
                    expect_subtitle = true;
                }
                Some((2, text)) if expect_subtitle => {
                    subtitle = Some(text.to_string());
                    expect_subtitle = false;
                }
                _ => expect_subtitle = false,
            }
        }

        self.title = self.title.take().or(title);
        self.subtitle = self.subtitle.take().or(subtitle);
        self.author = self.author.take().or(author);
    }
}

/// Split a leading `---` frontmatter block from the body.
///
/// Returns `(None, source)` when there is no well-formed block.
pub fn split_frontmatter(source: &str) -> (Option<&str>, &str) {
    let trimmed = source.trim_start();
    let Some(rest) = trimmed.strip_prefix("---") else {
        return (None, source);
    };
    if !rest.starts_with(['\n', '\r']) {
        return (None, source);
    }
    match rest.find("\n---") {
        Some(end) => {
            let frontmatter = rest[..end].trim();
            let after = &rest[end + 4..];
            let body = after
                .split_once('\n')
                .map_or("", |(_, body)| body)
                .trim_start_matches('\n');
            (Some(frontmatter), body)
        }
        None => (None, source),
    }
}

/// Parse simple `key: value` frontmatter.
fn parse_frontmatter(content: &str) -> PageMeta {
    let mut meta = PageMeta::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        if value.is_empty() {
            continue;
        }
        match key.trim().to_lowercase().as_str() {
            "title" => meta.title = Some(value.to_string()),
            "subtitle" => meta.subtitle = Some(value.to_string()),
            "author" => meta.author = Some(value.to_string()),
            _ => {}
        }
    }

    meta
}

/// `(level, text)` of an ATX heading line.
fn atx_heading(line: &str) -> Option<(usize, &str)> {
    // Four leading spaces make an indented code block
    if line.starts_with("    ") || line.starts_with('\t') {
        return None;
    }
    let line = line.trim_start();
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    (!text.is_empty()).then_some((level, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmatter_wins() {
        let meta = PageMeta::parse("---\ntitle: Optics\nauthor: \"R. Feynman\"\n---\n# Ignored\n");
        assert_eq!(meta.title.as_deref(), Some("Optics"));
        assert_eq!(meta.author.as_deref(), Some("R. Feynman"));
    }

    #[test]
    fn test_heading_fallback() {
        let src = "# Waves\n\n## Part one\n\n:Author: Ada\n\nBody text.\n\n# Another\n";
        let meta = PageMeta::parse(src);
        assert_eq!(meta.title.as_deref(), Some("Waves"));
        assert_eq!(meta.subtitle.as_deref(), Some("Part one"));
        assert_eq!(meta.author.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_subtitle_must_follow_title() {
        let meta = PageMeta::parse("# Title\n\nSome paragraph.\n\n## Section\n");
        assert_eq!(meta.title.as_deref(), Some("Title"));
        assert_eq!(meta.subtitle, None);
    }

    #[test]
    fn test_fenced_headings_ignored() {
        let meta = PageMeta::parse("```\n# not a title\n```\n#hashtag\n");
        assert!(meta.is_empty());
    }

    #[test]
    fn test_split_frontmatter() {
        let (fm, body) = split_frontmatter("---\ntitle: X\n---\nbody\n");
        assert_eq!(fm, Some("title: X"));
        assert_eq!(body, "body\n");

        let (fm, body) = split_frontmatter("--- not frontmatter\n");
        assert_eq!(fm, None);
        assert_eq!(body, "--- not frontmatter\n");

        let (fm, _) = split_frontmatter("---\nunterminated\n");
        assert_eq!(fm, None);
    }
}
