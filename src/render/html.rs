//! Markdown to HTML with the wiki's pinned settings.

use std::sync::OnceLock;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use regex::Regex;

use super::placeholder::Placeholders;
use crate::utils::html::escape;

/// Extensions enabled for page markup.
pub fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_MATH);
    opts
}

/// Render markdown. Headings move down by `shift` levels and math is
/// emitted in MathJax delimiters, shielded from later text passes.
pub fn to_html(markdown: &str, shift: u8, slots: &mut Placeholders) -> String {
    let events = Parser::new_ext(markdown, options()).map(|event| match event {
        Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }) => Event::Start(Tag::Heading {
            level: shifted(level, shift),
            id,
            classes,
            attrs,
        }),
        Event::End(TagEnd::Heading(level)) => Event::End(TagEnd::Heading(shifted(level, shift))),
        Event::InlineMath(math) => {
            Event::InlineHtml(CowStr::from(slots.inline(format!("\\({}\\)", escape(&math)))))
        }
        Event::DisplayMath(math) => {
            Event::InlineHtml(CowStr::from(slots.inline(format!("\\[{}\\]", escape(&math)))))
        }
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn shifted(level: HeadingLevel, shift: u8) -> HeadingLevel {
    match (level as u8).saturating_add(shift) {
        1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        3 => HeadingLevel::H3,
        4 => HeadingLevel::H4,
        5 => HeadingLevel::H5,
        _ => HeadingLevel::H6,
    }
}

/// Ellipsis and dash entities in text content.
///
/// Tags, comments and the bodies of `<pre>` and `<code>` are copied
/// through untouched, so attribute values such as link targets keep their
/// dashes.
pub fn typography(html: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let untouched = RE.get_or_init(|| {
        Regex::new(r"(?s)<pre[\s>].*?</pre>|<code[\s>].*?</code>|<!--.*?-->|<[^>]*>")
            .expect("valid regex")
    });

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for m in untouched.find_iter(html) {
        out.push_str(&substitute(&html[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&substitute(&html[last..]));
    out
}

fn substitute(text: &str) -> String {
    text.replace("...", "&hellip;")
        .replace("---", "&mdash;")
        .replace("--", "&ndash;")
}

/// Drop a single enclosing `<p>` wrapper.
pub fn strip_paragraph(html: &str) -> &str {
    let trimmed = html.trim();
    trimmed
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
        .filter(|inner| !inner.contains("<p>"))
        .unwrap_or(trimmed)
}
