//! Markdown to LaTeX body text.
//!
//! Produces the inside of a document; the preamble comes from the PDF
//! template. Raw HTML has no LaTeX meaning and is dropped.

use pulldown_cmark::{Alignment, Event, Parser, Tag, TagEnd};

use super::html::options;
use crate::utils::html::escape_latex;

/// Convert markdown to LaTeX. Headings move down by `shift` levels.
pub fn to_latex(markdown: &str, shift: u8) -> String {
    let mut writer = LatexWriter::new(shift);
    for event in Parser::new_ext(markdown, options()) {
        writer.handle_event(event);
    }
    writer.out
}

struct LatexWriter {
    out: String,
    shift: u8,
    in_code_block: bool,
    /// Nesting depth inside an image; alt text is swallowed.
    image_depth: usize,
    cell: usize,
}

impl LatexWriter {
    fn new(shift: u8) -> Self {
        Self {
            out: String::new(),
            shift,
            in_code_block: false,
            image_depth: 0,
            cell: 0,
        }
    }

    fn handle_event(&mut self, event: Event<'_>) {
        if self.image_depth > 0 {
            match event {
                Event::Start(Tag::Image { .. }) => self.image_depth += 1,
                Event::End(TagEnd::Image) => self.image_depth -= 1,
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => {
                self.out.push_str(r"\texttt{");
                self.out.push_str(&escape_latex(&code));
                self.out.push('}');
            }
            Event::InlineMath(math) => {
                self.out.push_str(r"\(");
                self.out.push_str(&math);
                self.out.push_str(r"\)");
            }
            Event::DisplayMath(math) => {
                self.out.push_str(r"\[");
                self.out.push_str(&math);
                self.out.push_str(r"\]");
            }
            Event::Html(_) | Event::InlineHtml(_) => {}
            Event::SoftBreak => self.out.push('\n'),
            Event::HardBreak => self.out.push_str("\\\\\n"),
            Event::Rule => self.out.push_str("\\par\\noindent\\rule{\\textwidth}{0.4pt}\n\n"),
            Event::FootnoteReference(name) => {
                self.out.push_str(r"\textsuperscript{");
                self.out.push_str(&escape_latex(&name));
                self.out.push('}');
            }
            Event::TaskListMarker(checked) => {
                self.out.push_str(if checked { r"$\boxtimes$ " } else { r"$\square$ " });
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                let command = match (level as u8).saturating_add(self.shift) {
                    1 => "section",
                    2 => "subsection",
                    3 => "subsubsection",
                    4 => "paragraph",
                    _ => "subparagraph",
                };
                self.out.push('\\');
                self.out.push_str(command);
                self.out.push('{');
            }
            Tag::BlockQuote(_) => self.out.push_str("\\begin{quote}\n"),
            Tag::CodeBlock(_) => {
                self.in_code_block = true;
                self.out.push_str("\\begin{verbatim}\n");
            }
            Tag::List(Some(_)) => self.out.push_str("\\begin{enumerate}\n"),
            Tag::List(None) => self.out.push_str("\\begin{itemize}\n"),
            Tag::Item => self.out.push_str(r"\item "),
            Tag::FootnoteDefinition(name) => {
                self.out.push_str(r"\par\noindent\textsuperscript{");
                self.out.push_str(&escape_latex(&name));
                self.out.push_str("} ");
            }
            Tag::Table(alignments) => {
                let spec: String = alignments.iter().map(|a| column_spec(*a)).collect();
                self.out.push_str(&format!("\\begin{{tabular}}{{|{spec}}}\n\\hline\n"));
            }
            Tag::TableHead | Tag::TableRow => self.cell = 0,
            Tag::TableCell => {
                if self.cell > 0 {
                    self.out.push_str(" & ");
                }
                self.cell += 1;
            }
            Tag::Emphasis => self.out.push_str(r"\emph{"),
            Tag::Strong => self.out.push_str(r"\textbf{"),
            Tag::Strikethrough => self.out.push_str(r"\sout{"),
            Tag::Link { dest_url, .. } => {
                self.out.push_str(r"\href{");
                self.out.push_str(&escape_url(&dest_url));
                self.out.push_str("}{");
            }
            Tag::Image { dest_url, .. } => {
                self.out.push_str(r"\includegraphics{");
                self.out.push_str(&dest_url);
                self.out.push('}');
                self.image_depth = 1;
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push_str("\n\n"),
            TagEnd::Heading(_) => self.out.push_str("}\n\n"),
            TagEnd::BlockQuote(_) => self.out.push_str("\\end{quote}\n\n"),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str("\\end{verbatim}\n\n");
            }
            TagEnd::List(true) => self.out.push_str("\\end{enumerate}\n\n"),
            TagEnd::List(false) => self.out.push_str("\\end{itemize}\n\n"),
            TagEnd::Item => {
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            TagEnd::FootnoteDefinition => self.out.push_str("\n\n"),
            TagEnd::Table => self.out.push_str("\\end{tabular}\n\n"),
            TagEnd::TableHead | TagEnd::TableRow => self.out.push_str(" \\\\ \\hline\n"),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.out.push('}')
            }
            _ => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            self.out.push_str(text);
        } else {
            self.out.push_str(&escape_latex(text));
        }
    }
}

fn column_spec(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Right => "r|",
        Alignment::Center => "c|",
        Alignment::Left | Alignment::None => "l|",
    }
}

fn escape_url(url: &str) -> String {
    url.replace('%', r"\%").replace('#', r"\#")
}
