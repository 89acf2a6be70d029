//! Page markup rendering.
//!
//! # Pipeline
//!
//! ```text
//! raw ─► sanitize ─► strip frontmatter ─► link rewrite
//!     ─► directives + roles (placeholders)
//!     ─► markdown ─► HTML or LaTeX ─► typography (HTML) ─► restore
//! ```
//!
//! Directive and role output is parked in placeholders while the markdown
//! converter runs, so it is never re-parsed or touched by text passes.
//! Problems with individual figures or directives degrade the output in
//! place and are reported as [`RenderWarning`]s.
//!
//! # Module Structure
//!
//! - `links` - wiki link shorthand rewriting
//! - `directive` - block directive scanning
//! - `roles` - `:sci:`, `:atm:` and `:jargon:`
//! - `figure` - `fig`, `plt` and `ani`
//! - `table` - `tbl`
//! - `problems` - `problem-set`
//! - `html` / `latex` - markdown back ends

mod directive;
mod figure;
mod html;
mod latex;
mod links;
mod placeholder;
mod problems;
mod roles;
mod table;

pub use links::{LinkContext, LinkRewriter};

use crate::address::PageAddress;
use crate::asset::AssetBuilder;
use crate::config::WikiConfig;
use crate::error::{RenderWarning, WarningKind};
use crate::log;
use crate::page::split_frontmatter;
use crate::utils::html::escape;
use crate::utils::slug::make_id;

use directive::{Directive, Segment};
use placeholder::Placeholders;
use problems::ProblemOptions;

/// Output format of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Html,
    Latex,
}

/// Rendered body plus the problems met along the way.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub body: String,
    pub warnings: Vec<RenderWarning>,
}

/// Renders page markup against one wiki configuration.
pub struct MarkupRenderer<'a> {
    config: &'a WikiConfig,
    assets: &'a AssetBuilder,
    links: LinkRewriter,
}

impl<'a> MarkupRenderer<'a> {
    pub fn new(config: &'a WikiConfig, assets: &'a AssetBuilder) -> Self {
        Self {
            config,
            assets,
            links: LinkRewriter::new(),
        }
    }

    /// Full HTML body of the page at `address`.
    pub fn render(&self, raw: &str, address: &PageAddress) -> Rendered {
        self.page(raw, address, Target::Html)
    }

    /// LaTeX body of the page at `address`, for the page PDF.
    pub fn render_latex(&self, raw: &str, address: &PageAddress) -> Rendered {
        self.page(raw, address, Target::Latex)
    }

    /// A fragment without its paragraph wrapper and without link rewriting.
    pub fn render_inline(&self, raw: &str) -> Rendered {
        let mut warnings = Vec::new();
        let body = self.convert(&placeholder::sanitize(raw), Target::Html, true, &mut warnings);
        Rendered { body, warnings }
    }

    fn page(&self, raw: &str, address: &PageAddress, target: Target) -> Rendered {
        let source = placeholder::sanitize(raw);
        let (_, body) = split_frontmatter(&source);
        let body = self.links.rewrite(body, &LinkContext::new(address, self.config));

        let mut warnings = Vec::new();
        let body = self.convert(&body, target, false, &mut warnings);
        for warning in &warnings {
            log!("render"; "{}: {}", address, warning);
        }
        Rendered { body, warnings }
    }

    /// Markup to output. Directive captions and cells recurse through here.
    fn convert(
        &self,
        source: &str,
        target: Target,
        inline: bool,
        warnings: &mut Vec<RenderWarning>,
    ) -> String {
        let mut slots = Placeholders::default();
        let mut markup = String::with_capacity(source.len());
        for segment in directive::split(source) {
            match segment {
                Segment::Line(line) => {
                    markup.push_str(&roles::expand(line, target, &mut slots));
                    markup.push('\n');
                }
                Segment::Verbatim(line) => {
                    markup.push_str(line);
                    markup.push('\n');
                }
                Segment::Directive(d) => {
                    let output = self.directive(&d, target, warnings);
                    markup.push_str(&slots.block(output));
                }
            }
        }

        let shift = self.config.render.initial_header_level.clamp(1, 6) - 1;
        let body = match target {
            Target::Html => {
                let body = html::typography(&html::to_html(&markup, shift, &mut slots));
                if inline {
                    html::strip_paragraph(&body).to_string()
                } else {
                    body
                }
            }
            Target::Latex => {
                let body = latex::to_latex(&markup, shift);
                if inline { body.trim().to_string() } else { body }
            }
        };
        slots.restore(&body)
    }

    fn directive(
        &self,
        d: &Directive<'_>,
        target: Target,
        warnings: &mut Vec<RenderWarning>,
    ) -> String {
        match d.name {
            "tbl" => self.table(d, target, warnings),
            "problem-set" => self.problem_set(d, target, warnings),
            _ => self.figure(d, target, warnings),
        }
    }

    fn table(&self, d: &Directive<'_>, target: Target, warnings: &mut Vec<RenderWarning>) -> String {
        let Some(parsed) = table::parse(&d.content) else {
            warnings.push(RenderWarning::new(
                WarningKind::Directive,
                "tbl content is neither a grid nor a simple table",
            ));
            return match target {
                Target::Html => format!("<pre>{}</pre>", escape(&d.content)),
                Target::Latex => format!("\\begin{{verbatim}}\n{}\n\\end{{verbatim}}\n", d.content),
            };
        };

        let label = d.option("label").map(make_id);
        let cols = d.option("cols").unwrap_or("");
        let caption = if d.argument.is_empty() {
            String::new()
        } else {
            self.convert(d.argument, target, true, warnings)
        };
        let mut cell = |text: &str| self.convert(text, target, true, warnings);
        match target {
            Target::Html => table::to_html(&parsed, label.as_deref(), cols, &caption, &mut cell),
            Target::Latex => table::to_latex(&parsed, label.as_deref(), cols, &caption, &mut cell),
        }
    }

    fn problem_set(
        &self,
        d: &Directive<'_>,
        target: Target,
        warnings: &mut Vec<RenderWarning>,
    ) -> String {
        let options = ProblemOptions::from_options(|key| d.option(key).map(String::from));
        let Some(parsed) = problems::parse(&d.content) else {
            warnings.push(RenderWarning::new(
                WarningKind::Directive,
                "problem-set content is not a YAML or JSON list",
            ));
            return match target {
                Target::Html => problems::malformed_html(&d.content),
                Target::Latex => problems::malformed_latex(&d.content),
            };
        };

        let mut inline = |text: &str| self.convert(text, target, true, warnings);
        match target {
            Target::Html => problems::to_html(&parsed, &d.content, d.argument, &options, &mut inline),
            Target::Latex => problems::to_latex(&parsed, d.argument, &options, &mut inline),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::asset::fake::FakeToolchain;

    fn with_renderer(test: impl FnOnce(&MarkupRenderer<'_>)) {
        let dir = TempDir::new().unwrap();
        let config = WikiConfig::rooted(dir.path());
        let assets = AssetBuilder::with_toolchain(&config, Arc::new(FakeToolchain::default()));
        test(&MarkupRenderer::new(&config, &assets));
    }

    fn address(raw: &str) -> PageAddress {
        PageAddress::parse(raw).unwrap()
    }

    #[test]
    fn test_render_basic_page() {
        with_renderer(|r| {
            let out = r.render("# Waves\n\nA wave -- travelling...\n", &address("physics"));
            assert_eq!(out.body, "<h2>Waves</h2>\n<p>A wave &ndash; travelling&hellip;</p>\n");
            assert!(out.warnings.is_empty());
        });
    }

    #[test]
    fn test_frontmatter_not_rendered() {
        with_renderer(|r| {
            let out = r.render("---\ntitle: Waves\n---\nBody\n", &address("physics"));
            assert_eq!(out.body, "<p>Body</p>\n");
        });
    }

    #[test]
    fn test_links_rewritten() {
        with_renderer(|r| {
            let out = r.render("See <<setup>>.", &address("guide/intro"));
            assert!(out.body.contains("href=\"/wiki/show/guide/intro/setup/\""), "{}", out.body);
        });
    }

    #[test]
    fn test_roles_survive_markdown() {
        with_renderer(|r| {
            let out = r.render("Mass :atm:`U-235` and *c* = :sci:`3E8`", &address("a"));
            assert!(out.body.contains(r"\({}^{235}_{\phantom{0}92}\text{U}\)"));
            assert!(out.body.contains(r"\(3 \times 10^{8}\)"));
            assert!(out.body.contains("<em>c</em>"));
        });
    }

    #[test]
    fn test_code_untouched() {
        with_renderer(|r| {
            let out = r.render("```\n:sci:`1E3` -- x\n.. tbl::\n```\n", &address("a"));
            assert!(out.body.contains(":sci:`1E3` -- x\n.. tbl::"));
        });
    }

    #[test]
    fn test_inline_strips_paragraph() {
        with_renderer(|r| {
            assert_eq!(r.render_inline("*Kinematics* -- intro").body, "<em>Kinematics</em> &ndash; intro");
        });
    }

    #[test]
    fn test_table_directive() {
        with_renderer(|r| {
            let source = ".. tbl:: Speeds of *light*\n    :label: Speeds\n    :cols: lr\n\n    =====  =====\n    Medium Speed\n    =====  =====\n    Air    **c**\n    =====  =====\n";
            let out = r.render(source, &address("a"));
            assert!(out.body.contains("<div id=\"tbl:speeds\" class=\"docutils-extensions tbl\">"), "{}", out.body);
            assert!(out.body.contains("<caption>Speeds of <em>light</em></caption>"));
            assert!(out.body.contains("<strong>c</strong>"));
            assert!(out.warnings.is_empty());
        });
    }

    #[test]
    fn test_malformed_directives_warn() {
        with_renderer(|r| {
            let out = r.render(".. tbl::\n\n    not a table\n", &address("a"));
            assert!(out.body.contains("<pre>not a table</pre>"));
            assert_eq!(out.warnings[0].kind, WarningKind::Directive);

            let out = r.render(".. problem-set::\n\n    - 5\n    - 6\n", &address("a"));
            assert!(out.body.contains("Malformed input"));
            assert_eq!(out.warnings.len(), 1);
        });
    }

    #[test]
    fn test_problem_set_directive() {
        with_renderer(|r| {
            let source = ".. problem-set:: Warm-up\n    :answers: show\n\n    - question: What is $x$?\n      answer: '2'\n";
            let out = r.render(source, &address("a"));
            assert!(out.body.contains("<h4>Warm-up</h4>"), "{}", out.body);
            assert!(out.body.contains("<p>What is \\(x\\)?</p>"));
            assert!(out.body.contains("<i>Answer:</i> 2"));
        });
    }

    #[test]
    fn test_latex_target() {
        with_renderer(|r| {
            let out = r.render_latex("# Waves\n\nA :jargon:`~Wave` at 50%.\n", &address("a"));
            assert_eq!(
                out.body,
                "\\subsection{Waves}\n\nA \\textbf{Wave}\\index{wave} at 50\\%.\n\n"
            );
        });
    }
}
