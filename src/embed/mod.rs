//! Embedded driver templates.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `figure` - Asset driver templates (latex/, matplotlib/)
//! - `pdf` - Whole-page PDF document template (pdf/ppdf.tex)
//!
//! Every template can be overridden by a file of the same relative path
//! under `toolchain.template_dir`.
//!
//! # Usage
//!
//! ```ignore
//! use embed::figure::{LATEX_PREVIEW, SourceVars};
//!
//! let driver = LATEX_PREVIEW.render(&SourceVars { source: r"\(x^2\)" });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod figure {
    use super::{Template, TemplateVars};

    /// Variables for asset driver templates.
    pub struct SourceVars<'a> {
        pub source: &'a str,
    }

    impl TemplateVars for SourceVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__WIKI_SOURCE__", self.source)
        }
    }

    /// Standalone LaTeX document around a figure body.
    pub const LATEX_PREVIEW: Template<SourceVars<'static>> =
        Template::new(include_str!("latex/preview.tex"));

    /// Matplotlib script producing `temp.png`.
    pub const MATPLOTLIB_PYPLOT: Template<SourceVars<'static>> =
        Template::new(include_str!("matplotlib/pyplot.py"));

    /// Matplotlib script producing `temp.mp4` from an `ani` object.
    pub const MATPLOTLIB_ANIMATION: Template<SourceVars<'static>> =
        Template::new(include_str!("matplotlib/animation.py"));
}

pub mod pdf {
    use super::{Template, TemplateVars};

    /// Variables for the page PDF document.
    ///
    /// All fields are LaTeX, already escaped.
    pub struct PdfVars<'a> {
        pub title: &'a str,
        pub subtitle: &'a str,
        pub author: &'a str,
        pub body: &'a str,
    }

    impl TemplateVars for PdfVars<'_> {
        fn apply(&self, content: &str) -> String {
            // Body last: page text may itself contain placeholder-like words
            content
                .replace("__TITLE__", self.title)
                .replace("__SUBTITLE__", self.subtitle)
                .replace("__AUTHOR__", self.author)
                .replace("__BODY__", self.body)
        }
    }

    pub const PPDF_TEX: Template<PdfVars<'static>> = Template::new(include_str!("pdf/ppdf.tex"));
}

#[cfg(test)]
mod tests {
    use super::figure::*;
    use super::pdf::*;

    #[test]
    fn test_source_injection() {
        for template in [&LATEX_PREVIEW, &MATPLOTLIB_PYPLOT, &MATPLOTLIB_ANIMATION] {
            assert!(template.content().contains("__WIKI_SOURCE__"));
            let out = template.render(&SourceVars { source: "BODY" });
            assert!(out.contains("BODY"));
            assert!(!out.contains("__WIKI_SOURCE__"));
        }
    }

    #[test]
    fn test_pdf_vars() {
        let out = PPDF_TEX.render(&PdfVars {
            title: "Waves",
            subtitle: "Part one",
            author: "Ada",
            body: "Text mentioning __TITLE__",
        });
        assert!(out.contains(r"\title{Waves"));
        assert!(out.contains("Text mentioning __TITLE__"));
        assert!(out.contains(r"\printindex"));
    }
}
