//! `fig`, `plt` and `ani` directives.
//!
//! A figure shows either an author-supplied image (`:image:` option) or an
//! asset generated from the directive content. `plt` and `ani` are `fig`
//! with a matplotlib template preselected.

use std::path::PathBuf;

use super::directive::Directive;
use super::{MarkupRenderer, Target};
use crate::asset::{AssetStatus, TemplateKind, scaled};
use crate::error::{RenderWarning, WarningKind};
use crate::utils::html::{escape, escape_attr, escape_latex};
use crate::utils::slug::make_id;

/// A figure ready to display.
struct Figure {
    url: String,
    /// Local file to measure. Remote images have none.
    path: Option<PathBuf>,
    /// Default label source.
    name: String,
    video: bool,
}

enum Unavailable {
    Image(String),
    Build,
}

fn default_template(directive: &str) -> TemplateKind {
    match directive {
        "plt" => TemplateKind::MatplotlibPyplot,
        "ani" => TemplateKind::MatplotlibAnimation,
        _ => TemplateKind::LatexPreview,
    }
}

impl MarkupRenderer<'_> {
    pub(super) fn figure(
        &self,
        directive: &Directive<'_>,
        target: Target,
        warnings: &mut Vec<RenderWarning>,
    ) -> String {
        let figure = match self.resolve_figure(directive, warnings) {
            Ok(figure) => figure,
            Err(Unavailable::Image(name)) => return missing_image(&name, target),
            Err(Unavailable::Build) => return generation_error(&directive.content, target),
        };

        let scale = directive
            .option("scale")
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|s| *s > 0.0)
            .unwrap_or(1.0);
        let label = directive
            .option("label")
            .map_or_else(|| make_id(&figure.name), make_id);

        match target {
            Target::Html => {
                let caption = self.convert(directive.argument, target, false, warnings);
                self.figure_html(&figure, &label, scale, &caption)
            }
            Target::Latex => {
                let caption = self.convert(directive.argument, target, true, warnings);
                figure_latex(&figure, &label, scale, &caption)
            }
        }
    }

    fn resolve_figure(
        &self,
        directive: &Directive<'_>,
        warnings: &mut Vec<RenderWarning>,
    ) -> Result<Figure, Unavailable> {
        if let Some(image) = directive.option("image") {
            return self.author_image(image, warnings);
        }

        let kind = match directive.option("template") {
            Some(name) => name.parse::<TemplateKind>(),
            None => Ok(default_template(directive.name)),
        };
        let kind = match kind {
            Ok(kind) => kind,
            Err(reason) => {
                warnings.push(RenderWarning::new(WarningKind::Directive, reason));
                return Err(Unavailable::Build);
            }
        };
        if directive.content.trim().is_empty() {
            warnings.push(RenderWarning::new(
                WarningKind::Directive,
                format!("{} directive has neither an image nor content", directive.name),
            ));
            return Err(Unavailable::Build);
        }

        match self.assets.ensure_asset(&directive.content, kind) {
            AssetStatus::Ready(asset) => Ok(Figure {
                video: kind.is_video(),
                url: asset.url,
                path: Some(asset.path),
                name: asset.file_name,
            }),
            AssetStatus::Missing(failure) => {
                warnings.push(RenderWarning::new(
                    WarningKind::Asset,
                    format!("{kind} figure: {failure}"),
                ));
                Err(Unavailable::Build)
            }
        }
    }

    fn author_image(
        &self,
        image: &str,
        warnings: &mut Vec<RenderWarning>,
    ) -> Result<Figure, Unavailable> {
        let video = image.ends_with(".mp4");
        if image.contains("://") {
            return Ok(Figure {
                url: image.to_string(),
                path: None,
                name: image.rsplit('/').next().unwrap_or(image).to_string(),
                video,
            });
        }

        let path = self.config.media.image_dir().join(image);
        if !path.is_file() {
            warnings.push(RenderWarning::new(
                WarningKind::MissingImage,
                format!("missing image {}", path.display()),
            ));
            return Err(Unavailable::Image(image.to_string()));
        }
        Ok(Figure {
            url: self.config.media.image_url(image),
            path: Some(path),
            name: image.to_string(),
            video,
        })
    }

    fn figure_html(&self, figure: &Figure, label: &str, scale: f64, caption: &str) -> String {
        let url = escape_attr(&figure.url);
        let size = figure
            .path
            .as_deref()
            .and_then(|path| self.assets.dimensions(path))
            .map(|size| scaled(size, scale));

        let media = match (figure.video, size) {
            (true, Some((w, h))) => format!(
                "<video width=\"{w}px\" height=\"{h}px\" controls><source src=\"{url}\" type=\"video/mp4\"></video>"
            ),
            (true, None) => {
                format!("<video controls><source src=\"{url}\" type=\"video/mp4\"></video>")
            }
            (false, Some((w, h))) => format!("<img width=\"{w}px\" height=\"{h}px\" src=\"{url}\">"),
            (false, None) => format!("<img src=\"{url}\">"),
        };

        format!(
            "<div id=\"fig:{label}\" class=\"docutils-extensions fig\">\n<a href=\"{url}\">\n{media}\n</a>\n{caption}</div>"
        )
    }
}

fn figure_latex(figure: &Figure, label: &str, scale: f64, caption: &str) -> String {
    let mut out = String::new();
    match (&figure.path, figure.video) {
        (Some(path), false) => {
            let path = path.to_string_lossy().replace('\\', "/");
            out.push_str("\\begin{figure}[htbp]\n\\centering\n");
            out.push_str(&format!("\\includegraphics[scale={scale}]{{{path}}}\n"));
            if !caption.is_empty() {
                out.push_str(&format!("\\caption{{{caption}}}\n"));
            }
            out.push_str(&format!("\\label{{fig:{label}}}\n\\end{{figure}}\n"));
        }
        (_, video) => {
            out.push_str("\\begin{center}\n");
            if video {
                out.push_str("\\emph{Animation:} ");
            }
            out.push_str(&format!("\\url{{{}}}", figure.url));
            if !caption.is_empty() {
                out.push_str(&format!("\\\\\n{caption}"));
            }
            out.push_str("\n\\end{center}\n");
        }
    }
    out
}

fn missing_image(name: &str, target: Target) -> String {
    match target {
        Target::Html => format!("<p class=\"warning\">Missing image : {}</p>", escape(name)),
        Target::Latex => format!("\\emph{{Missing image: {}}}\n", escape_latex(name)),
    }
}

fn generation_error(content: &str, target: Target) -> String {
    match target {
        Target::Html => format!(
            "<div class=\"warning\">\n<h4>File generation error:</h4>\n<pre><code>{}\n</code></pre>\n</div>",
            escape(content)
        ),
        Target::Latex => format!(
            "\\emph{{Figure generation failed.}}\n\\begin{{verbatim}}\n{content}\n\\end{{verbatim}}\n"
        ),
    }
}
