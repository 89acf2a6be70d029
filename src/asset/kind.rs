//! Generated-asset template kinds.

use std::fmt;
use std::str::FromStr;

use crate::embed::Template;
use crate::embed::figure::{LATEX_PREVIEW, MATPLOTLIB_ANIMATION, MATPLOTLIB_PYPLOT, SourceVars};

/// Toolchain family. Each family owns one work directory and one build lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildFamily {
    Latex,
    Matplotlib,
}

impl BuildFamily {
    /// Work directory name under `toolchain.work_dir`.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Latex => "latex",
            Self::Matplotlib => "matplotlib",
        }
    }
}

/// Driver template used to build a figure from embedded source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    #[default]
    LatexPreview,
    MatplotlibPyplot,
    MatplotlibAnimation,
}

impl TemplateKind {
    pub const ALL: [Self; 3] = [
        Self::LatexPreview,
        Self::MatplotlibPyplot,
        Self::MatplotlibAnimation,
    ];

    /// Stable identifier, also part of the cache key.
    pub const fn id(self) -> &'static str {
        match self {
            Self::LatexPreview => "latex-preview",
            Self::MatplotlibPyplot => "matplotlib-pyplot",
            Self::MatplotlibAnimation => "matplotlib-animation",
        }
    }

    pub const fn family(self) -> BuildFamily {
        match self {
            Self::LatexPreview => BuildFamily::Latex,
            Self::MatplotlibPyplot | Self::MatplotlibAnimation => BuildFamily::Matplotlib,
        }
    }

    /// Extension of the produced asset.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::MatplotlibAnimation => "mp4",
            _ => "png",
        }
    }

    pub const fn is_video(self) -> bool {
        matches!(self, Self::MatplotlibAnimation)
    }

    /// Downscale applied to the raw raster. Videos are left alone.
    pub const fn resize_factor(self) -> Option<f32> {
        match self {
            Self::LatexPreview => Some(0.20),
            Self::MatplotlibPyplot => Some(0.70),
            Self::MatplotlibAnimation => None,
        }
    }

    /// Driver file written into the work directory.
    pub const fn driver_name(self) -> &'static str {
        match self.family() {
            BuildFamily::Latex => "temp.tex",
            BuildFamily::Matplotlib => "temp.py",
        }
    }

    /// Path of the template relative to a template directory.
    pub const fn template_path(self) -> &'static str {
        match self {
            Self::LatexPreview => "latex/preview.tex",
            Self::MatplotlibPyplot => "matplotlib/pyplot.py",
            Self::MatplotlibAnimation => "matplotlib/animation.py",
        }
    }

    /// Embedded driver template.
    pub fn template<'a>(self) -> Template<SourceVars<'a>> {
        match self {
            Self::LatexPreview => LATEX_PREVIEW,
            Self::MatplotlibPyplot => MATPLOTLIB_PYPLOT,
            Self::MatplotlibAnimation => MATPLOTLIB_ANIMATION,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s.trim())
            .ok_or_else(|| format!("unknown figure template `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("latex-preview".parse(), Ok(TemplateKind::LatexPreview));
        assert_eq!(" matplotlib-animation ".parse(), Ok(TemplateKind::MatplotlibAnimation));
        assert!("latex-beamer".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_kind_properties() {
        assert_eq!(TemplateKind::MatplotlibAnimation.extension(), "mp4");
        assert_eq!(TemplateKind::MatplotlibAnimation.resize_factor(), None);
        assert_eq!(TemplateKind::MatplotlibPyplot.family(), BuildFamily::Matplotlib);
        assert_eq!(TemplateKind::LatexPreview.driver_name(), "temp.tex");
    }
}
