//! Generated-asset build pipeline.
//!
//! Figures and animations embedded in page source are built once per
//! distinct `(template kind, source)` pair and cached under
//! `{media root}/{images}/{sysgen}/{hash}.{ext}`:
//!
//! ```text
//! ensure_asset(source, kind)
//!   ├── cache file exists ──────────────────────────────► Ready (no lock)
//!   └── lock(kind.family())
//!         ├── exists now (built by a concurrent caller) ─► Ready
//!         └── driver → toolchain → resize → temp → rename ► Ready | Missing
//! ```
//!
//! Builds of one family share a work directory and fixed temp file names,
//! so they are serialized by that family's lock. Failures are returned as
//! [`AssetStatus::Missing`] and are never cached.

mod kind;
mod pdf;
mod probe;
mod toolchain;

pub use kind::{BuildFamily, TemplateKind};
pub use probe::scaled;
pub use toolchain::{Invocation, ProcessToolchain, ToolOutput, Toolchain};

#[cfg(test)]
pub use toolchain::fake;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageFormat;
use image::imageops::FilterType;
use parking_lot::{Mutex, MutexGuard};

use crate::config::{MediaConfig, ToolchainConfig, WikiConfig};
use crate::embed::Template;
use crate::embed::figure::SourceVars;
use crate::error::ToolFailure;
use crate::utils::fs::write_atomic;
use crate::utils::hash::ContentHash;
use crate::{debug, log};

/// Location of a generated asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub kind: TemplateKind,
    /// Cache file on disk.
    pub path: PathBuf,
    /// Public URL of the cache file.
    pub url: String,
    pub file_name: String,
}

/// Result of [`AssetBuilder::ensure_asset`].
#[derive(Debug, Clone)]
pub enum AssetStatus {
    Ready(Asset),
    /// The build failed; nothing was cached.
    Missing(ToolFailure),
}

/// Content-addressed builder for generated figures.
pub struct AssetBuilder {
    toolchain_config: ToolchainConfig,
    media: MediaConfig,
    toolchain: Arc<dyn Toolchain>,
    latex_lock: Mutex<()>,
    matplotlib_lock: Mutex<()>,
}

impl AssetBuilder {
    /// Builder running real external processes.
    pub fn new(config: &WikiConfig) -> Self {
        Self::with_toolchain(config, Arc::new(ProcessToolchain))
    }

    pub fn with_toolchain(config: &WikiConfig, toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            toolchain_config: config.toolchain.clone(),
            media: config.media.clone(),
            toolchain,
            latex_lock: Mutex::new(()),
            matplotlib_lock: Mutex::new(()),
        }
    }

    /// Cache location for `source`, whether or not it has been built.
    pub fn asset_for(&self, source: &str, kind: TemplateKind) -> Asset {
        let hash = ContentHash::of_parts(&[kind.id(), source]);
        let file_name = format!("{}.{}", hash.to_hex(), kind.extension());
        Asset {
            kind,
            path: self.media.sysgen_dir().join(&file_name),
            url: self.media.sysgen_url(&file_name),
            file_name,
        }
    }

    /// Return the cached asset for `source`, building it on a miss.
    pub fn ensure_asset(&self, source: &str, kind: TemplateKind) -> AssetStatus {
        let asset = self.asset_for(source, kind);
        if asset.path.is_file() {
            debug!("asset"; "cache hit {}", asset.file_name);
            return AssetStatus::Ready(asset);
        }

        let _guard = self.lock(kind.family());
        if asset.path.is_file() {
            debug!("asset"; "built concurrently {}", asset.file_name);
            return AssetStatus::Ready(asset);
        }

        log!("asset"; "building {} ({})", asset.file_name, kind);
        match self.build(source, kind, &asset.path) {
            Ok(()) => AssetStatus::Ready(asset),
            Err(failure) => {
                log!("error"; "{} build failed: {}", kind, failure);
                AssetStatus::Missing(failure)
            }
        }
    }

    /// Pixel size of an image or video file, `None` if it cannot be read.
    pub fn dimensions(&self, path: &Path) -> Option<(u32, u32)> {
        let is_video = path.extension().is_some_and(|ext| ext == "mp4");
        if !is_video {
            return probe::image_size(path);
        }

        let cwd = path.parent().unwrap_or(Path::new("."));
        let input = path.to_string_lossy().into_owned();
        // ffmpeg exits nonzero without an output file; the probe is on stderr either way
        let stderr = match self.invoke(&self.toolchain_config.ffmpeg, vec!["-i".into(), input], cwd) {
            Ok(output) => output.stderr,
            Err(ToolFailure::Exit { stderr, .. }) => stderr,
            Err(_) => return None,
        };
        probe::parse_video_size(&stderr)
    }

    // ------------------------------------------------------------------------
    // build steps (caller holds the family lock)
    // ------------------------------------------------------------------------

    fn build(&self, source: &str, kind: TemplateKind, target: &Path) -> Result<(), ToolFailure> {
        if kind.family() == BuildFamily::Matplotlib && has_import_line(source) {
            return Err(ToolFailure::Rejected(
                "import statements are not allowed in plot source".to_string(),
            ));
        }

        let work = self.prepare_work_dir(kind.family())?;
        let driver = self.template(kind)?.render(&SourceVars { source });
        fs::write(work.join(kind.driver_name()), driver).map_err(post_process)?;

        match kind.family() {
            BuildFamily::Latex => {
                let pdflatex = &self.toolchain_config.pdflatex;
                self.invoke(pdflatex, args(["--interaction=nonstopmode", "temp.tex"]), &work)?;
                require(&work.join("temp.pdf"))?;
                self.invoke(&self.toolchain_config.ghostscript, self.ghostscript_args(), &work)?;
            }
            BuildFamily::Matplotlib => {
                self.invoke(&self.toolchain_config.python, args(["temp.py"]), &work)?;
            }
        }

        let output = work.join(format!("temp.{}", kind.extension()));
        require(&output)?;
        if let Some(factor) = kind.resize_factor() {
            resize_png(&output, factor)?;
        }

        let parent = target.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(post_process)?;
        let bytes = fs::read(&output).map_err(post_process)?;
        write_atomic(target, &bytes).map_err(post_process)?;
        let _ = fs::remove_file(&output);

        log!("asset"; "saved {}", target.display());
        Ok(())
    }

    fn ghostscript_args(&self) -> Vec<String> {
        let resolution = format!("-r{}", self.toolchain_config.dpi);
        args([
            "-q",
            "-dBATCH",
            "-dNOPAUSE",
            "-sDEVICE=png16m",
            resolution.as_str(),
            "-dTextAlphaBits=4",
            "-dGraphicsAlphaBits=4",
            "-sOutputFile=temp.png",
            "temp.pdf",
        ])
    }

    /// Driver template, preferring an override in `toolchain.template_dir`.
    fn template<'a>(&self, kind: TemplateKind) -> Result<Template<SourceVars<'a>>, ToolFailure> {
        let embedded = kind.template();
        match &self.toolchain_config.template_dir {
            Some(dir) => embedded
                .or_override(&dir.join(kind.template_path()))
                .map_err(post_process),
            None => Ok(embedded),
        }
    }

    /// Create the family work directory and clear stale temp files.
    fn prepare_work_dir(&self, family: BuildFamily) -> Result<PathBuf, ToolFailure> {
        let work = self.work_dir(family);
        fs::create_dir_all(&work).map_err(post_process)?;
        for ext in ["tex", "py", "pdf", "png", "mp4", "aux", "log"] {
            let _ = fs::remove_file(work.join(format!("temp.{ext}")));
        }
        Ok(work)
    }

    fn work_dir(&self, family: BuildFamily) -> PathBuf {
        self.toolchain_config.work_dir.join(family.dir_name())
    }

    fn lock(&self, family: BuildFamily) -> MutexGuard<'_, ()> {
        match family {
            BuildFamily::Latex => self.latex_lock.lock(),
            BuildFamily::Matplotlib => self.matplotlib_lock.lock(),
        }
    }

    fn invoke(&self, program: &str, args: Vec<String>, cwd: &Path) -> Result<ToolOutput, ToolFailure> {
        debug!("asset"; "{} {}", program, args.join(" "));
        self.toolchain.run(&Invocation {
            program,
            args,
            cwd,
            timeout: self.toolchain_config.timeout(),
        })
    }
}

fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn require(path: &Path) -> Result<(), ToolFailure> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ToolFailure::MissingOutput(path.to_path_buf()))
    }
}

fn post_process(err: impl std::fmt::Display) -> ToolFailure {
    ToolFailure::PostProcess(err.to_string())
}

/// Top-level `import` / `from ... import` lines in plot source.
fn has_import_line(source: &str) -> bool {
    source.lines().any(|line| {
        line.starts_with("import ") || (line.starts_with("from ") && line.contains(" import "))
    })
}

/// Downscale a PNG in place.
fn resize_png(path: &Path, factor: f32) -> Result<(), ToolFailure> {
    let img = image::open(path).map_err(post_process)?;
    let width = ((img.width() as f32 * factor) as u32).max(1);
    let height = ((img.height() as f32 * factor) as u32).max(1);
    img.resize_exact(width, height, FilterType::Lanczos3)
        .save_with_format(path, ImageFormat::Png)
        .map_err(post_process)
}
