//! Whole-page PDF typesetting.

use std::fs;

use super::{AssetBuilder, BuildFamily, args, post_process, require};
use crate::error::ToolFailure;
use crate::log;

/// Base name of the page document inside the latex work directory.
const BASENAME: &str = "ppdf";

/// Auxiliary files left behind by a previous page build.
const ARTIFACTS: [&str; 9] = ["idx", "ind", "ilg", "aux", "log", "out", "toc", "tex", "pdf"];

impl AssetBuilder {
    /// Typeset a complete LaTeX document and return the PDF bytes.
    ///
    /// `pdflatex` runs `repeat` times so references settle. When the
    /// document produced a nonempty index, `makeindex` runs followed by one
    /// more `pdflatex` pass. Shares the latex work directory and lock with
    /// figure builds.
    pub fn make_pdf(&self, latex: &str, repeat: usize) -> Result<Vec<u8>, ToolFailure> {
        let _guard = self.lock(BuildFamily::Latex);
        let work = self.work_dir(BuildFamily::Latex);
        fs::create_dir_all(&work).map_err(post_process)?;
        for ext in ARTIFACTS {
            let _ = fs::remove_file(work.join(format!("{BASENAME}.{ext}")));
        }

        let tex = format!("{BASENAME}.tex");
        fs::write(work.join(&tex), latex).map_err(post_process)?;

        let pdflatex = &self.toolchain_config.pdflatex;
        let pdflatex_args = args(["--interaction=nonstopmode", tex.as_str()]);
        for _ in 0..repeat.max(1) {
            self.typeset(pdflatex, &pdflatex_args, &work)?;
        }

        let idx = work.join(format!("{BASENAME}.idx"));
        if fs::metadata(&idx).is_ok_and(|meta| meta.len() > 0) {
            log!("pdf"; "building index");
            let makeindex = &self.toolchain_config.makeindex;
            self.invoke(makeindex, args([BASENAME]), &work)?;
            self.typeset(pdflatex, &pdflatex_args, &work)?;
        }

        let pdf = work.join(format!("{BASENAME}.pdf"));
        require(&pdf)?;
        fs::read(&pdf).map_err(post_process)
    }

    /// One `pdflatex` pass. Nonstop mode exits nonzero on recoverable
    /// errors, so a produced PDF counts as success.
    fn typeset(
        &self,
        pdflatex: &str,
        pdflatex_args: &[String],
        work: &std::path::Path,
    ) -> Result<(), ToolFailure> {
        match self.invoke(pdflatex, pdflatex_args.to_vec(), work) {
            Ok(_) => Ok(()),
            Err(ToolFailure::Exit { status, .. }) if work.join(format!("{BASENAME}.pdf")).is_file() => {
                log!("warning"; "pdflatex reported {}, keeping output", status);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::asset::fake::FakeToolchain;
    use crate::config::WikiConfig;

    #[test]
    fn test_make_pdf_runs_repeat_passes() {
        let dir = TempDir::new().unwrap();
        let config = WikiConfig::rooted(dir.path());
        let fake = Arc::new(FakeToolchain::default());
        let builder = AssetBuilder::with_toolchain(&config, fake.clone());

        let bytes = builder.make_pdf(r"\documentclass{article}", 2).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(fake.calls(), vec!["pdflatex", "pdflatex"]);
    }

    #[test]
    fn test_make_pdf_failure() {
        let dir = TempDir::new().unwrap();
        let config = WikiConfig::rooted(dir.path());
        let fake = Arc::new(FakeToolchain::default());
        fake.set_failing(true);
        let builder = AssetBuilder::with_toolchain(&config, fake);

        let err = builder.make_pdf("x", 2).unwrap_err();
        assert!(matches!(err, ToolFailure::Exit { .. }));
    }
}
