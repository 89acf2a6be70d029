//! External toolchain seam.
//!
//! The asset builder only sees [`Toolchain`]; production code runs real
//! processes through [`ProcessToolchain`], tests substitute a recorder.

use std::path::Path;
use std::time::Duration;

use crate::error::ToolFailure;
use crate::utils::exec::{Cmd, FilterRule};

/// A single external process invocation.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    pub program: &'a str,
    pub args: Vec<String>,
    /// Working directory of the process. The caller's cwd is never changed.
    pub cwd: &'a Path,
    pub timeout: Duration,
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs. Success means exit status zero within the timeout.
pub trait Toolchain: Send + Sync {
    fn run(&self, invocation: &Invocation<'_>) -> Result<ToolOutput, ToolFailure>;
}

/// Known-noisy stderr prefixes of the typesetting tools.
const TOOL_FILTER: FilterRule = FilterRule::new(&[
    "GPL Ghostscript",
    "Copyright (C)",
    "This software is supplied",
    "warning: No fonts found",
]);

/// Spawns real processes via [`Cmd`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessToolchain;

impl Toolchain for ProcessToolchain {
    fn run(&self, invocation: &Invocation<'_>) -> Result<ToolOutput, ToolFailure> {
        let output = Cmd::new(invocation.program)
            .args(&invocation.args)
            .cwd(invocation.cwd)
            .timeout(invocation.timeout)
            .filter(&TOOL_FILTER)
            .run()?;
        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
