//! `check` command: toolchain availability.

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use crate::config::WikiConfig;
use crate::log;

/// Print where each configured program resolves on `PATH`.
///
/// Fails when any program is missing, after reporting all of them.
pub fn run(config: &WikiConfig) -> Result<()> {
    let mut missing = Vec::new();
    for (name, program) in config.toolchain.programs() {
        match which::which(program) {
            Ok(path) => println!("{} {:<12} {}", "ok".green(), name, path.display()),
            Err(_) => {
                println!("{} {:<12} `{}` not found", "--".red(), name, program);
                missing.push(name);
            }
        }
    }

    if !missing.is_empty() {
        log!("check"; "figures needing {} will render as warnings", missing.join(", "));
        bail!("{} toolchain program(s) missing", missing.len());
    }
    Ok(())
}
