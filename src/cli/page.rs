//! Page commands: show, edit, save, delete, tree, pdf.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::address::PageAddress;
use crate::log;
use crate::page::ROOT_SLUG;
use crate::wiki::{TreeEntry, Wiki};

/// Rendered HTML to stdout, warnings to the log.
pub fn show(wiki: &Wiki, address: &PageAddress) -> Result<()> {
    let page = wiki.show(address)?;
    for warning in &page.warnings {
        log!("warning"; "{}", warning);
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(page.html.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Print the raw page source.
pub fn edit(wiki: &Wiki, address: &PageAddress) -> Result<()> {
    print!("{}", wiki.edit(address)?.source);
    Ok(())
}

/// Save content from `file`, or from stdin when no file is given.
pub fn save(
    wiki: &Wiki,
    address: &PageAddress,
    to: Option<&PageAddress>,
    file: Option<&Path>,
) -> Result<()> {
    let content = read_content(file)?;
    wiki.save(address, to, &content)?;
    Ok(())
}

pub fn delete(wiki: &Wiki, address: &PageAddress) -> Result<()> {
    Ok(wiki.delete(address)?)
}

fn read_content(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read page content from stdin")?;
            Ok(content)
        }
    }
}

#[derive(Serialize)]
struct TreeLine<'a> {
    depth: usize,
    address: &'a str,
    title: &'a str,
    url: String,
}

pub fn tree(wiki: &Wiki, address: &PageAddress, json: bool) -> Result<()> {
    let entries = wiki.subtree(address)?;
    if json {
        let routes = &wiki.config().routes;
        let lines: Vec<TreeLine<'_>> = entries
            .iter()
            .map(|e| TreeLine {
                depth: e.depth,
                address: e.node.address.as_str(),
                title: e.node.title(),
                url: routes.show_url(&e.node.address),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        for entry in &entries {
            println!("{}", format_entry(entry));
        }
    }
    Ok(())
}

fn format_entry(entry: &TreeEntry) -> String {
    format!("{}{}", "  ".repeat(entry.depth), entry.node.long_title())
}

pub fn pdf(wiki: &Wiki, address: &PageAddress, output: Option<&Path>) -> Result<()> {
    let bytes = wiki.pdf(address)?;
    let output = output.map_or_else(|| default_pdf_name(address), Path::to_path_buf);
    fs::write(&output, bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    log!("pdf"; "wrote {}", output.display());
    Ok(())
}

fn default_pdf_name(address: &PageAddress) -> PathBuf {
    PathBuf::from(format!("{}.pdf", address.name().unwrap_or(ROOT_SLUG)))
}
