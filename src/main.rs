//! tola-wiki - a file-backed wiki with rendered markup and generated figures.

#![allow(dead_code)]

mod address;
mod asset;
mod cli;
mod config;
mod embed;
mod error;
mod logger;
mod page;
mod render;
mod utils;
mod wiki;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::WikiConfig;
use wiki::Wiki;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = WikiConfig::load(&cli.config)?;
    if let Commands::Check = cli.command {
        return cli::check::run(&config);
    }

    let wiki = Wiki::open(config)?;
    match &cli.command {
        Commands::Show { address } => cli::page::show(&wiki, address),
        Commands::Edit { address } => cli::page::edit(&wiki, address),
        Commands::Save { address, to, file } => {
            cli::page::save(&wiki, address, to.as_ref(), file.as_deref())
        }
        Commands::Delete { address } => cli::page::delete(&wiki, address),
        Commands::Tree { address, json } => cli::page::tree(&wiki, address, *json),
        Commands::Pdf { address, output } => cli::page::pdf(&wiki, address, output.as_deref()),
        Commands::Check => Ok(()),
    }
}
