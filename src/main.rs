//! bpm - policy bundle package manager
//!
//! Validates, links and packs Rego policy bundles. Dependencies are fetched
//! from git into a local content-addressed store and linked against the
//! bundle's own sources.

use std::process::ExitCode;

use clap::Parser;
use console::Style;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod fetch;
mod git;
mod hash;
mod index;
mod linker;
mod manifester;
mod path_utils;
mod pipeline;
mod progress;
mod storage;

use cli::{Cli, Commands};
use commands::Context;
use error::Result;

/// `RUST_LOG` wins over `-v`
fn log_filter(verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn run(cli: Cli) -> Result<()> {
    let context = || Context::new(cli.storage_dir.clone(), cli.fetch_retries);
    match cli.command {
        Commands::Validate(args) => commands::validate::run(&context()?, args),
        Commands::Build(args) => commands::build::run(&context()?, args),
        Commands::Link(args) => commands::link::run(&context()?, args),
        Commands::Fetch(args) => commands::fetch::run(&context()?, args),
        Commands::Inspect(args) => commands::inspect::run(&context()?, args),
        Commands::Cache(args) => commands::cache::run(&context()?, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "bpm starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let label = format!("Error[{}]:", e.kind());
            eprintln!("{} {e}", Style::new().red().bold().apply_to(label));
            if let Some(help) = e.help() {
                eprintln!("  {} {help}", Style::new().cyan().apply_to("help:"));
            }
            ExitCode::FAILURE
        }
    }
}
