//! CLI definitions using clap derive API
//!
//! Argument types for each command live in their own submodule; the handlers
//! are in `crate::commands`.

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod cache;
pub mod completions;
pub mod fetch;
pub mod inspect;
pub mod link;
pub mod validate;

pub use build::BuildArgs;
pub use cache::{CacheArgs, CacheSubcommand};
pub use completions::CompletionsArgs;
pub use fetch::FetchArgs;
pub use inspect::InspectArgs;
pub use link::LinkArgs;
pub use validate::ValidateArgs;

use crate::config::settings::{FETCH_RETRIES_ENV, STORAGE_DIR_ENV};

/// bpm - policy bundle package manager
#[derive(Parser, Debug)]
#[command(
    name = "bpm",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Package manager for policy bundles",
    long_about = "bpm validates, links and packs Rego policy bundles, and fetches their \
                  dependencies from git into a local content-addressed store.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  bpm validate                           \x1b[90m# Check ./bundle.yaml\x1b[0m\n   \
                  bpm build -o dist                      \x1b[90m# Pack the bundle and write bundle.lock\x1b[0m\n   \
                  bpm link                               \x1b[90m# Print the linked module set as JSON\x1b[0m\n   \
                  bpm fetch github:acme/policies#v1.0.0  \x1b[90m# Fetch a bundle into the store\x1b[0m\n   \
                  bpm inspect dist/acme.bundle.tar.gz    \x1b[90m# Show what an archive contains\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Bundle store directory
    #[arg(long, global = true, env = STORAGE_DIR_ENV)]
    pub storage_dir: Option<PathBuf>,

    /// Extra attempts after a failed remote fetch
    #[arg(long, global = true, env = FETCH_RETRIES_ENV)]
    pub fetch_retries: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a bundle manifest
    Validate(ValidateArgs),

    /// Pack a bundle into an archive and write its lock
    Build(BuildArgs),

    /// Resolve dependencies and link a bundle's sources
    Link(LinkArgs),

    /// Fetch a remote bundle into the store
    Fetch(FetchArgs),

    /// Show the contents of a bundle directory or archive
    Inspect(InspectArgs),

    /// Manage the bundle store
    #[command(name = "cache")]
    Cache(CacheArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
