use clap::Parser;
use std::path::PathBuf;

/// Arguments for inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Bundle directory or archive
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
