use clap::Parser;
use std::path::PathBuf;

/// Arguments for link command
#[derive(Parser, Debug)]
pub struct LinkArgs {
    /// Bundle source directory or archive
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print each file's resolved imports instead of the module sources
    #[arg(long)]
    pub graph: bool,
}
