use clap::Parser;
use std::path::PathBuf;

/// Arguments for validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Bundle source directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}
