use clap::Parser;
use std::path::PathBuf;

/// Arguments for build command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Build the bundle in the current directory:\n    bpm build\n\n\
                  Write the archive and lock to dist/:\n    bpm build -o dist\n\n\
                  Leave test policies out of the archive:\n    bpm build --ignore '**/*_test.rego'")]
pub struct BuildArgs {
    /// Bundle source directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Output directory for the archive and bundle.lock (defaults to the source directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Additional glob of files to leave out (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,
}
