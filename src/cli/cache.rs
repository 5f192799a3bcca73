use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show store statistics:\n    bpm cache\n\n\
                  List stored bundles:\n    bpm cache list\n\n\
                  Clear the store:\n    bpm cache clear\n\n\
                  Remove one entry:\n    bpm cache clear --only blake3:<digest>")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List stored bundles
    List,

    /// Clear stored bundles
    Clear(ClearCacheArgs),
}

/// Arguments for cache clear command
#[derive(Parser, Debug)]
pub struct ClearCacheArgs {
    /// Remove only the entry with this digest
    #[arg(long)]
    pub only: Option<String>,
}
