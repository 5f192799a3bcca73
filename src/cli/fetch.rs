use clap::Parser;

/// Arguments for fetch command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Fetch from GitHub shorthand:\n    bpm fetch github:acme/policies\n\n\
                  Fetch a tag:\n    bpm fetch https://github.com/acme/policies.git#v1.2.0\n\n\
                  Fetch a bundle in a subdirectory:\n    bpm fetch acme/policies --subdir authz")]
pub struct FetchArgs {
    /// Bundle source (github:owner/repo, owner/repo, git URL, optionally with #ref)
    pub source: String,

    /// Branch, tag or commit to fetch
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    /// Subdirectory of the repository holding the bundle
    #[arg(long)]
    pub subdir: Option<String>,

    /// Expected bundle digest (blake3:<hex>)
    #[arg(long)]
    pub digest: Option<String>,
}
