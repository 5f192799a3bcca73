//! Fetch command implementation

use console::Style;

use crate::cli::FetchArgs;
use crate::error::Result;
use crate::fetch::{CancellationToken, VendorDescriptor};

use super::Context;

pub fn run(ctx: &Context, args: FetchArgs) -> Result<()> {
    let mut descriptor = VendorDescriptor::parse(&args.source)?;
    if let Some(git_ref) = args.git_ref {
        descriptor = descriptor.with_ref(git_ref);
    }
    if let Some(subdir) = args.subdir {
        descriptor = descriptor.with_subdir(subdir);
    }
    if let Some(digest) = args.digest {
        descriptor = descriptor.with_digest(digest);
    }

    let bundle = ctx
        .fetcher()
        .resolve(&descriptor, &CancellationToken::new())?;

    println!(
        "{} Fetched {} {} from {descriptor}",
        Style::new().green().bold().apply_to("✓"),
        bundle.name(),
        bundle.manifest.package.version
    );
    println!("  {} {}", Style::new().dim().apply_to("digest:"), bundle.digest());
    Ok(())
}
