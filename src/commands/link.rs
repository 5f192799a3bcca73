//! Link command implementation
//!
//! Prints the linked module set (path to source text) as JSON, the form a
//! policy compiler consumes. With `--graph`, prints each file's resolved
//! imports instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cli::LinkArgs;
use crate::error::Result;
use crate::linker;
use crate::manifester::Manifester;
use crate::storage::LoadOptions;

use super::{Context, base_dir};

pub fn run(ctx: &Context, args: LinkArgs) -> Result<()> {
    let bundle = ctx.storage.load(&args.path, &LoadOptions::default())?;
    let manifester = Manifester::new(Arc::clone(&ctx.storage), ctx.fetcher())
        .with_retries(ctx.settings.fetch_retries);
    let linked = manifester.link_bundle(&bundle, &base_dir(&args.path))?;

    let json = if args.graph {
        let graph: BTreeMap<&str, &BTreeMap<String, String>> = linked
            .iter()
            .map(|(path, file)| (path.as_str(), &file.dependencies))
            .collect();
        serde_json::to_string_pretty(&graph)?
    } else {
        serde_json::to_string_pretty(&linker::modules(&linked))?
    };
    println!("{json}");
    Ok(())
}
