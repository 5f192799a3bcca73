//! Build command implementation

use crate::cli::BuildArgs;
use crate::error::Result;
use crate::pipeline::{BuildCommand, BuildInput, CommandInput, CommandRegistry};

use super::{Context, report};

pub fn run(ctx: &Context, args: BuildArgs) -> Result<()> {
    let output_dir = args.output.unwrap_or_else(|| args.dir.clone());
    let mut input = BuildInput::new(args.dir, output_dir);
    input.ignore = args.ignore;

    let registry = CommandRegistry::standard(ctx.storage.clone())?;
    let output = registry.dispatch(BuildCommand::NAME, CommandInput::Build(input))?;
    report(&output);
    Ok(())
}
