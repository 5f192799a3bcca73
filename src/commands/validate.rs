//! Validate command implementation

use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::pipeline::{CommandInput, CommandRegistry, ValidateCommand, ValidateInput};

use super::{Context, report};

pub fn run(ctx: &Context, args: ValidateArgs) -> Result<()> {
    let registry = CommandRegistry::standard(ctx.storage.clone())?;
    let output = registry.dispatch(
        ValidateCommand::NAME,
        CommandInput::Validate(ValidateInput::new(args.dir)),
    )?;
    report(&output);
    Ok(())
}
