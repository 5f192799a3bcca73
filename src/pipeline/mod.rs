//! Command pipeline
//!
//! Commands are typed: each declares its own input and output. Prerequisites
//! are injected into a command when it is constructed, so executing a command
//! runs its prerequisites directly. The [`CommandRegistry`] is the dynamic
//! boundary used by the CLI; it checks requirement names at registration and
//! input shapes at dispatch.

mod build;
mod validate;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::BundleFile;
use crate::error::{Result, command};
use crate::storage::Storage;

pub use build::{BuildCommand, BuildInput, BuildOutput};
pub use validate::{ValidateCommand, ValidateInput};

/// A named, typed pipeline step
pub trait Command {
    type Input;
    type Output;

    fn name(&self) -> &'static str;

    /// Commands that must be registered before this one
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn execute(&self, input: &Self::Input) -> Result<Self::Output>;
}

/// Input accepted at the registry boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    Validate(ValidateInput),
    Build(BuildInput),
}

impl CommandInput {
    /// Shape name, used in type mismatch reports
    pub fn shape(&self) -> &'static str {
        match self {
            CommandInput::Validate(_) => "ValidateInput",
            CommandInput::Build(_) => "BuildInput",
        }
    }
}

/// Output returned from the registry boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Validated(BundleFile),
    Built(BuildOutput),
}

/// Conversion between a command's typed input and [`CommandInput`]
pub trait InputShape: Sized {
    const SHAPE: &'static str;

    /// The typed input, or the original value back on a shape mismatch
    fn extract(input: CommandInput) -> std::result::Result<Self, CommandInput>;
}

impl InputShape for ValidateInput {
    const SHAPE: &'static str = "ValidateInput";

    fn extract(input: CommandInput) -> std::result::Result<Self, CommandInput> {
        match input {
            CommandInput::Validate(input) => Ok(input),
            other => Err(other),
        }
    }
}

impl InputShape for BuildInput {
    const SHAPE: &'static str = "BuildInput";

    fn extract(input: CommandInput) -> std::result::Result<Self, CommandInput> {
        match input {
            CommandInput::Build(input) => Ok(input),
            other => Err(other),
        }
    }
}

impl From<BundleFile> for CommandOutput {
    fn from(manifest: BundleFile) -> Self {
        CommandOutput::Validated(manifest)
    }
}

impl From<BuildOutput> for CommandOutput {
    fn from(output: BuildOutput) -> Self {
        CommandOutput::Built(output)
    }
}

/// Object-safe view of a [`Command`]
trait Dispatch: Send + Sync {
    fn dispatch(&self, input: CommandInput) -> Result<CommandOutput>;
}

impl<C> Dispatch for C
where
    C: Command + Send + Sync,
    C::Input: InputShape,
    C::Output: Into<CommandOutput>,
{
    fn dispatch(&self, input: CommandInput) -> Result<CommandOutput> {
        let input = C::Input::extract(input).map_err(|actual| {
            command::invalid_input(self.name(), C::Input::SHAPE, actual.shape())
        })?;
        self.execute(&input).map(Into::into)
    }
}

/// Named commands, built once at startup and read-only afterwards
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn Dispatch>>,
}

impl CommandRegistry {
    /// Registry name reported in duplicate registrations
    const NAME: &'static str = "bpm";

    pub fn new() -> Self {
        Self::default()
    }

    /// `validate` and `build`, with `build` owning its own validator
    pub fn standard(storage: Arc<Storage>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(ValidateCommand::new())?;
        registry.register(BuildCommand::new(ValidateCommand::new(), storage))?;
        Ok(registry)
    }

    /// Add a command. Every requirement must already be registered.
    pub fn register<C>(&mut self, cmd: C) -> Result<()>
    where
        C: Command + Send + Sync + 'static,
        C::Input: InputShape,
        C::Output: Into<CommandOutput>,
    {
        let name = cmd.name();
        if self.commands.contains_key(name) {
            return Err(command::duplicate(name, Self::NAME));
        }
        if let Some(missing) = cmd
            .requires()
            .iter()
            .find(|r| !self.commands.contains_key(*r))
        {
            return Err(command::unknown_requirement(name, *missing));
        }
        debug!(command = name, "registered command");
        self.commands.insert(name, Box::new(cmd));
        Ok(())
    }

    pub fn dispatch(&self, name: &str, input: CommandInput) -> Result<CommandOutput> {
        let cmd = self
            .commands
            .get(name)
            .ok_or_else(|| command::not_found(name))?;
        cmd.dispatch(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BpmError, ErrorKind};
    use std::fs;
    use tempfile::TempDir;

    fn storage(temp: &TempDir) -> Arc<Storage> {
        Arc::new(Storage::open(temp.path().join("store")).unwrap())
    }

    #[test]
    fn test_standard_registry() {
        let temp = TempDir::new().unwrap();
        let mut registry = CommandRegistry::standard(storage(&temp)).unwrap();
        let err = registry
            .register(BuildCommand::new(ValidateCommand::new(), storage(&temp)))
            .unwrap_err();
        assert!(err.to_string().contains("'build' is already registered in 'bpm'"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = CommandRegistry::new();
        registry.register(ValidateCommand::new()).unwrap();
        let err = registry.register(ValidateCommand::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateCommand);
    }

    #[test]
    fn test_requirement_must_be_registered_first() {
        let temp = TempDir::new().unwrap();
        let mut registry = CommandRegistry::new();
        let err = registry
            .register(BuildCommand::new(ValidateCommand::new(), storage(&temp)))
            .unwrap_err();
        assert!(matches!(
            err,
            BpmError::UnknownRequirement { ref command, ref requirement }
                if command == "build" && requirement == "validate"
        ));
    }

    #[test]
    fn test_dispatch_wrong_input_shape() {
        let temp = TempDir::new().unwrap();
        let registry = CommandRegistry::standard(storage(&temp)).unwrap();
        let err = registry
            .dispatch(
                "build",
                CommandInput::Validate(ValidateInput::new(temp.path())),
            )
            .unwrap_err();
        match err {
            BpmError::InvalidInputType {
                command,
                expected,
                actual,
            } => {
                assert_eq!(command, "build");
                assert_eq!(expected, "BuildInput");
                assert_eq!(actual, "ValidateInput");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dispatch_unknown_command() {
        let registry = CommandRegistry::new();
        let err = registry
            .dispatch("deploy", CommandInput::Validate(ValidateInput::new(".")))
            .unwrap_err();
        assert!(matches!(err, BpmError::CommandNotFound { .. }));
    }

    #[test]
    fn test_dispatch_validate() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("bundle.yaml"),
            "package:\n  name: acme\n  version: 0.1.0\n",
        )
        .unwrap();
        let registry = CommandRegistry::standard(storage(&temp)).unwrap();
        let output = registry
            .dispatch(
                "validate",
                CommandInput::Validate(ValidateInput::new(temp.path())),
            )
            .unwrap();
        assert!(matches!(output, CommandOutput::Validated(m) if m.package.name == "acme"));
    }
}
