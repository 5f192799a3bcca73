//! Command pipeline errors

use super::BpmError;

pub fn duplicate(name: impl Into<String>, parent: impl Into<String>) -> BpmError {
    BpmError::DuplicateCommand {
        name: name.into(),
        parent: parent.into(),
    }
}

pub fn not_found(name: impl Into<String>) -> BpmError {
    BpmError::CommandNotFound { name: name.into() }
}

pub fn unknown_requirement(command: impl Into<String>, requirement: impl Into<String>) -> BpmError {
    BpmError::UnknownRequirement {
        command: command.into(),
        requirement: requirement.into(),
    }
}

/// Creates an invalid input type error
pub fn invalid_input(
    command: impl Into<String>,
    expected: impl Into<String>,
    actual: impl Into<String>,
) -> BpmError {
    BpmError::InvalidInputType {
        command: command.into(),
        expected: expected.into(),
        actual: actual.into(),
    }
}

pub fn invalid_argument(
    argument: impl Into<String>,
    value: impl Into<String>,
    reason: impl Into<String>,
) -> BpmError {
    BpmError::InvalidArgument {
        argument: argument.into(),
        value: value.into(),
        reason: reason.into(),
    }
}
