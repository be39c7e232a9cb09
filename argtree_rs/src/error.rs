//! Error type shared by the tree builder and the dispatcher.

use thiserror::Error;

use crate::value::ValueType;

pub type Result<T> = std::result::Result<T, ArgError>;

#[derive(Error, Debug)]
pub enum ArgError {
    /// Raised while building a processor tree, never during dispatch.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid value '{value}' for '{key}': expected {expected}")]
    Parse {
        key: String,
        value: String,
        expected: ValueType,
    },

    #[error("option '--{key}' requires a value")]
    MissingValue { key: String },

    /// A slot was read or written with a value of the wrong shape.
    #[error("slot '{slot}' cannot be accessed: {reason}")]
    SlotAccess { slot: String, reason: String },

    #[error("unrecognized command '{command}'{}", suggestion_hint(.suggestion))]
    UnrecognizedCommand {
        command: String,
        suggestion: Option<String>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Action(#[from] anyhow::Error),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

impl ArgError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ArgError::Configuration(message.into())
    }

    pub fn parse(key: impl Into<String>, value: impl Into<String>, expected: ValueType) -> Self {
        ArgError::Parse {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }

    pub fn slot_access(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        ArgError::SlotAccess {
            slot: slot.into(),
            reason: reason.into(),
        }
    }
}
