//! Turns state types into processor trees.
//!
//! Each state type implements [`Describe`] and declares its options,
//! sub-commands, shells and actions on a [`Schema`]. Building walks those
//! declarations depth-first:
//!
//! 1. options become bindings on the node's option table,
//! 2. command and shell slots recurse into the field's own type,
//! 3. leaves register raw queue handlers,
//! 4. actions get a synthetic processor over their parameter list.
//!
//! Any inconsistency (duplicate names, empty keys, must-exist on a non-file
//! slot) surfaces as [`ArgError::Configuration`](crate::ArgError) before a
//! single token is read.

mod action;
mod schema;

use tracing::debug;

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::processor::CommandProcessor;
use crate::shell::ShellLoop;

pub use action::{ActionFn, ParamDescriptor, ParamKind, ParamList, Params};
pub use schema::{ActionSlot, CommandSlot, OptionSlot, Schema};

/// A state type that knows its own command-line surface.
pub trait Describe: Sized + 'static {
    fn describe(schema: &mut Schema<Self>);
}

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    config: DispatchConfig,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Build a processor for `S` without a shell.
    pub fn build<S: Describe>(&self) -> Result<CommandProcessor<S>> {
        self.build_node(None)
    }

    /// Build a processor for `S` that drops into a shell with `prompt`.
    pub fn build_shell<S: Describe>(&self, prompt: impl Into<String>) -> Result<CommandProcessor<S>> {
        self.build_node(Some(prompt.into()))
    }

    pub(crate) fn build_node<S: Describe>(&self, prompt: Option<String>) -> Result<CommandProcessor<S>> {
        let mut schema = Schema::new();
        S::describe(&mut schema);

        debug!(
            node = std::any::type_name::<S>(),
            prompt = prompt.as_deref().unwrap_or(""),
            "building command node"
        );
        let mut processor = match prompt {
            Some(prompt) => CommandProcessor::with_shell(self.config.clone(), ShellLoop::new(prompt))?,
            None => CommandProcessor::new(self.config.clone()),
        };
        schema.compile(self, &mut processor)?;
        Ok(processor)
    }
}
