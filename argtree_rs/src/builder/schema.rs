//! Declarative description of one node of the command tree.
//!
//! A state type fills a [`Schema`] in [`Describe::describe`](super::Describe);
//! the [`TreeBuilder`] then compiles it into options, nested processors and
//! synthesized action commands.

use crate::binding::{SlotAccessor, SlotBinding};
use crate::error::{ArgError, Result};
use crate::processor::{Action, CommandHandler, CommandProcessor, DefaultHandler, Fallback};
use crate::queue::TokenQueue;
use crate::value::{SlotValue, ValueType};

use super::action::{self, ActionFn, ParamList, Params};
use super::{Describe, TreeBuilder};

type BindingFactory<S> = Box<dyn FnOnce(String) -> SlotBinding<S>>;
type ChildFactory<S> = Box<dyn FnOnce(&TreeBuilder, Option<String>) -> Result<CommandHandler<S>>>;

/// An option field. The key defaults to the field name.
pub struct OptionSlot<S> {
    name: String,
    key: Option<String>,
    shortcut: Option<char>,
    no_shortcut: bool,
    must_exist: bool,
    value_type: ValueType,
    make: BindingFactory<S>,
}

impl<S> OptionSlot<S> {
    pub fn key(&mut self, key: &str) -> &mut Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn short(&mut self, shortcut: char) -> &mut Self {
        self.shortcut = Some(shortcut);
        self.no_shortcut = false;
        self
    }

    pub fn no_short(&mut self) -> &mut Self {
        self.shortcut = None;
        self.no_shortcut = true;
        self
    }

    /// Only valid on file slots.
    pub fn must_exist(&mut self) -> &mut Self {
        self.must_exist = true;
        self
    }

    fn into_binding(self) -> Result<SlotBinding<S>> {
        let key = resolve_key(&self.name, self.key.as_deref(), "option")?;
        if self.must_exist && self.value_type != ValueType::File {
            return Err(ArgError::configuration(format!(
                "option '{}' is a {} slot; must-exist applies to files only",
                key, self.value_type
            )));
        }

        let mut binding = (self.make)(key);
        if let Some(shortcut) = self.shortcut {
            binding = binding.with_shortcut(shortcut);
        }
        if self.no_shortcut {
            binding = binding.without_shortcut();
        }
        if self.must_exist {
            binding = binding.must_exist();
        }
        Ok(binding)
    }
}

/// A nested state reached through a field; plain commands and shells.
pub struct CommandSlot<S> {
    name: String,
    key: Option<String>,
    prompt: Option<String>,
    shell: bool,
    build: ChildFactory<S>,
}

impl<S> CommandSlot<S> {
    pub fn key(&mut self, key: &str) -> &mut Self {
        self.key = Some(key.to_string());
        self
    }

    /// Shell prompt; defaults to the command key. Ignored on plain commands.
    pub fn prompt(&mut self, prompt: &str) -> &mut Self {
        self.prompt = Some(prompt.to_string());
        self
    }
}

pub struct ActionSlot<S> {
    name: String,
    key: Option<String>,
    params: ParamList,
    action: ActionFn<S>,
}

impl<S> ActionSlot<S> {
    pub fn key(&mut self, key: &str) -> &mut Self {
        self.key = Some(key.to_string());
        self
    }
}

struct LeafSlot<S> {
    key: String,
    action: Action<S>,
}

/// Everything one state type declares about its node.
pub struct Schema<S> {
    options: Vec<OptionSlot<S>>,
    commands: Vec<CommandSlot<S>>,
    actions: Vec<ActionSlot<S>>,
    leaves: Vec<LeafSlot<S>>,
    fallback: Option<Fallback<S>>,
}

impl<S: 'static> Schema<S> {
    pub(super) fn new() -> Self {
        Self {
            options: Vec::new(),
            commands: Vec::new(),
            actions: Vec::new(),
            leaves: Vec::new(),
            fallback: None,
        }
    }

    /// Declare an option stored in the field `slot` points at.
    pub fn option<T: SlotValue>(&mut self, name: &str, slot: SlotAccessor<S, T>) -> &mut OptionSlot<S> {
        self.options.push(OptionSlot {
            name: name.to_string(),
            key: None,
            shortcut: None,
            no_shortcut: false,
            must_exist: false,
            value_type: T::VALUE_TYPE,
            make: Box::new(move |key| SlotBinding::field(key, slot)),
        });
        let last = self.options.len() - 1;
        &mut self.options[last]
    }

    /// Declare a sub-command whose state is the field `slot` points at.
    pub fn command<C: Describe>(&mut self, name: &str, slot: SlotAccessor<S, C>) -> &mut CommandSlot<S> {
        self.push_child(name, slot, false)
    }

    /// Like [`command`](Self::command), but the child drops into its own
    /// shell when it runs out of tokens.
    pub fn shell<C: Describe>(&mut self, name: &str, slot: SlotAccessor<S, C>) -> &mut CommandSlot<S> {
        self.push_child(name, slot, true)
    }

    fn push_child<C: Describe>(
        &mut self,
        name: &str,
        slot: SlotAccessor<S, C>,
        shell: bool,
    ) -> &mut CommandSlot<S> {
        self.commands.push(CommandSlot {
            name: name.to_string(),
            key: None,
            prompt: None,
            shell,
            build: Box::new(move |builder, prompt| {
                let processor = builder.build_node::<C>(prompt)?;
                Ok(CommandHandler::child(processor, slot))
            }),
        });
        let last = self.commands.len() - 1;
        &mut self.commands[last]
    }

    /// Declare a command backed by a closure over typed parameters.
    pub fn action(
        &mut self,
        name: &str,
        params: ParamList,
        action: impl Fn(&mut S, &Params) -> anyhow::Result<()> + 'static,
    ) -> &mut ActionSlot<S> {
        self.actions.push(ActionSlot {
            name: name.to_string(),
            key: None,
            params,
            action: Box::new(action),
        });
        let last = self.actions.len() - 1;
        &mut self.actions[last]
    }

    /// Declare a command that receives the raw remainder of the queue.
    pub fn leaf(
        &mut self,
        name: &str,
        action: impl Fn(&mut TokenQueue, &mut S) -> Result<()> + 'static,
    ) {
        self.leaves.push(LeafSlot {
            key: name.to_string(),
            action: Box::new(action),
        });
    }

    /// Replace the unrecognized-command report of this node.
    pub fn fallback(
        &mut self,
        fallback: impl Fn(&CommandProcessor<S>, &mut TokenQueue, &mut S) -> Result<()> + 'static,
    ) {
        self.fallback = Some(Box::new(fallback));
    }

    /// Register everything declared here on `processor`.
    pub(super) fn compile(self, builder: &TreeBuilder, processor: &mut CommandProcessor<S>) -> Result<()> {
        for option in self.options {
            processor.add_option(option.into_binding()?)?;
        }

        for command in self.commands {
            let key = resolve_key(&command.name, command.key.as_deref(), "command")?;
            let prompt = command.shell.then(|| {
                command
                    .prompt
                    .filter(|prompt| !prompt.is_empty())
                    .unwrap_or_else(|| key.clone())
            });
            let handler = (command.build)(builder, prompt)?;
            processor.add_command(key, handler)?;
        }

        for leaf in self.leaves {
            processor.add_command(leaf.key, CommandHandler::Leaf(leaf.action))?;
        }

        for slot in self.actions {
            let key = resolve_key(&slot.name, slot.key.as_deref(), "action")?;
            let handler = action::synthesize(builder.config(), &key, slot.params, slot.action)?;
            processor.add_command(key, handler)?;
        }

        processor.set_default(match self.fallback {
            Some(fallback) => DefaultHandler::Custom(fallback),
            None => DefaultHandler::Unrecognized,
        });
        Ok(())
    }
}

fn resolve_key(name: &str, key: Option<&str>, what: &str) -> Result<String> {
    let key = key.filter(|key| !key.is_empty()).unwrap_or(name);
    if key.is_empty() {
        return Err(ArgError::configuration(format!("{} slot has no name", what)));
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Debug, Default)]
    struct Node {
        level: i32,
        input: Option<PathBuf>,
    }

    impl Describe for Node {
        fn describe(schema: &mut Schema<Self>) {
            schema.option("level", |n: &mut Node| &mut n.level);
        }
    }

    fn compile(schema: Schema<Node>) -> Result<CommandProcessor<Node>> {
        let mut processor = CommandProcessor::new(Default::default());
        schema.compile(&TreeBuilder::new(), &mut processor)?;
        Ok(processor)
    }

    #[test]
    fn test_option_key_defaults_to_name() {
        let mut schema = Schema::new();
        schema.option("level", |n: &mut Node| &mut n.level);
        schema.option("input", |n: &mut Node| &mut n.input).key("in").short('f');
        let processor = compile(schema).unwrap();
        assert!(processor.options().get("level").is_some());
        assert_eq!(processor.options().shortcut_of("in"), Some('f'));
    }

    #[test]
    fn test_must_exist_requires_file_slot() {
        let mut schema = Schema::new();
        schema.option("level", |n: &mut Node| &mut n.level).must_exist();
        assert!(matches!(compile(schema), Err(ArgError::Configuration(_))));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut schema = Schema::new();
        schema.option("", |n: &mut Node| &mut n.level);
        assert!(matches!(compile(schema), Err(ArgError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_names_across_kinds_are_rejected() {
        let mut schema = Schema::new();
        schema.leaf("go", |_, _| Ok(()));
        schema.action("go", ParamList::new(), |_, _| Ok(()));
        assert!(matches!(compile(schema), Err(ArgError::Configuration(_))));
    }

    #[test]
    fn test_shell_is_registered_under_its_key() {
        struct Root {
            node: Node,
        }

        let mut schema: Schema<Root> = Schema::new();
        schema.shell("node", |r: &mut Root| &mut r.node).key("n");
        let mut processor = CommandProcessor::new(Default::default());
        schema.compile(&TreeBuilder::new(), &mut processor).unwrap();
        assert_eq!(processor.command_names(), vec!["help", "n"]);
    }
}
