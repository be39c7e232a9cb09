//! The command processor: a token-dispatch state machine over one level of
//! the command tree.
//!
//! # Dispatch
//!
//! ```text
//! ┌──────────────┐   --key / -abc    ┌──────────────┐
//! │  TokenQueue  │ ────────────────▶ │ OptionTable  │──▶ state mutated in place
//! └──────┬───────┘                   └──────────────┘
//!        │ bare token
//!        ▼
//! ┌──────────────┐  match   ┌─────────────────────────────────────────┐
//! │ CommandTable │ ───────▶ │ leaf action / child processor (+ slot)  │──▶ return
//! └──────┬───────┘          └─────────────────────────────────────────┘
//!        │ no match / queue empty
//!        ▼
//!   default handler ──▶ shell loop (if any)
//! ```
//!
//! A processor runs at most one command per [`CommandProcessor::process`]
//! call: once a command token matches, the rest of the queue belongs to
//! that command.

mod handler;
mod help;
mod suggest;

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::binding::{OptionTable, SlotBinding};
use crate::config::DispatchConfig;
use crate::error::{ArgError, Result};
use crate::queue::TokenQueue;
use crate::shell::ShellLoop;
use crate::value::ValueType;

pub use handler::{Action, ChildProcessor, CommandHandler, DefaultHandler, Delegate, Fallback};
pub use suggest::suggest_similar_command;

/// Built-in command listing options and commands.
pub const HELP_COMMAND: &str = "help";
/// Built-in command leaving the shell; available once a shell has started.
pub const EXIT_COMMAND: &str = "exit";
/// Built-in option of shell-enabled processors.
pub const SHELL_OPTION: &str = "shell";
pub const SHELL_SHORTCUT: char = '$';

enum CommandEntry<S> {
    Help,
    Handler(CommandHandler<S>),
}

pub struct CommandProcessor<S> {
    options: OptionTable<S>,
    commands: BTreeMap<String, CommandEntry<S>>,
    default: Option<DefaultHandler<S>>,
    shell: Option<ShellLoop>,
    enter_shell: Rc<Cell<bool>>,
    config: DispatchConfig,
}

impl<S: 'static> CommandProcessor<S> {
    pub fn new(config: DispatchConfig) -> Self {
        let mut commands = BTreeMap::new();
        commands.insert(HELP_COMMAND.to_string(), CommandEntry::Help);
        Self {
            options: OptionTable::new(),
            commands,
            default: None,
            shell: None,
            enter_shell: Rc::new(Cell::new(false)),
            config,
        }
    }

    /// A processor that falls into `shell` when no command runs, or after
    /// a command when `--shell` / `-$` was given.
    pub fn with_shell(config: DispatchConfig, shell: ShellLoop) -> Result<Self> {
        let mut processor = Self::new(config);
        let flag = Rc::clone(&processor.enter_shell);
        let binding = SlotBinding::new(
            SHELL_OPTION,
            ValueType::Bool,
            Box::new(move |_: &mut S, _| {
                flag.set(true);
                Ok(())
            }),
        )
        .with_shortcut(SHELL_SHORTCUT);
        processor.options.insert(binding)?;
        processor.shell = Some(shell);
        Ok(processor)
    }

    pub fn add_option(&mut self, binding: SlotBinding<S>) -> Result<()> {
        self.options.insert(binding)
    }

    pub fn add_command(&mut self, key: impl Into<String>, handler: CommandHandler<S>) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(ArgError::configuration("command key must not be empty"));
        }
        if key.starts_with('-') {
            return Err(ArgError::configuration(format!(
                "command '{}' would be read as an option",
                key
            )));
        }
        if key == HELP_COMMAND {
            return Err(ArgError::configuration("'help' is a reserved command"));
        }
        if self.commands.contains_key(&key) {
            return Err(ArgError::configuration(format!(
                "command '{}' is registered twice",
                key
            )));
        }
        self.commands.insert(key, CommandEntry::Handler(handler));
        Ok(())
    }

    pub fn set_default(&mut self, handler: DefaultHandler<S>) {
        self.default = Some(handler);
    }

    pub fn options(&self) -> &OptionTable<S> {
        &self.options
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn shell(&self) -> Option<&ShellLoop> {
        self.shell.as_ref()
    }

    /// Command names resolvable right now, sorted.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        if self.exit_available() && !self.commands.contains_key(EXIT_COMMAND) {
            names.push(EXIT_COMMAND.to_string());
            names.sort();
        }
        names
    }

    /// Convenience wrapper over [`process`](Self::process) for plain argument lists.
    pub fn process_args<I, T>(&self, args: I, state: &mut S) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut queue: TokenQueue = args.into_iter().collect();
        self.process(&mut queue, state)
    }

    /// Consume leading options, then dispatch at most one command.
    pub fn process(&self, queue: &mut TokenQueue, state: &mut S) -> Result<()> {
        // `--shell` only applies to the call that saw it.
        self.enter_shell.set(false);
        while let Some(token) = queue.peek().map(str::to_owned) {
            if token.starts_with('-') {
                queue.remove();
                self.apply_flag(&token, queue, state)?;
                continue;
            }

            if token == EXIT_COMMAND && self.exit_available() {
                queue.remove();
                if let Some(shell) = &self.shell {
                    shell.request_exit();
                }
                return Ok(());
            }

            let Some(entry) = self.commands.get(&token) else {
                break;
            };
            queue.remove();
            debug!(command = %token, remaining = queue.len(), "dispatching command");
            match entry {
                CommandEntry::Help => self.print_help()?,
                CommandEntry::Handler(handler) => handler.invoke(queue, state)?,
            }
            if self.enter_shell.get() {
                self.run_shell(state);
            }
            return Ok(());
        }

        match &self.default {
            Some(DefaultHandler::Unrecognized) => self.report_unrecognized(queue)?,
            Some(DefaultHandler::Custom(fallback)) => fallback(self, queue, state)?,
            None => {}
        }
        self.run_shell(state);
        Ok(())
    }

    /// Route one `-`/`--` token, already removed from the queue, through
    /// this processor's option table.
    pub fn apply_flag(&self, token: &str, queue: &mut TokenQueue, state: &mut S) -> Result<()> {
        self.options
            .dispatch(token, queue, state, self.config.short_clusters)
    }

    fn exit_available(&self) -> bool {
        self.shell.as_ref().is_some_and(ShellLoop::exit_registered)
    }

    fn run_shell(&self, state: &mut S) {
        if let Some(shell) = &self.shell {
            shell.run(self, state);
        }
    }

    fn report_unrecognized(&self, queue: &TokenQueue) -> Result<()> {
        let Some(command) = queue.peek() else {
            return Ok(());
        };
        let suggestion = if self.config.suggest_commands {
            suggest_similar_command(command, &self.command_names())
        } else {
            None
        };

        if self.config.strict_commands {
            return Err(ArgError::UnrecognizedCommand {
                command: command.to_string(),
                suggestion,
            });
        }

        eprintln!("Unrecognized command: {}", command);
        if let Some(name) = suggestion {
            eprintln!("  did you mean '{}'?", name);
        }
        Ok(())
    }
}
