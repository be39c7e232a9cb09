//! Help text for the built-in `help` command.

use std::io::{self, Write};

use super::CommandProcessor;

impl<S: 'static> CommandProcessor<S> {
    /// Render the option and command listing of this processor.
    ///
    /// Options are listed by key, commands by name; both come from
    /// ordered maps so the text is stable between calls.
    pub fn help_text(&self) -> String {
        let mut help = String::new();
        help.push_str(&format!(
            "Usage:  {} [ <options> ] <command> <args>\n",
            self.config.program
        ));

        help.push_str("\nOptions:\n");
        for binding in self.options.bindings() {
            let flag = match self.options.shortcut_of(binding.key()) {
                Some(shortcut) => format!("-{}, --{}", shortcut, binding.key()),
                None => format!("    --{}", binding.key()),
            };
            if !binding.value_type().takes_value() {
                help.push_str(&format!("{}\n", flag));
            } else {
                help.push_str(&format!("{} <{}>\n", flag, binding.value_type()));
            }
        }

        help.push_str("\nCommands:\n");
        for name in self.command_names() {
            help.push_str(&format!("{}\n", name));
        }
        help
    }

    pub(super) fn print_help(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", self.help_text())?;
        stdout.flush()?;
        if self.config.strict_help {
            std::process::exit(0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::binding::SlotBinding;
    use crate::config::DispatchConfig;
    use crate::processor::{CommandHandler, CommandProcessor};
    use crate::shell::ShellLoop;

    #[derive(Default)]
    struct Server {
        port: i32,
        host: String,
        daemon: bool,
    }

    fn processor() -> CommandProcessor<Server> {
        let config = DispatchConfig::default().with_program("srv");
        let mut processor = CommandProcessor::with_shell(config, ShellLoop::new("srv")).unwrap();
        processor
            .add_option(SlotBinding::field("port", |s: &mut Server| &mut s.port))
            .unwrap();
        processor
            .add_option(SlotBinding::field("host", |s: &mut Server| &mut s.host).without_shortcut())
            .unwrap();
        processor
            .add_option(SlotBinding::field("daemon", |s: &mut Server| &mut s.daemon))
            .unwrap();
        processor
            .add_command("start", CommandHandler::leaf(|_, _| Ok(())))
            .unwrap();
        processor
    }

    #[test]
    fn test_help_lists_options_and_commands() {
        let help = processor().help_text();
        let expected = "Usage:  srv [ <options> ] <command> <args>\n\
                        \n\
                        Options:\n\
                        -d, --daemon\n    \
                        --host <string>\n\
                        -p, --port <int>\n\
                        -$, --shell\n\
                        \n\
                        Commands:\n\
                        help\n\
                        start\n";
        assert_eq!(help, expected);
    }

    #[test]
    fn test_help_is_stable() {
        let processor = processor();
        let first = processor.help_text();
        let second = processor.help_text();
        assert_eq!(first, second);
        assert_eq!(processor.options().len(), 4);
        assert_eq!(processor.command_names(), vec!["help", "start"]);
    }
}
