//! Interactive shell bound to one processor.
//!
//! Each input line is split on whitespace and handed back to the owning
//! [`CommandProcessor`] together with the same state object, so option
//! values set on one line stay visible on the next.

use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, Write};

use tracing::{debug, error};

use crate::processor::CommandProcessor;
use crate::queue::TokenQueue;

/// Where shell lines come from.
enum Input {
    /// The process-wide stdin buffer, shared by nested shells.
    Stdin,
    Reader(RefCell<Box<dyn BufRead>>),
}

pub struct ShellLoop {
    prompt: String,
    running: Cell<bool>,
    exit: Cell<bool>,
    exit_registered: Cell<bool>,
    input: Input,
    output: RefCell<Box<dyn Write>>,
}

impl ShellLoop {
    /// Shell reading stdin and prompting on stdout.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::build(prompt, Input::Stdin, io::stdout())
    }

    pub fn with_io(
        prompt: impl Into<String>,
        input: impl BufRead + 'static,
        output: impl Write + 'static,
    ) -> Self {
        Self::build(prompt, Input::Reader(RefCell::new(Box::new(input))), output)
    }

    fn build(prompt: impl Into<String>, input: Input, output: impl Write + 'static) -> Self {
        Self {
            prompt: prompt.into(),
            running: Cell::new(false),
            exit: Cell::new(false),
            exit_registered: Cell::new(false),
            input,
            output: RefCell::new(Box::new(output)),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// `exit` becomes a command the first time the loop starts.
    pub fn exit_registered(&self) -> bool {
        self.exit_registered.get()
    }

    pub(crate) fn request_exit(&self) {
        self.exit.set(true);
    }

    /// Read and dispatch lines until end of input or `exit`.
    ///
    /// Returns immediately if this loop is already running further up the
    /// call stack. Errors from a single line are reported and the loop
    /// moves on to the next one.
    pub fn run<S: 'static>(&self, processor: &CommandProcessor<S>, state: &mut S) {
        if self.running.replace(true) {
            debug!(prompt = %self.prompt, "shell already running");
            return;
        }
        self.exit_registered.set(true);
        self.exit.set(false);
        debug!(prompt = %self.prompt, "entering shell");

        let suffix = &processor.config().prompt_suffix;
        while !self.exit.get() {
            if let Err(err) = self.write_prompt(suffix) {
                error!(%err, "failed to write shell prompt");
                break;
            }
            let line = match self.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    error!(%err, "failed to read shell input");
                    break;
                }
            };

            let mut queue = TokenQueue::from_line(&line);
            if let Err(err) = processor.process(&mut queue, state) {
                debug!(%err, line = %line.trim_end(), "shell command failed");
                eprintln!("{}", err);
            }
        }

        debug!(prompt = %self.prompt, "leaving shell");
        self.running.set(false);
    }

    fn write_prompt(&self, suffix: &str) -> io::Result<()> {
        let mut output = self.output.borrow_mut();
        write!(output, "{}{}", self.prompt, suffix)?;
        output.flush()
    }

    fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = match &self.input {
            Input::Stdin => io::stdin().read_line(&mut line)?,
            Input::Reader(reader) => reader.borrow_mut().read_line(&mut line)?,
        };
        match read {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::SlotBinding;
    use crate::config::DispatchConfig;
    use crate::processor::CommandHandler;
    use std::io::Cursor;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    #[derive(Debug, Default)]
    struct Counter {
        jobs: i32,
        bumps: u32,
    }

    fn shell_processor(input: &str) -> (CommandProcessor<Counter>, Capture) {
        let capture = Capture::default();
        let shell = ShellLoop::with_io("count", Cursor::new(input.to_string()), capture.clone());
        let mut processor = CommandProcessor::with_shell(DispatchConfig::default(), shell).unwrap();
        processor
            .add_option(SlotBinding::field("jobs", |c: &mut Counter| &mut c.jobs))
            .unwrap();
        processor
            .add_command(
                "bump",
                CommandHandler::leaf(|_, c: &mut Counter| {
                    c.bumps += 1;
                    Ok(())
                }),
            )
            .unwrap();
        (processor, capture)
    }

    #[test]
    fn test_state_persists_between_lines() {
        let (processor, capture) = shell_processor("--jobs 3\nbump\n\nbump\n");
        let mut counter = Counter::default();
        processor.process_args(Vec::<String>::new(), &mut counter).unwrap();

        assert_eq!(counter.jobs, 3);
        assert_eq!(counter.bumps, 2);
        // One prompt per line plus the one answered by end of input.
        assert_eq!(capture.text().matches("count>> ").count(), 5);
        assert!(!processor.shell().unwrap().is_running());
    }

    #[test]
    fn test_exit_stops_the_loop() {
        let (processor, _) = shell_processor("bump\nexit\nbump\n");
        let mut counter = Counter::default();
        processor.process_args(Vec::<String>::new(), &mut counter).unwrap();
        assert_eq!(counter.bumps, 1);
    }

    #[test]
    fn test_errors_do_not_end_the_shell() {
        let (processor, _) = shell_processor("--jobs lots\nbump\n--jobs\nbump\n");
        let mut counter = Counter::default();
        processor.process_args(Vec::<String>::new(), &mut counter).unwrap();
        assert_eq!(counter.jobs, 0);
        assert_eq!(counter.bumps, 2);
    }

    #[test]
    fn test_nested_process_does_not_start_second_loop() {
        // Every line calls back into `process`, which would start another
        // loop without the running guard and print extra prompts on unwind.
        let (processor, capture) = shell_processor("bump\nbump\n");
        let mut counter = Counter::default();
        processor.process_args(Vec::<String>::new(), &mut counter).unwrap();
        assert_eq!(counter.bumps, 2);
        assert_eq!(capture.text().matches("count>> ").count(), 3);
    }

    #[test]
    fn test_exit_is_registered_lazily() {
        let (processor, _) = shell_processor("exit\n");
        assert!(!processor.command_names().contains(&"exit".to_string()));

        let mut counter = Counter::default();
        processor.process_args(Vec::<String>::new(), &mut counter).unwrap();
        assert!(processor.command_names().contains(&"exit".to_string()));
    }

    #[test]
    fn test_shell_flag_enters_shell_after_command() {
        let (processor, capture) = shell_processor("bump\n");
        let mut counter = Counter::default();
        processor.process_args(["-$", "bump"], &mut counter).unwrap();
        assert_eq!(counter.bumps, 2);
        assert!(capture.text().contains("count>> "));
    }

    #[test]
    fn test_shell_flag_does_not_outlive_its_call() {
        let (processor, capture) = shell_processor("bump\n");
        let mut counter = Counter::default();
        processor.process_args(["-$", "bump"], &mut counter).unwrap();
        assert_eq!(counter.bumps, 2);
        assert_eq!(capture.text().matches("count>> ").count(), 2);

        processor.process_args(["bump"], &mut counter).unwrap();
        assert_eq!(counter.bumps, 3);
        assert_eq!(capture.text().matches("count>> ").count(), 2);
    }

    #[test]
    fn test_command_without_shell_flag_skips_shell() {
        let (processor, capture) = shell_processor("bump\n");
        let mut counter = Counter::default();
        processor.process_args(["bump"], &mut counter).unwrap();
        assert_eq!(counter.bumps, 1);
        assert!(capture.text().is_empty());
    }

    #[test]
    fn test_shell_can_be_reentered_after_exit() {
        let (processor, _) = shell_processor("exit\nbump\nexit\n");
        let mut counter = Counter::default();
        processor.process_args(Vec::<String>::new(), &mut counter).unwrap();
        assert_eq!(counter.bumps, 0);
        processor.process_args(Vec::<String>::new(), &mut counter).unwrap();
        assert_eq!(counter.bumps, 1);
    }
}
