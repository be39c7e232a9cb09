use std::any::Any;
use std::panic;

use argtree::entrypoint::{EntryOptions, run};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

/// Log filter directives for the binary, e.g. `ARGTREE_LOG=argtree=debug`.
const LOG_ENV: &str = "ARGTREE_LOG";

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = <dyn Any>::downcast_ref::<&str>(payload)
            .is_some_and(|s| s.contains("Broken pipe"))
            || <dyn Any>::downcast_ref::<String>(payload)
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            // Downstream closed the pipe (e.g. `argtree show | head`).
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn main() {
    install_broken_pipe_handler();
    init_tracing();

    let result = run(&EntryOptions {
        binary_name: "argtree",
        prompt: "workbench",
    });
    if let Err(err) = result {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
