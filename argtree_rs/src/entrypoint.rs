//! CLI entry point shared by the `argtree` binary.
//!
//! Loads the dispatcher configuration, builds the workbench tree and feeds
//! it the process arguments.

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::builder::TreeBuilder;
use crate::config::DispatchConfig;
use crate::workbench::Workbench;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "ARGTREE_CONFIG";

/// Options controlling binary-specific behavior.
pub struct EntryOptions {
    /// Program name shown on the help usage line unless the config sets one.
    pub binary_name: &'static str,
    /// Prompt of the root shell.
    pub prompt: &'static str,
}

/// Run the CLI with the given options. This is the shared main() body.
pub fn run(opts: &EntryOptions) -> anyhow::Result<()> {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    let mut config = load_config();
    if config.program == DispatchConfig::default().program {
        config.program = opts.binary_name.to_string();
    }
    debug!(?config, args = ?raw_args, "starting dispatch");

    let processor = TreeBuilder::with_config(config)
        .build_shell::<Workbench>(opts.prompt)
        .context("failed to build the command tree")?;

    let mut workbench = Workbench::default();
    processor.process_args(raw_args, &mut workbench)?;
    Ok(())
}

fn load_config() -> DispatchConfig {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return DispatchConfig::load_from_path(Path::new(&path));
    }
    std::env::current_dir()
        .map(|cwd| DispatchConfig::load(&cwd))
        .unwrap_or_default()
}
