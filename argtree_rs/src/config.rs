//! Dispatcher configuration.
//!
//! Loads optional `.argtree/config.toml` from a project root.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// How a value-taking shortcut inside a `-abc` cluster finds its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMode {
    /// Values are taken from the queue after the whole cluster (`-jS 4 9`).
    #[default]
    Queue,
    /// getopt style: the rest of the cluster is the value (`-j4`), falling
    /// back to the next token when nothing follows the flag.
    Attached,
}

/// Policy knobs shared by every processor of a tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Program name printed on the help usage line
    pub program: String,
    /// Value lookup for clustered short options
    pub short_clusters: ClusterMode,
    /// Exit with status 0 after printing help
    pub strict_help: bool,
    /// Turn unrecognized commands into errors instead of diagnostics
    pub strict_commands: bool,
    /// Suggest the closest command name for typos
    pub suggest_commands: bool,
    /// Appended to every shell prompt
    pub prompt_suffix: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            program: "<program>".to_string(),
            short_clusters: ClusterMode::Queue,
            strict_help: false,
            strict_commands: false,
            suggest_commands: true,
            prompt_suffix: ">> ".to_string(),
        }
    }
}

impl DispatchConfig {
    /// Load config from `.argtree/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".argtree").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}
