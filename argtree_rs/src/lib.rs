//! # argtree
//!
//! **Tree-structured command dispatcher** - typed options, nested commands,
//! method-style actions and interactive shells, declared once per state type.
//!
//! ## Features
//!
//! - **Typed options** - `--key value`, `-k value` and clusters like `-vj 4`
//!   written straight into fields of your state
//! - **Nested commands** - each command owns a narrowed slice of the state
//!   and its own options
//! - **Actions** - closures over positional and named parameters
//! - **Shells** - any node can drop into a read-eval loop that keeps state
//!   between lines
//! - **Suggestions** - "did you mean" hints for mistyped commands
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use argtree::{Describe, ParamList, Schema, TreeBuilder};
//!
//! #[derive(Default)]
//! struct App {
//!     verbose: bool,
//!     jobs: i32,
//! }
//!
//! impl Describe for App {
//!     fn describe(schema: &mut Schema<Self>) {
//!         schema.option("verbose", |a: &mut App| &mut a.verbose);
//!         schema.option("jobs", |a: &mut App| &mut a.jobs);
//!         schema.action(
//!             "greet",
//!             ParamList::new().positional::<String>("name"),
//!             |_, params| {
//!                 println!("Hello, {}!", params.get::<String>("name")?);
//!                 Ok(())
//!             },
//!         );
//!     }
//! }
//!
//! let processor = TreeBuilder::new().build_shell::<App>("app").unwrap();
//! let mut app = App::default();
//! processor
//!     .process_args(std::env::args().skip(1), &mut app)
//!     .unwrap();
//! ```
//!
//! ## CLI Usage
//!
//! The `argtree` binary drives the [`workbench`] tree:
//!
//! ```bash
//! argtree -vj 4 build --target wasm32 --release
//! argtree greet --count 2 ada
//! argtree server --port 9000 start
//! argtree                      # opens the workbench>> shell
//! ```

pub mod binding;
pub mod builder;
pub mod config;
pub mod entrypoint;
pub mod error;
pub mod processor;
pub mod queue;
pub mod shell;
pub mod value;
pub mod workbench;

pub use binding::{OptionTable, SlotAccessor, SlotBinding, SlotKind};
pub use builder::{Describe, ParamList, Params, Schema, TreeBuilder};
pub use config::{ClusterMode, DispatchConfig};
pub use error::{ArgError, Result};
pub use processor::{CommandHandler, CommandProcessor, DefaultHandler};
pub use queue::TokenQueue;
pub use shell::ShellLoop;
pub use value::{ParamValue, SlotValue, Value, ValueType};
