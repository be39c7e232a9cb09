//! The workbench: a small application tree driven by the `argtree` binary.
//!
//! It exercises every kind of slot the builder knows about: typed root
//! options, a plain sub-command with its own options and fallback, a shell
//! sub-tree, raw leaves and two synthesized actions.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::{Describe, ParamList, Schema};

#[derive(Debug, Default, Serialize)]
pub struct Workbench {
    pub verbose: bool,
    pub jobs: i32,
    pub seed: i64,
    pub ratio: f64,
    pub label: String,
    pub manifest: Option<PathBuf>,
    pub last_greeting: Option<String>,
    pub build: BuildCommand,
    pub server: ServerConsole,
}

impl Describe for Workbench {
    fn describe(schema: &mut Schema<Self>) {
        schema.option("verbose", |w: &mut Workbench| &mut w.verbose);
        schema.option("jobs", |w: &mut Workbench| &mut w.jobs);
        schema.option("seed", |w: &mut Workbench| &mut w.seed).short('S');
        schema.option("ratio", |w: &mut Workbench| &mut w.ratio);
        schema.option("label", |w: &mut Workbench| &mut w.label);
        schema
            .option("manifest", |w: &mut Workbench| &mut w.manifest)
            .must_exist();

        schema.command("build", |w: &mut Workbench| &mut w.build);
        schema.shell("server", |w: &mut Workbench| &mut w.server);

        schema.leaf("show", |_, workbench: &mut Workbench| {
            let json = serde_json::to_string_pretty(&*workbench).map_err(anyhow::Error::from)?;
            println!("{}", json);
            Ok(())
        });

        let greet = ParamList::new()
            .positional::<String>("name")
            .named_with_shortcut::<i32>("count", "count", 'n')
            .named::<bool>("shout", "shout");
        schema.action("greet", greet, |workbench, params| {
            let name: String = params.get("name")?;
            if name.is_empty() {
                anyhow::bail!("greet needs a name");
            }
            let mut greeting = format!("Hello, {}!", name);
            if params.get::<bool>("shout")? {
                greeting = greeting.to_uppercase();
            }
            for _ in 0..params.get::<i32>("count")?.max(1) {
                println!("{}", greeting);
            }
            workbench.last_greeting = Some(greeting);
            Ok(())
        });

        let sum = ParamList::new().positional::<f64>("a").positional::<f64>("b");
        schema.action("sum", sum, |_, params| {
            let a: f64 = params.get("a")?;
            let b: f64 = params.get("b")?;
            println!("{}", a + b);
            Ok(())
        });
    }
}

#[derive(Debug, Serialize)]
pub struct BuildCommand {
    pub target: String,
    pub release: bool,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            target: "native".to_string(),
            release: false,
        }
    }
}

impl BuildCommand {
    fn profile(&self) -> &'static str {
        if self.release { "release" } else { "debug" }
    }

    fn summary(&self) -> String {
        format!("build: target={} profile={}", self.target, self.profile())
    }
}

impl Describe for BuildCommand {
    fn describe(schema: &mut Schema<Self>) {
        schema.option("target", |b: &mut BuildCommand| &mut b.target);
        schema.option("release", |b: &mut BuildCommand| &mut b.release);

        schema.leaf("plan", |_, build: &mut BuildCommand| {
            println!("plan: compile {} for {}", build.profile(), build.target);
            Ok(())
        });

        // A bare `build` runs the build; stray words are still reported.
        schema.fallback(|_, queue, build: &mut BuildCommand| {
            if let Some(extra) = queue.peek() {
                eprintln!("Unrecognized command: {}", extra);
                return Ok(());
            }
            println!("{}", build.summary());
            Ok(())
        });
    }
}

#[derive(Debug, Serialize)]
pub struct ServerConsole {
    pub host: String,
    pub port: i32,
    pub running: bool,
}

impl Default for ServerConsole {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            running: false,
        }
    }
}

impl Describe for ServerConsole {
    fn describe(schema: &mut Schema<Self>) {
        schema.option("host", |s: &mut ServerConsole| &mut s.host);
        schema.option("port", |s: &mut ServerConsole| &mut s.port);

        schema.leaf("start", |_, server: &mut ServerConsole| {
            server.running = true;
            println!("server listening on {}:{}", server.host, server.port);
            Ok(())
        });
        schema.leaf("status", |_, server: &mut ServerConsole| {
            let state = if server.running { "running" } else { "stopped" };
            println!("server {} ({}:{})", state, server.host, server.port);
            Ok(())
        });
    }
}
