//! # michi
//!
//! Command-line front end for the memory engine. Host tools call it from
//! their session hooks; results go to stdout, logs to stderr.

#![deny(unsafe_code)]

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use michi_core::MemPaths;
use michi_diary::{DiaryWriter, EntryContent, EntryContext, RetentionSweeper};
use michi_hooks::{CaptureTrigger, SessionStateStore, on_session_end};
use michi_memory::{PassOutcome, Reflector};
use michi_settings::{Config, ConfigStore};
use tracing_subscriber::EnvFilter;

/// Session diary and reflection memory.
#[derive(Parser, Debug)]
#[command(name = "michi", version, about = "Session diary and reflection memory")]
struct Cli {
    /// Memory root (defaults to $MICHI_MEM_HOME, then ~/.michi-mem).
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a diary entry from JSON content; prints the new entry id.
    Entry {
        /// Read content from this file instead of stdin.
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Do not fill project and branch from the working directory.
        #[arg(long)]
        no_context: bool,
    },
    /// Show unprocessed entries against the auto-reflect threshold.
    Status,
    /// Reflect on unprocessed entries once the threshold is reached.
    Reflect {
        /// Reflect even below the threshold.
        #[arg(long)]
        force: bool,
    },
    /// Delete entries older than the retention window.
    Cleanup,
    /// Record a completed turn; prints whether to prompt for capture.
    Turn {
        /// Host session id.
        #[arg(long)]
        session: String,
    },
    /// Clear session state and run cleanup.
    SessionEnd {
        /// Host session id.
        #[arg(long)]
        session: String,
    },
}

fn init_logging(verbose: u8, json: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolved locations plus lazily loaded configuration.
struct App {
    paths: MemPaths,
    config: ConfigStore,
}

impl App {
    fn new(home: Option<PathBuf>) -> Self {
        let paths = home.map_or_else(MemPaths::from_env, MemPaths::new);
        let config = ConfigStore::new(paths.config_path());
        Self { paths, config }
    }

    fn config(&self) -> Result<&Config> {
        self.config
            .get()
            .with_context(|| format!("Failed to load config: {}", self.config.path().display()))
    }

    fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Entry { file, no_context } => self.entry(file.as_deref(), no_context),
            Command::Status => self.status(),
            Command::Reflect { force } => self.reflect(force),
            Command::Cleanup => self.cleanup(),
            Command::Turn { session } => self.turn(&session),
            Command::SessionEnd { session } => self.session_end(&session),
        }
    }

    fn entry(&self, file: Option<&Path>, no_context: bool) -> Result<()> {
        let raw = match file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read entry content: {}", path.display()))?,
            None => {
                let mut buf = String::new();
                let _ = std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read entry content from stdin")?;
                buf
            }
        };
        let mut content: EntryContent =
            serde_json::from_str(&raw).context("Entry content is not valid JSON")?;
        if !no_context {
            let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
            EntryContext::detect(&cwd).apply_to(&mut content);
        }
        if content.is_empty() {
            tracing::warn!("recording an entry with no summary or sections");
        }

        let id = DiaryWriter::new(self.paths.diary_dir())
            .create_entry(&content)
            .context("Failed to write diary entry")?;
        println!("{id}");
        Ok(())
    }

    fn status(&self) -> Result<()> {
        let threshold = self.config()?.auto_reflect_threshold;
        let status = Reflector::new(&self.paths).status(threshold)?;
        println!("{}", serde_json::to_string(&status)?);
        Ok(())
    }

    fn reflect(&self, force: bool) -> Result<()> {
        let reflector = Reflector::new(&self.paths);
        if !force {
            let status = reflector.status(self.config()?.auto_reflect_threshold)?;
            if !status.should_reflect {
                println!(
                    "not due: {} pending, threshold {}",
                    status.pending, status.threshold
                );
                return Ok(());
            }
        }

        match reflector.run().context("Reflection pass failed")? {
            PassOutcome::NothingToDo => println!("nothing to do"),
            PassOutcome::Reflected(pass) => {
                if let Err(first) = &pass.marking {
                    tracing::warn!(error = %first, "retrying ledger append once");
                    reflector
                        .mark_processed(&pass.reflection.sources)
                        .with_context(|| {
                            format!(
                                "Reflection {} written to {} but its entries were not marked processed",
                                pass.reflection.id,
                                pass.path.display()
                            )
                        })?;
                }
                println!("{}", pass.path.display());
            }
        }
        Ok(())
    }

    fn cleanup(&self) -> Result<()> {
        let retention_days = self.config()?.retention_days;
        let result = RetentionSweeper::new(self.paths.diary_dir())
            .with_state_dir(self.paths.state_dir())
            .sweep(retention_days);
        let report = match &result {
            Ok(report) => Some(*report),
            Err(e) => e.partial_report(),
        };
        if let Some(report) = report {
            println!("{}", serde_json::to_string(&report)?);
        }
        let _ = result.context("Retention sweep failed")?;
        Ok(())
    }

    fn turn(&self, session: &str) -> Result<()> {
        if session.is_empty() {
            bail!("--session must not be empty");
        }
        let store = SessionStateStore::new(self.paths.state_dir());
        let trigger = CaptureTrigger::new(store, self.config()?);
        let prompt = trigger
            .on_turn(session)
            .with_context(|| format!("Failed to record turn for session {session}"))?;
        println!("{prompt}");
        Ok(())
    }

    fn session_end(&self, session: &str) -> Result<()> {
        let report = on_session_end(&self.paths, self.config()?, session);
        println!("{}", serde_json::to_string(&report)?);
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let app = App::new(cli.home);
    tracing::debug!(root = %app.paths.root().display(), "resolved memory root");
    app.run(cli.command)
}
