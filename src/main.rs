//! Markpad - a markdown editor with live preview and cloud round-tripping.
//!
//! # Usage
//!
//! ```bash
//! markpad
//! markpad notes.md
//! markpad --memory --remote-url http://localhost:3000
//! markpad --offline
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use markpad::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use markpad::editor::Engine;
use markpad::remote::{HttpRemoteStore, MemoryRemote, RemoteStore};
use markpad::shell::{Shell, read_import};
use markpad::store::{FileStore, MemoryStore, PersistenceStore};

/// A markdown editor with live preview and cloud round-tripping
#[derive(Parser, Debug)]
#[command(name = "markpad", version, about, long_about = None)]
struct Cli {
    /// Markdown file to import at startup
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Directory holding the locally persisted document
    #[arg(long, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Base URL of the remote store
    #[arg(long, value_name = "URL")]
    remote_url: Option<String>,

    /// Quiet period before persisting edits, in milliseconds
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Keep the document in memory only for this session
    #[arg(long)]
    memory: bool,

    /// Keep cloud saves in memory instead of contacting the remote store
    #[arg(long)]
    offline: bool,

    /// Log debug events to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.verbose);

    let store: Box<dyn PersistenceStore> = if effective.memory {
        Box::new(MemoryStore::new())
    } else {
        let dir = effective
            .store_dir
            .clone()
            .unwrap_or_else(FileStore::default_dir);
        tracing::debug!(dir = %dir.display(), "using file store");
        Box::new(FileStore::new(dir))
    };
    let file = cli.file.as_deref().map(read_import).transpose()?;
    if effective.offline {
        tracing::debug!("using in-memory remote store");
        run_session(store, MemoryRemote::new(), &effective, file)
    } else {
        let remote = HttpRemoteStore::new(effective.remote_url())
            .with_context(|| format!("Invalid remote URL {}", effective.remote_url()))?;
        run_session(store, remote, &effective, file)
    }
}

fn run_session<R: RemoteStore>(
    store: Box<dyn PersistenceStore>,
    remote: R,
    flags: &ConfigFlags,
    initial: Option<String>,
) -> Result<()> {
    let engine = Engine::new(store, remote).with_debounce(flags.debounce());
    if let Some(text) = initial {
        engine.import_from_file(text);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    eprintln!("markpad: type :help for commands");
    let mut shell = Shell::new(&engine, std::io::stdout());
    runtime
        .block_on(shell.run(tokio::io::BufReader::new(tokio::io::stdin())))
        .context("Application error")
}
