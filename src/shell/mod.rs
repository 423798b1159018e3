//! Line-oriented front end that forwards commands to the [`Engine`].
//!
//! Lines starting with `:` are commands; any other line is appended to the
//! document as an edit. The loop waits on input, on the remote call in
//! flight and on the engine's persistence deadline at the same time, so
//! debounced writes happen while the user is idle and edits keep landing
//! while a push or pull is outstanding.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::document::is_suggested_import;
use crate::editor::{Engine, EngineError, LoadOutcome};
use crate::remote::{RecordId, RemoteStore};
use crate::store::PersistenceStore;

const HELP: &str = "\
Commands:
  :open PATH     import a markdown file
  :write [PATH]  export the document (default document.md)
  :push          save to the cloud
  :pull [ID]     load from the cloud (default: last id)
  :set TEXT      replace the whole document
  :render        print the rendered HTML
  :show          print the markdown source
  :status        show busy/pending state
  :help          show this help
  :quit          exit
Any other line is appended to the document.";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append a line of text to the document
    Append(String),
    /// Replace the whole document
    Set(String),
    Open(PathBuf),
    Write(Option<PathBuf>),
    Push,
    Pull(Option<String>),
    Render,
    Show,
    Status,
    Help,
    Quit,
    Unknown(String),
}

/// Parse one input line into a [`Command`].
pub fn parse_command(line: &str) -> Command {
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Append(line.to_string());
    };
    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(name, arg)| (name, arg.trim()));
    let arg = (!arg.is_empty()).then(|| arg.to_string());

    match (name, arg) {
        ("open" | "o", Some(path)) => Command::Open(PathBuf::from(path)),
        ("write" | "w", path) => Command::Write(path.map(PathBuf::from)),
        ("push", None) => Command::Push,
        ("pull", id) => Command::Pull(id),
        ("set", text) => Command::Set(text.unwrap_or_default()),
        ("render", None) => Command::Render,
        ("show", None) => Command::Show,
        ("status", None) => Command::Status,
        ("help" | "h", None) => Command::Help,
        ("quit" | "q", None) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Read a file for import. Extensions other than `.md`/`.txt` are accepted.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_import(path: &Path) -> Result<String> {
    if !is_suggested_import(path) {
        tracing::debug!(path = %path.display(), "importing file with unusual extension");
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("{} is not UTF-8 text", path.display()))
}

/// Outcome of a remote call started by `:push` or `:pull`.
enum RemoteReply {
    Saved(Result<RecordId, EngineError>),
    Loaded(Result<LoadOutcome, EngineError>),
}

type RemoteTask<'a> = Pin<Box<dyn Future<Output = RemoteReply> + 'a>>;

/// Drives an [`Engine`] from text input, writing replies to `out`.
///
/// At most one remote call is kept in flight; input keeps being processed
/// while it runs.
pub struct Shell<'a, S, R, W> {
    engine: &'a Engine<S, R>,
    out: W,
    remote: Option<RemoteTask<'a>>,
}

impl<'a, S, R, W> Shell<'a, S, R, W>
where
    S: PersistenceStore + 'a,
    R: RemoteStore + 'a,
    W: Write,
{
    pub const fn new(engine: &'a Engine<S, R>, out: W) -> Self {
        Self {
            engine,
            out,
            remote: None,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Process `input` until it ends or `:quit`, then flush pending writes.
    ///
    /// A remote call still in flight when input ends is awaited; `:quit`
    /// abandons it. Pending content is flushed on every exit path.
    ///
    /// # Errors
    /// Returns an error if reading input or writing output fails. Engine
    /// failures and lines that are not UTF-8 are reported to `out` and do
    /// not end the loop.
    #[allow(clippy::future_not_send)]
    pub async fn run<I: AsyncBufRead + Unpin>(&mut self, input: I) -> Result<()> {
        let result = self.process(input).await;
        self.remote = None;
        self.engine.flush();
        result
    }

    #[allow(clippy::future_not_send)]
    async fn process<I: AsyncBufRead + Unpin>(&mut self, input: I) -> Result<()> {
        let mut lines = input.lines();
        let mut input_open = true;
        while input_open || self.remote.is_some() {
            let deadline = self.engine.persistence_deadline();
            tokio::select! {
                biased;
                reply = wait_remote(&mut self.remote) => {
                    self.remote = None;
                    self.report(reply)?;
                }
                line = lines.next_line(), if input_open => match line {
                    Ok(Some(line)) => {
                        if !self.execute(parse_command(&line))? {
                            break;
                        }
                    }
                    Ok(None) => input_open = false,
                    Err(err) if err.kind() == ErrorKind::InvalidData => {
                        writeln!(self.out, "Skipped a line that is not valid UTF-8")?;
                    }
                    Err(err) => return Err(err).context("Failed to read input"),
                },
                () = sleep_until(deadline) => {
                    self.engine.poll_persistence(now());
                }
            }
        }
        Ok(())
    }

    /// Run one command. Returns false when the shell should exit.
    ///
    /// `:push` and `:pull` only start the remote call; its result is
    /// reported when it settles.
    ///
    /// # Errors
    /// Returns an error if writing output fails.
    pub fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Append(line) => {
                let mut content = self.engine.content();
                if !content.is_empty() && !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str(&line);
                content.push('\n');
                self.engine.edit_at(content, now());
            }
            Command::Set(text) => self.engine.edit_at(text, now()),
            Command::Open(path) => match read_import(&path) {
                Ok(text) => {
                    self.engine.import_from_file(text);
                    writeln!(self.out, "Loaded {}", path.display())?;
                }
                Err(err) => writeln!(self.out, "{err:#}")?,
            },
            Command::Write(path) => {
                let export = self.engine.export_to_file();
                let path = path.unwrap_or_else(|| PathBuf::from(export.file_name));
                match std::fs::write(&path, &export.bytes) {
                    Ok(()) => writeln!(
                        self.out,
                        "Wrote {} ({}, {} bytes)",
                        path.display(),
                        export.media_type,
                        export.bytes.len()
                    )?,
                    Err(err) => writeln!(self.out, "Failed to write {}: {err}", path.display())?,
                }
            }
            Command::Push => {
                let engine = self.engine;
                self.start_remote(Box::pin(async move {
                    RemoteReply::Saved(engine.save_remote().await)
                }))?;
            }
            Command::Pull(id) => {
                let engine = self.engine;
                let id = id.unwrap_or_else(|| engine.load_prompt_default());
                if id.trim().is_empty() {
                    writeln!(self.out, "No record id given")?;
                } else {
                    self.start_remote(Box::pin(async move {
                        RemoteReply::Loaded(engine.load_remote(&id).await)
                    }))?;
                }
            }
            Command::Render => writeln!(self.out, "{}", self.engine.render())?,
            Command::Show => write!(self.out, "{}", self.engine.content())?,
            Command::Status => writeln!(
                self.out,
                "busy={} pending_save={} last_id={}",
                self.engine.is_busy() || self.remote.is_some(),
                self.engine.has_pending_persist(),
                self.engine.load_prompt_default()
            )?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(false),
            Command::Unknown(line) => writeln!(self.out, "Unknown command: {line} (:help)")?,
        }
        self.out.flush()?;
        Ok(true)
    }

    fn start_remote(&mut self, task: RemoteTask<'a>) -> Result<()> {
        if self.remote.is_some() {
            self.report_error(&EngineError::Busy)?;
            return Ok(());
        }
        writeln!(self.out, "Processing...")?;
        self.remote = Some(task);
        Ok(())
    }

    fn report(&mut self, reply: RemoteReply) -> Result<()> {
        match reply {
            RemoteReply::Saved(Ok(id)) => writeln!(self.out, "Content saved with ID: {id}")?,
            RemoteReply::Loaded(Ok(LoadOutcome::Loaded(id))) => {
                writeln!(self.out, "Loaded record {id}")?;
            }
            RemoteReply::Loaded(Ok(LoadOutcome::Skipped)) => {
                writeln!(self.out, "No record id given")?;
            }
            RemoteReply::Saved(Err(err)) | RemoteReply::Loaded(Err(err)) => {
                self.report_error(&err)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn report_error(&mut self, err: &EngineError) -> Result<()> {
        tracing::error!(error = %err, "remote operation failed");
        writeln!(self.out, "{}", err.user_message())?;
        Ok(())
    }
}

/// Current time on the runtime clock, so paused test time drives the debounce.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn wait_remote(task: &mut Option<RemoteTask<'_>>) -> RemoteReply {
    match task {
        Some(task) => task.await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}
