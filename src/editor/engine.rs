use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use crate::document::{Document, Export};
use crate::remote::{NewRecord, RecordId, RemoteStore};
use crate::store::{CONTENT_KEY, PersistenceStore};

use super::debounce::PersistDebouncer;
use super::error::EngineError;

/// Quiet period after the last edit before the document is persisted.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Title attached to every record created by a cloud save.
pub const RECORD_TITLE: &str = "My Markdown Content";

/// Owner attached to every record created by a cloud save.
pub const RECORD_USER_ID: u64 = 1;

/// Result of a [`Engine::load_remote`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document now holds the body of this record.
    Loaded(RecordId),
    /// The identifier was empty, so nothing was requested.
    Skipped,
}

#[derive(Debug)]
struct State {
    document: Document,
    persist: PersistDebouncer,
    last_record_id: Option<RecordId>,
}

/// Owns the document and keeps it in sync with local and remote storage.
///
/// All operations take `&self` so edits and renders stay available while a
/// remote save or load is suspended. State borrows never span an `.await`.
pub struct Engine<S, R> {
    store: S,
    remote: R,
    state: RefCell<State>,
    busy: Cell<bool>,
}

/// Holds the busy flag for the lifetime of one remote operation.
struct BusyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl<S: PersistenceStore, R: RemoteStore> Engine<S, R> {
    /// Load the document from `store`, falling back to the welcome text.
    ///
    /// A stored empty string counts as nothing stored.
    pub fn new(store: S, remote: R) -> Self {
        let document = match store.get(CONTENT_KEY) {
            Ok(Some(content)) if !content.is_empty() => {
                tracing::debug!(bytes = content.len(), "restored persisted document");
                Document::new(content)
            }
            Ok(_) => Document::welcome(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted document, using default");
                Document::welcome()
            }
        };

        Self {
            store,
            remote,
            state: RefCell::new(State {
                document,
                persist: PersistDebouncer::new(DEFAULT_DEBOUNCE),
                last_record_id: None,
            }),
            busy: Cell::new(false),
        }
    }

    /// Use a different quiet period before persisting.
    #[must_use]
    pub fn with_debounce(self, delay: Duration) -> Self {
        self.state.borrow_mut().persist = PersistDebouncer::new(delay);
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// A copy of the current markdown text.
    pub fn content(&self) -> String {
        self.state.borrow().document.content().to_string()
    }

    /// Render the current text to HTML.
    pub fn render(&self) -> String {
        self.state.borrow().document.render()
    }

    /// Replace the document text and re-arm the persistence timer.
    pub fn edit(&self, text: impl Into<String>) {
        self.edit_at(text, Instant::now());
    }

    /// [`Engine::edit`] with an explicit clock reading.
    pub fn edit_at(&self, text: impl Into<String>, now: Instant) {
        let mut state = self.state.borrow_mut();
        state.document.set_content(text);
        state.persist.queue(now);
        tracing::trace!(delay = ?state.persist.delay(), "persistence re-armed");
    }

    /// Replace the document with the text of an imported file.
    pub fn import_from_file(&self, text: impl Into<String>) {
        self.edit(text);
    }

    /// Package the document for download as `document.md`.
    pub fn export_to_file(&self) -> Export {
        self.state.borrow().document.export()
    }

    /// When the pending persistence write comes due, if one is armed.
    pub fn persistence_deadline(&self) -> Option<Instant> {
        self.state.borrow().persist.deadline()
    }

    pub fn has_pending_persist(&self) -> bool {
        self.state.borrow().persist.is_pending()
    }

    /// Persist the document if the debounce deadline has passed.
    ///
    /// Returns true if a write was attempted.
    pub fn poll_persistence(&self, now: Instant) -> bool {
        let content = {
            let mut state = self.state.borrow_mut();
            if !state.persist.take_ready(now) {
                return false;
            }
            state.document.content().to_string()
        };
        self.persist(&content);
        true
    }

    /// Write any pending content immediately.
    ///
    /// Returns true if a write was attempted.
    pub fn flush(&self) -> bool {
        let content = {
            let mut state = self.state.borrow_mut();
            if !state.persist.take_pending() {
                return false;
            }
            state.document.content().to_string()
        };
        self.persist(&content);
        true
    }

    fn persist(&self, content: &str) {
        match self.store.set(CONTENT_KEY, content) {
            Ok(()) => tracing::debug!(bytes = content.len(), "persisted document"),
            Err(err) => tracing::warn!(error = %err, "failed to persist document"),
        }
    }

    /// Whether a remote save or load is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Identifier of the record most recently saved or loaded.
    pub fn last_record_id(&self) -> Option<RecordId> {
        self.state.borrow().last_record_id.clone()
    }

    /// Value to pre-fill the "load from cloud" prompt with.
    pub fn load_prompt_default(&self) -> String {
        self.last_record_id()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Save the document to the remote store as a new record.
    ///
    /// The body is the content at call time; edits made while the request
    /// is in flight are not included.
    ///
    /// # Errors
    /// Returns [`EngineError::Busy`] if another remote operation is running,
    /// or [`EngineError::RemoteSave`] if the request fails.
    #[allow(clippy::future_not_send)]
    pub async fn save_remote(&self) -> Result<RecordId, EngineError> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(EngineError::Busy)?;
        let payload = NewRecord {
            title: RECORD_TITLE.to_string(),
            body: self.content(),
            user_id: RECORD_USER_ID,
        };

        match self.remote.create(&payload).await {
            Ok(record) => {
                tracing::info!(id = %record.id, "saved document remotely");
                self.state.borrow_mut().last_record_id = Some(record.id.clone());
                Ok(record.id)
            }
            Err(err) => {
                tracing::warn!(error = %err, "remote save failed");
                Err(EngineError::RemoteSave(err))
            }
        }
    }

    /// Replace the document with the body of the remote record `id`.
    ///
    /// An empty identifier is a no-op. On failure the document is left as
    /// it was.
    ///
    /// # Errors
    /// Returns [`EngineError::Busy`] if another remote operation is running,
    /// or [`EngineError::RemoteLoad`] if the record cannot be fetched.
    #[allow(clippy::future_not_send)]
    pub async fn load_remote(&self, id: &str) -> Result<LoadOutcome, EngineError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(LoadOutcome::Skipped);
        }
        let _busy = BusyGuard::acquire(&self.busy).ok_or(EngineError::Busy)?;

        match self.remote.read_by_id(id).await {
            Ok(record) => {
                tracing::info!(id = %record.id, bytes = record.body.len(), "loaded remote record");
                self.edit(record.body);
                self.state.borrow_mut().last_record_id = Some(record.id.clone());
                Ok(LoadOutcome::Loaded(record.id))
            }
            Err(source) => {
                tracing::warn!(id, error = %source, "remote load failed");
                Err(EngineError::RemoteLoad {
                    id: id.to_string(),
                    source,
                })
            }
        }
    }
}

impl<S, R> std::fmt::Debug for Engine<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("busy", &self.busy.get())
            .finish_non_exhaustive()
    }
}
