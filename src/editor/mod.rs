//! Editor state engine.
//!
//! The [`Engine`] is the single authority over the document: it applies
//! edits and imports, derives the rendered preview, debounces writes to the
//! local [`PersistenceStore`](crate::store::PersistenceStore), and runs cloud
//! save/load against a [`RemoteStore`](crate::remote::RemoteStore) behind a
//! busy flag.

mod debounce;
mod engine;
mod error;

pub use engine::{DEFAULT_DEBOUNCE, Engine, LoadOutcome, RECORD_TITLE, RECORD_USER_ID};
pub use error::EngineError;

#[cfg(test)]
mod tests;
