// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::StoreError)
    clippy::module_name_repetitions
)]

//! # Markpad
//!
//! A markdown editor core with a live HTML preview.
//!
//! Markpad keeps one raw markdown document as the source of truth and:
//! - Renders it to HTML on demand (comrak, GFM extensions)
//! - Persists it locally on a 500 ms debounce
//! - Imports and exports it as `document.md`
//! - Saves it to and loads it from a remote HTTP store
//!
//! ## Modules
//!
//! - [`editor`]: The state engine that owns the document
//! - [`document`]: Document type, rendering and export
//! - [`store`]: Local key-value persistence
//! - [`remote`]: Remote record store and its HTTP client
//! - [`shell`]: Line-oriented command front end
//! - [`config`]: Flag files with saved defaults

pub mod config;
pub mod document;
pub mod editor;
pub mod remote;
pub mod shell;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Document, Export};
    pub use crate::editor::{Engine, EngineError, LoadOutcome};
    pub use crate::remote::{HttpRemoteStore, MemoryRemote, RecordId, RemoteStore};
    pub use crate::store::{FileStore, MemoryStore, PersistenceStore};
}
