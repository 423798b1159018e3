use crate::remote::RemoteError;

/// Errors surfaced by the engine's remote operations.
///
/// None of these are fatal: the engine is back to idle with its document
/// untouched by the time one is returned.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to save document remotely: {0}")]
    RemoteSave(#[source] RemoteError),

    #[error("failed to load record {id}: {source}")]
    RemoteLoad {
        id: String,
        #[source]
        source: RemoteError,
    },

    /// Another save or load is still in flight.
    #[error("a remote operation is already in progress")]
    Busy,
}

impl EngineError {
    /// Short notification text for the user.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::RemoteSave(_) => "Error saving content.",
            Self::RemoteLoad { .. } => "Error loading content.",
            Self::Busy => "Still processing the previous request.",
        }
    }

    /// The underlying remote failure, if any.
    pub const fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::RemoteSave(source) | Self::RemoteLoad { source, .. } => Some(source),
            Self::Busy => None,
        }
    }
}
