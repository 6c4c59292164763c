//! Error types for ticklist

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("A list named '{0}' already exists")]
    DuplicateListName(String),

    #[error("The default list '{0}' cannot be renamed")]
    DefaultListRename(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("Not signed in. Run 'tick login' first.")]
    NotSignedIn,

    #[error("Invalid view: {0}")]
    InvalidView(String),

    #[error("Change applied but not saved: {0}")]
    NotPersisted(#[source] StorageError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failures of the durable store.
///
/// Reads never surface these to callers (a failed read is an absent key);
/// writes return them so a caller can warn that a change may be lost.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("IO error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
