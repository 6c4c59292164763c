//! ticklist-core: Core library for the ticklist to-do tracker
//!
//! Owns lists and items, keeps exactly one default list, runs the trash bin
//! and mirrors every change into a key-value store. Synchronous and
//! single-user; a [`Session`] is the only way in.

pub mod config;
pub mod error;
pub mod id;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod store;
pub mod todo;
pub mod trash;

pub use config::{Config, DEFAULT_LIST_NAME};
pub use error::{Error, StorageError};
pub use id::generate_id;
pub use reconcile::enforce_default_list;
pub use session::{Committed, Session};
pub use storage::{DurableStore, FileBackend, MemoryBackend, StorageBackend, StorageKey};
pub use store::{EntityStore, Stats};
pub use todo::{Identity, Settings, SettingsPatch, TodoItem, TodoList, View};
pub use trash::{ItemFilter, Trash};

/// Result type for ticklist operations
pub type Result<T> = std::result::Result<T, Error>;
