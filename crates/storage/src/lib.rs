#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, ProgressRepository, ProgressSync, Storage, StorageError, SyncUpdate,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
