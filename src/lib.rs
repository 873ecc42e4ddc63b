//! Music catalog library
//!
//! Entity model, storage-agnostic repository with in-memory and SQLite backends, a bulk
//! loader for tabular catalog rows and the services built on top of them.

pub mod auth;
pub mod config;
pub mod loader;
pub mod model;
pub mod repository;
pub mod services;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use loader::{populate, JsonRowSource, LoadReport};
pub use repository::{MemoryRepository, Repository, RepositoryError, SqliteRepository};
