mod memory_store;
mod query;
mod schema;
mod session;
mod sqlite_store;
mod trait_def;

pub use memory_store::MemoryRepository;
pub use query::{matches_query, SearchField};
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use session::{SessionFactory, UnitOfWork};
pub use sqlite_store::SqliteRepository;
pub use trait_def::{CheckedReview, Repository, RepositoryError, RepositoryResult};

#[cfg(feature = "mock")]
pub use trait_def::MockRepository;
