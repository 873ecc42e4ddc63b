//! Common test infrastructure
//!
//! Integration tests import from this module only.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{loaded_memory_repo, TRACK_FOOD_ID};
//!
//! #[test]
//! fn finds_food() {
//!     let repo = loaded_memory_repo();
//!     assert!(repo.get_track(TRACK_FOOD_ID).unwrap().is_some());
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{
    fixture_source, loaded_memory_repo, loaded_sqlite_repo, memory_repo_with_users,
    sqlite_repo_with_users, tmp_sqlite_repo,
};
