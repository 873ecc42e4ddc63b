//! Repositories preloaded with the fixture rows.
#![allow(dead_code)]

use super::constants::*;
use music_catalog::auth::PasswordHasher;
use music_catalog::loader::JsonRowSource;
use music_catalog::model::User;
use music_catalog::{populate, MemoryRepository, Repository, SqliteRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub fn fixture_source() -> JsonRowSource {
    JsonRowSource::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data"))
}

pub fn loaded_memory_repo() -> MemoryRepository {
    let repo = MemoryRepository::new();
    populate(&fixture_source(), &repo).unwrap();
    repo
}

/// An empty SQLite repository in a throwaway directory. Keep the `TempDir` alive for as
/// long as the repository is used.
pub fn tmp_sqlite_repo() -> (SqliteRepository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let repo = SqliteRepository::open(temp_dir.path().join("catalog.db")).unwrap();
    (repo, temp_dir)
}

pub fn loaded_sqlite_repo() -> (SqliteRepository, TempDir) {
    let (repo, temp_dir) = tmp_sqlite_repo();
    populate(&fixture_source(), &repo).unwrap();
    (repo, temp_dir)
}

fn add_users(repo: &dyn Repository) {
    let hash = PasswordHasher::Argon2.hash(TEST_PASS).unwrap();
    for name in [USER_THORKE, USER_FMERCURY] {
        repo.add_user(Arc::new(User::new(name, &hash).unwrap()))
            .unwrap();
    }
}

pub fn memory_repo_with_users() -> MemoryRepository {
    let repo = loaded_memory_repo();
    add_users(&repo);
    repo
}

pub fn sqlite_repo_with_users() -> (SqliteRepository, TempDir) {
    let (repo, temp_dir) = loaded_sqlite_repo();
    add_users(&repo);
    (repo, temp_dir)
}
