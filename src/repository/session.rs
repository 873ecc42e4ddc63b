//! Sessions over the catalog database.
//!
//! A [`SessionFactory`] knows where the database lives and hands out connections that are
//! ready to use. Every write runs inside a [`UnitOfWork`].

use super::schema::migrate_if_needed;
use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SessionFactory {
    db_path: PathBuf,
}

impl SessionFactory {
    /// Opens the database once, creating, adopting or validating its schema.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let factory = SessionFactory {
            db_path: db_path.as_ref().to_path_buf(),
        };

        let mut conn = factory.open_session()?;
        migrate_if_needed(&mut conn)?;

        let track_count: i64 = conn.query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))?;
        let review_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM reviews", [], |r| r.get(0))?;
        info!(
            "Opened catalog database {:?}: {} tracks, {} reviews",
            factory.db_path, track_count, review_count
        );

        Ok(factory)
    }

    /// Opens a new connection with foreign key enforcement turned on.
    pub fn open_session(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open catalog database {:?}", self.db_path))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }
}

/// A transaction that is rolled back unless explicitly committed.
pub struct UnitOfWork<'conn> {
    // Only `None` while being dropped after `commit`.
    tx: Option<Transaction<'conn>>,
}

impl<'conn> UnitOfWork<'conn> {
    pub fn begin(conn: &'conn mut Connection) -> rusqlite::Result<Self> {
        Ok(UnitOfWork {
            tx: Some(conn.transaction()?),
        })
    }

    pub fn commit(mut self) -> rusqlite::Result<()> {
        match self.tx.take() {
            Some(tx) => tx.commit(),
            None => Ok(()),
        }
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.tx
            .as_ref()
            .expect("unit of work is only emptied by commit")
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!("Rolling back uncommitted unit of work");
            if let Err(err) = tx.rollback() {
                warn!("Rollback failed: {}", err);
            }
        }
    }
}
