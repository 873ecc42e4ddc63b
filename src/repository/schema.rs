//! SQLite schema of the catalog database.
//!
//! Table and column names follow the layout of databases written by earlier releases of the
//! catalog, so those files can be opened in place.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("user_id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("user_name", SqlType::Varchar(255), non_null = true),
        sqlite_column!("password", SqlType::Varchar(255), non_null = true),
    ],
    indices: &[],
    unique_constraints: &[&["user_name"]],
};

const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("album_id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", SqlType::Varchar(255), non_null = true),
        sqlite_column!("album_url", SqlType::Varchar(255)),
        sqlite_column!("album_type", SqlType::Varchar(255)),
        sqlite_column!("release_year", SqlType::Integer),
    ],
    indices: &[],
    unique_constraints: &[],
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artist_id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("full_name", SqlType::Varchar(255), non_null = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "artist_id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const ALBUM_FK: ForeignKey = ForeignKey {
    foreign_table: "albums",
    foreign_column: "album_id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("track_id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", SqlType::Varchar(255), non_null = true),
        sqlite_column!("track_url", SqlType::Varchar(255)),
        sqlite_column!("track_duration", SqlType::Integer), // seconds
        sqlite_column!("artist_id", SqlType::Integer, foreign_key = Some(&ARTIST_FK)),
        sqlite_column!("album_id", SqlType::Integer, foreign_key = Some(&ALBUM_FK)),
    ],
    indices: &[("idx_tracks_album", "album_id")],
    unique_constraints: &[],
};

const GENRES_TABLE: Table = Table {
    name: "genres",
    columns: &[
        sqlite_column!("genre_id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", SqlType::Varchar(64), non_null = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

const TRACK_FK: ForeignKey = ForeignKey {
    foreign_table: "tracks",
    foreign_column: "track_id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "users",
    foreign_column: "user_id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const GENRE_FK: ForeignKey = ForeignKey {
    foreign_table: "genres",
    foreign_column: "genre_id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const REVIEWS_TABLE: Table = Table {
    name: "reviews",
    columns: &[
        sqlite_column!("review_id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("timestamp", SqlType::DateTime, non_null = true),
        sqlite_column!("review_text", SqlType::Varchar(255), non_null = true),
        sqlite_column!("rating", SqlType::Integer, non_null = true),
        sqlite_column!("track_id", SqlType::Integer, foreign_key = Some(&TRACK_FK)),
        sqlite_column!("user_id", SqlType::Integer, foreign_key = Some(&USER_FK)),
    ],
    indices: &[("idx_reviews_track", "track_id")],
    unique_constraints: &[],
};

const TRACK_GENRES_TABLE: Table = Table {
    name: "track_genres",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("track_id", SqlType::Integer, foreign_key = Some(&TRACK_FK)),
        sqlite_column!("genre_id", SqlType::Integer, foreign_key = Some(&GENRE_FK)),
    ],
    indices: &[("idx_track_genres_track", "track_id")],
    unique_constraints: &[],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USERS_TABLE,
        ALBUMS_TABLE,
        ARTISTS_TABLE,
        TRACKS_TABLE,
        GENRES_TABLE,
        REVIEWS_TABLE,
        TRACK_GENRES_TABLE,
    ],
    migration: None,
}];

/// Brings a freshly opened database to the latest schema.
///
/// Empty databases get the schema created. Databases that were never stamped with a version
/// are adopted when their tables match, after adding any missing secondary index. Everything
/// else is validated against the latest schema.
pub fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        let tx = conn.transaction()?;
        latest_schema.create(&tx)?;
        tx.commit()?;
        return Ok(());
    }

    if db_version < BASE_DB_VERSION as i64 {
        info!("Adopting unversioned catalog db");
        let tx = conn.transaction()?;
        for table in latest_schema.tables {
            table.create_indices(&tx)?;
        }
        latest_schema
            .validate(&tx)
            .context("Unversioned database does not match the catalog schema")?;
        latest_schema.stamp(&tx)?;
        tx.commit()?;
        return Ok(());
    }

    let mut current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
            }
            current_version = schema.version;
        }
        latest_schema.stamp(&tx)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .context("Catalog database schema validation failed")
}
