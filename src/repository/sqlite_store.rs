//! SQLite-backed repository.
//!
//! Writes merge entities by primary key, so adding something that is already stored updates
//! it in place. Reads rebuild fresh entity instances from the rows; within one call an
//! artist, album or genre shared by several tracks is rebuilt once and shared.

use super::query::{filter_tracks, sort_albums_by_title, SearchField};
use super::session::{SessionFactory, UnitOfWork};
use super::trait_def::{CheckedReview, Repository, RepositoryError, RepositoryResult};
use crate::model::{normalize_user_name, Album, Artist, Genre, Review, Track, User};
use anyhow::anyhow;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Text layout of the `reviews.timestamp` column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const TRACK_COLUMNS: &str = "track_id, title, track_url, track_duration, artist_id, album_id";
const ALBUM_COLUMNS: &str = "album_id, title, album_url, album_type, release_year";

pub struct SqliteRepository {
    factory: SessionFactory,
    session: Mutex<Option<Connection>>,
}

impl SqliteRepository {
    pub fn new(factory: SessionFactory) -> Self {
        SqliteRepository {
            factory,
            session: Mutex::new(None),
        }
    }

    /// Opens (creating if needed) the database at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P) -> anyhow::Result<Self> {
        Ok(Self::new(SessionFactory::new(db_path)?))
    }

    /// Runs `f` on the current session, opening one first if there is none.
    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        let mut guard = self.session.lock().map_err(|_| RepositoryError::Poisoned)?;
        let conn = match guard.take() {
            Some(conn) => conn,
            None => {
                debug!("Opening catalog session");
                self.factory.open_session()?
            }
        };
        f(guard.insert(conn))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&UnitOfWork<'_>) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        self.with_session(|conn| {
            let uow = UnitOfWork::begin(conn)?;
            let result = f(&uow)?;
            uow.commit()?;
            Ok(result)
        })
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&mut EntityReader<'_>) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        self.with_session(|conn| f(&mut EntityReader::new(conn)))
    }

    fn count(&self, table: &str) -> RepositoryResult<usize> {
        self.with_session(|conn| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok(count as usize)
        })
    }
}

// =============================================================================
// Writes
// =============================================================================

fn merge_artist(conn: &Connection, artist: &Artist) -> rusqlite::Result<()> {
    conn.prepare_cached(
        "INSERT INTO artists (artist_id, full_name) VALUES (?1, ?2)
         ON CONFLICT(artist_id) DO UPDATE SET full_name = excluded.full_name",
    )?
    .execute(params![artist.id(), artist.full_name()])?;
    Ok(())
}

fn merge_album(conn: &Connection, album: &Album) -> rusqlite::Result<()> {
    conn.prepare_cached(
        "INSERT INTO albums (album_id, title, album_url, album_type, release_year)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(album_id) DO UPDATE SET title = excluded.title,
             album_url = excluded.album_url, album_type = excluded.album_type,
             release_year = excluded.release_year",
    )?
    .execute(params![
        album.id(),
        album.title(),
        album.url(),
        album.album_type(),
        album.release_year()
    ])?;
    Ok(())
}

fn merge_genre(conn: &Connection, genre: &Genre) -> rusqlite::Result<()> {
    conn.prepare_cached(
        "INSERT INTO genres (genre_id, name) VALUES (?1, ?2)
         ON CONFLICT(genre_id) DO UPDATE SET name = excluded.name",
    )?
    .execute(params![genre.id(), genre.name()])?;
    Ok(())
}

/// Merges a track together with its artist, album and genres.
fn merge_track(conn: &Connection, track: &Track) -> rusqlite::Result<()> {
    if let Some(artist) = track.artist() {
        merge_artist(conn, artist)?;
    }
    if let Some(album) = track.album() {
        merge_album(conn, album)?;
    }
    for genre in track.genres() {
        merge_genre(conn, genre)?;
    }

    conn.prepare_cached(
        "INSERT INTO tracks (track_id, title, track_url, track_duration, artist_id, album_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(track_id) DO UPDATE SET title = excluded.title,
             track_url = excluded.track_url, track_duration = excluded.track_duration,
             artist_id = excluded.artist_id, album_id = excluded.album_id",
    )?
    .execute(params![
        track.id(),
        // The column is NOT NULL, a missing title is stored empty.
        track.title().unwrap_or_default(),
        track.url(),
        track.duration(),
        track.artist().map(|a| a.id()),
        track.album().map(|a| a.id()),
    ])?;

    conn.prepare_cached("DELETE FROM track_genres WHERE track_id = ?1")?
        .execute(params![track.id()])?;
    let mut insert_genre =
        conn.prepare_cached("INSERT INTO track_genres (track_id, genre_id) VALUES (?1, ?2)")?;
    for genre in track.genres() {
        insert_genre.execute(params![track.id(), genre.id()])?;
    }
    Ok(())
}

fn insert_user(conn: &Connection, user: &User) -> rusqlite::Result<i64> {
    conn.prepare_cached("INSERT INTO users (user_name, password) VALUES (?1, ?2)")?
        .execute(params![user.user_name(), user.password()])?;
    Ok(conn.last_insert_rowid())
}

/// Row id of `user`, inserting it when no user with that name is stored yet.
fn resolve_user(conn: &Connection, user: &User) -> rusqlite::Result<i64> {
    let existing = conn
        .query_row(
            "SELECT user_id FROM users WHERE user_name = ?1",
            params![user.user_name()],
            |r| r.get(0),
        )
        .optional()?;
    match existing {
        Some(user_id) => Ok(user_id),
        None => insert_user(conn, user),
    }
}

// =============================================================================
// Reads
// =============================================================================

struct TrackRow {
    track_id: i64,
    title: String,
    track_url: Option<String>,
    track_duration: Option<i64>,
    artist_id: Option<i64>,
    album_id: Option<i64>,
}

impl TrackRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TrackRow {
            track_id: row.get(0)?,
            title: row.get(1)?,
            track_url: row.get(2)?,
            track_duration: row.get(3)?,
            artist_id: row.get(4)?,
            album_id: row.get(5)?,
        })
    }
}

struct AlbumRow {
    album_id: i64,
    title: String,
    album_url: Option<String>,
    album_type: Option<String>,
    release_year: Option<i32>,
}

impl AlbumRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AlbumRow {
            album_id: row.get(0)?,
            title: row.get(1)?,
            album_url: row.get(2)?,
            album_type: row.get(3)?,
            release_year: row.get(4)?,
        })
    }

    fn into_album(self) -> RepositoryResult<Album> {
        let mut album = Album::new(self.album_id, &self.title)?;
        album.set_url(self.album_url.as_deref());
        album.set_album_type(self.album_type.as_deref());
        album.set_release_year(self.release_year);
        Ok(album)
    }
}

/// Rebuilds entities from rows, caching what it already built.
struct EntityReader<'c> {
    conn: &'c Connection,
    artists: HashMap<i64, Arc<Artist>>,
    albums: HashMap<i64, Arc<Album>>,
    genres: HashMap<i64, Arc<Genre>>,
    tracks: HashMap<i64, Arc<Track>>,
    users: HashMap<i64, Arc<User>>,
}

impl<'c> EntityReader<'c> {
    fn new(conn: &'c Connection) -> Self {
        EntityReader {
            conn,
            artists: HashMap::new(),
            albums: HashMap::new(),
            genres: HashMap::new(),
            tracks: HashMap::new(),
            users: HashMap::new(),
        }
    }

    fn artist(&mut self, artist_id: i64) -> RepositoryResult<Option<Arc<Artist>>> {
        if let Some(artist) = self.artists.get(&artist_id) {
            return Ok(Some(artist.clone()));
        }
        let full_name: Option<String> = self
            .conn
            .query_row(
                "SELECT full_name FROM artists WHERE artist_id = ?1",
                params![artist_id],
                |r| r.get(0),
            )
            .optional()?;
        let Some(full_name) = full_name else {
            debug!("Artist {} not found", artist_id);
            return Ok(None);
        };
        let artist = Arc::new(Artist::new(artist_id, &full_name)?);
        self.artists.insert(artist_id, artist.clone());
        Ok(Some(artist))
    }

    fn album(&mut self, album_id: i64) -> RepositoryResult<Option<Arc<Album>>> {
        if let Some(album) = self.albums.get(&album_id) {
            return Ok(Some(album.clone()));
        }
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM albums WHERE album_id = ?1", ALBUM_COLUMNS),
                params![album_id],
                AlbumRow::from_row,
            )
            .optional()?;
        let Some(row) = row else {
            debug!("Album {} not found", album_id);
            return Ok(None);
        };
        let album = Arc::new(row.into_album()?);
        self.albums.insert(album_id, album.clone());
        Ok(Some(album))
    }

    fn all_albums(&mut self) -> RepositoryResult<Vec<Arc<Album>>> {
        let conn = self.conn;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM albums ORDER BY album_id",
            ALBUM_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], AlbumRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        let mut albums = Vec::with_capacity(rows.len());
        for row in rows {
            let album_id = row.album_id;
            let album = Arc::new(row.into_album()?);
            self.albums.insert(album_id, album.clone());
            albums.push(album);
        }
        Ok(albums)
    }

    fn genre_from(&mut self, genre_id: i64, name: &str) -> RepositoryResult<Arc<Genre>> {
        if let Some(genre) = self.genres.get(&genre_id) {
            return Ok(genre.clone());
        }
        let genre = Arc::new(Genre::new(genre_id, name)?);
        self.genres.insert(genre_id, genre.clone());
        Ok(genre)
    }

    fn track_genres(&mut self, track_id: i64) -> RepositoryResult<Vec<Arc<Genre>>> {
        let conn = self.conn;
        let mut stmt = conn.prepare_cached(
            "SELECT g.genre_id, g.name FROM track_genres tg
             JOIN genres g ON g.genre_id = tg.genre_id
             WHERE tg.track_id = ?1 ORDER BY tg.id",
        )?;
        let rows = stmt
            .query_map(params![track_id], |r| {
                Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(genre_id, name)| self.genre_from(genre_id, &name))
            .collect()
    }

    fn build_track(&mut self, row: TrackRow) -> RepositoryResult<Arc<Track>> {
        if let Some(track) = self.tracks.get(&row.track_id) {
            return Ok(track.clone());
        }
        let mut track = Track::new(row.track_id, Some(&row.title))?;
        track.set_url(row.track_url.as_deref());
        if let Some(duration) = row.track_duration {
            track.set_duration(duration)?;
        }
        if let Some(artist_id) = row.artist_id {
            track.set_artist(self.artist(artist_id)?);
        }
        if let Some(album_id) = row.album_id {
            track.set_album(self.album(album_id)?);
        }
        for genre in self.track_genres(row.track_id)? {
            track.add_genre(genre);
        }

        let track = Arc::new(track);
        self.tracks.insert(row.track_id, track.clone());
        Ok(track)
    }

    fn track(&mut self, track_id: i64) -> RepositoryResult<Option<Arc<Track>>> {
        if let Some(track) = self.tracks.get(&track_id) {
            return Ok(Some(track.clone()));
        }
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM tracks WHERE track_id = ?1", TRACK_COLUMNS),
                params![track_id],
                TrackRow::from_row,
            )
            .optional()?;
        match row {
            Some(row) => Ok(Some(self.build_track(row)?)),
            None => {
                debug!("Track {} not found", track_id);
                Ok(None)
            }
        }
    }

    fn tracks_where(
        &mut self,
        condition: &str,
        param: Option<i64>,
    ) -> RepositoryResult<Vec<Arc<Track>>> {
        let conn = self.conn;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tracks {} ORDER BY track_id",
            TRACK_COLUMNS, condition
        ))?;
        let rows = match param {
            Some(param) => stmt.query_map(params![param], TrackRow::from_row)?,
            None => stmt.query_map([], TrackRow::from_row)?,
        }
        .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(|row| self.build_track(row)).collect()
    }

    fn user_by_id(&mut self, user_id: i64) -> RepositoryResult<Option<Arc<User>>> {
        if let Some(user) = self.users.get(&user_id) {
            return Ok(Some(user.clone()));
        }
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT user_name, password FROM users WHERE user_id = ?1",
                params![user_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let Some((user_name, password)) = row else {
            return Ok(None);
        };
        let user = Arc::new(User::new(&user_name, &password)?);
        self.users.insert(user_id, user.clone());
        Ok(Some(user))
    }

    /// Names written by older clients may differ in case, so several rows can match. That is
    /// treated as not found.
    fn user_by_name(&mut self, user_name: &str) -> RepositoryResult<Option<Arc<User>>> {
        let user_name = normalize_user_name(user_name);
        let conn = self.conn;
        let mut stmt =
            conn.prepare_cached("SELECT user_id FROM users WHERE lower(trim(user_name)) = ?1")?;
        let user_ids = stmt
            .query_map(params![user_name], |r| r.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        match user_ids.as_slice() {
            [user_id] => self.user_by_id(*user_id),
            [] => {
                debug!("User {} not found", user_name);
                Ok(None)
            }
            _ => {
                warn!("{} users are named {}, ignoring them", user_ids.len(), user_name);
                Ok(None)
            }
        }
    }

    fn reviews_for_track(&mut self, track_id: i64) -> RepositoryResult<Vec<Arc<Review>>> {
        let conn = self.conn;
        let mut stmt = conn.prepare(
            "SELECT timestamp, review_text, rating, user_id FROM reviews
             WHERE track_id = ?1 ORDER BY review_id",
        )?;
        let rows = stmt
            .query_map(params![track_id], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, i32>(2)?,
                    r.get::<_, Option<i64>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let track = self.track(track_id)?;
        let mut reviews = Vec::with_capacity(rows.len());
        for (timestamp, text, rating, user_id) in rows {
            let timestamp = parse_timestamp(&timestamp)?;
            let user = match user_id {
                Some(user_id) => self.user_by_id(user_id)?,
                None => None,
            };
            let review =
                Review::with_timestamp(track.clone(), &text, rating, timestamp).with_user(user);
            reviews.push(Arc::new(review));
        }
        Ok(reviews)
    }
}

fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(raw: &str) -> RepositoryResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| RepositoryError::Schema(anyhow!("Invalid review timestamp {:?}: {}", raw, e)))
}

impl Repository for SqliteRepository {
    fn add_user(&self, user: Arc<User>) -> RepositoryResult<()> {
        self.write(|uow| {
            insert_user(uow, &user)?;
            Ok(())
        })
    }

    fn get_user(&self, user_name: &str) -> RepositoryResult<Option<Arc<User>>> {
        self.read(|reader| reader.user_by_name(user_name))
    }

    fn add_track(&self, track: Arc<Track>) -> RepositoryResult<()> {
        self.write(|uow| Ok(merge_track(uow, &track)?))
    }

    fn add_many_tracks(&self, tracks: Vec<Arc<Track>>) -> RepositoryResult<()> {
        debug!("Merging {} tracks", tracks.len());
        self.write(|uow| {
            for track in &tracks {
                merge_track(uow, track)?;
            }
            Ok(())
        })
    }

    fn get_track(&self, track_id: i64) -> RepositoryResult<Option<Arc<Track>>> {
        self.read(|reader| reader.track(track_id))
    }

    fn get_tracks(&self, sorted: bool) -> RepositoryResult<Vec<Arc<Track>>> {
        let mut tracks = self.read(|reader| reader.tracks_where("", None))?;
        if sorted {
            tracks.sort_by(|a, b| a.cmp_by_title(b));
        }
        Ok(tracks)
    }

    fn get_tracks_by_album(&self, album_id: i64) -> RepositoryResult<Vec<Arc<Track>>> {
        self.read(|reader| reader.tracks_where("WHERE album_id = ?1", Some(album_id)))
    }

    fn get_number_of_tracks(&self) -> RepositoryResult<usize> {
        self.count("tracks")
    }

    fn add_artist(&self, artist: Arc<Artist>) -> RepositoryResult<()> {
        self.write(|uow| Ok(merge_artist(uow, &artist)?))
    }

    fn add_many_artists(&self, artists: Vec<Arc<Artist>>) -> RepositoryResult<()> {
        self.write(|uow| {
            for artist in &artists {
                merge_artist(uow, artist)?;
            }
            Ok(())
        })
    }

    fn get_artists(&self) -> RepositoryResult<Vec<Arc<Artist>>> {
        self.with_session(|conn| {
            let mut stmt =
                conn.prepare("SELECT artist_id, full_name FROM artists ORDER BY artist_id")?;
            let rows = stmt
                .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter()
                .map(|(id, full_name)| -> RepositoryResult<Arc<Artist>> {
                    Ok(Arc::new(Artist::new(id, &full_name)?))
                })
                .collect()
        })
    }

    fn get_number_of_artists(&self) -> RepositoryResult<usize> {
        self.count("artists")
    }

    fn add_album(&self, album: Arc<Album>) -> RepositoryResult<()> {
        self.write(|uow| Ok(merge_album(uow, &album)?))
    }

    fn add_many_albums(&self, albums: Vec<Arc<Album>>) -> RepositoryResult<()> {
        self.write(|uow| {
            for album in &albums {
                merge_album(uow, album)?;
            }
            Ok(())
        })
    }

    fn get_albums(&self, sorted: bool) -> RepositoryResult<Vec<Arc<Album>>> {
        let mut albums = self.read(|reader| reader.all_albums())?;
        if sorted {
            sort_albums_by_title(&mut albums);
        }
        Ok(albums)
    }

    fn get_album(&self, album_id: i64) -> RepositoryResult<Option<Arc<Album>>> {
        self.read(|reader| reader.album(album_id))
    }

    fn get_number_of_albums(&self) -> RepositoryResult<usize> {
        self.count("albums")
    }

    fn add_genre(&self, genre: Arc<Genre>) -> RepositoryResult<()> {
        self.write(|uow| Ok(merge_genre(uow, &genre)?))
    }

    fn add_many_genres(&self, genres: Vec<Arc<Genre>>) -> RepositoryResult<()> {
        self.write(|uow| {
            for genre in &genres {
                merge_genre(uow, genre)?;
            }
            Ok(())
        })
    }

    fn get_genres(&self) -> RepositoryResult<Vec<Arc<Genre>>> {
        self.with_session(|conn| {
            let mut stmt = conn.prepare("SELECT genre_id, name FROM genres ORDER BY genre_id")?;
            let rows = stmt
                .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter()
                .map(|(id, name)| -> RepositoryResult<Arc<Genre>> {
                    Ok(Arc::new(Genre::new(id, &name)?))
                })
                .collect()
        })
    }

    fn get_number_of_genres(&self) -> RepositoryResult<usize> {
        self.count("genres")
    }

    fn insert_review(&self, review: CheckedReview) -> RepositoryResult<()> {
        self.write(|uow| {
            merge_track(uow, review.track())?;
            let user_id = match review.review().user() {
                Some(user) => Some(resolve_user(uow, user)?),
                None => None,
            };
            uow.prepare_cached(
                "INSERT INTO reviews (timestamp, review_text, rating, track_id, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![
                format_timestamp(review.review().timestamp()),
                review.review().text(),
                review.review().rating(),
                review.track().id(),
                user_id,
            ])?;
            Ok(())
        })
    }

    fn get_reviews_for_track(&self, track_id: i64) -> RepositoryResult<Vec<Arc<Review>>> {
        self.read(|reader| reader.reviews_for_track(track_id))
    }

    fn search_tracks(
        &self,
        field: SearchField,
        query: &str,
    ) -> RepositoryResult<Vec<Arc<Track>>> {
        let tracks = self.get_tracks(true)?;
        Ok(filter_tracks(&tracks, field, query))
    }

    fn reset_session(&self) -> RepositoryResult<()> {
        let mut guard = self.session.lock().map_err(|_| RepositoryError::Poisoned)?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| e)?;
        }
        *guard = Some(self.factory.open_session()?);
        debug!("Catalog session reset");
        Ok(())
    }

    fn close_session(&self) -> RepositoryResult<()> {
        let mut guard = self.session.lock().map_err(|_| RepositoryError::Poisoned)?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| e)?;
            debug!("Catalog session closed");
        }
        Ok(())
    }
}
