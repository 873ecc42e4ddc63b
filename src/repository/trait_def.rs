//! Repository trait definition.
//!
//! This trait is the only way upper layers reach catalog storage, so the same callers work
//! with the in-memory `MemoryRepository` and the SQLite-backed `SqliteRepository`.

use super::query::SearchField;
use crate::model::{Album, Artist, Genre, Review, Track, User, ValidationError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Review is not attached to a track")]
    UnreferencedReview,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Stored entity is invalid: {0}")]
    Validation(#[from] ValidationError),

    #[error("Repository state lock was poisoned")]
    Poisoned,

    #[error("Database schema error: {0:#}")]
    Schema(#[from] anyhow::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A review that passed the precondition shared by all repositories.
///
/// It can only be built by [`Repository::add_review`], so backends receive reviews
/// that are already known to reference a track.
#[derive(Debug, Clone)]
pub struct CheckedReview {
    review: Arc<Review>,
    track: Arc<Track>,
}

impl CheckedReview {
    fn check(review: Arc<Review>) -> RepositoryResult<CheckedReview> {
        let track = review
            .track()
            .cloned()
            .ok_or(RepositoryError::UnreferencedReview)?;
        Ok(CheckedReview { review, track })
    }

    pub fn review(&self) -> &Arc<Review> {
        &self.review
    }

    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }
}

/// Storage-agnostic access to the catalog.
///
/// Lookups by key return `Ok(None)` when nothing matches; only storage failures and
/// violated preconditions are errors.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait Repository: Send + Sync {
    // =========================================================================
    // Users
    // =========================================================================

    fn add_user(&self, user: Arc<User>) -> RepositoryResult<()>;

    /// The user name is trimmed and matched case-insensitively.
    fn get_user(&self, user_name: &str) -> RepositoryResult<Option<Arc<User>>>;

    // =========================================================================
    // Tracks
    // =========================================================================

    fn add_track(&self, track: Arc<Track>) -> RepositoryResult<()>;

    fn add_many_tracks(&self, tracks: Vec<Arc<Track>>) -> RepositoryResult<()>;

    fn get_track(&self, track_id: i64) -> RepositoryResult<Option<Arc<Track>>>;

    /// Returns all tracks, ordered by title collation when `sorted` is set.
    fn get_tracks(&self, sorted: bool) -> RepositoryResult<Vec<Arc<Track>>>;

    fn get_tracks_by_album(&self, album_id: i64) -> RepositoryResult<Vec<Arc<Track>>>;

    fn get_number_of_tracks(&self) -> RepositoryResult<usize>;

    // =========================================================================
    // Artists
    // =========================================================================

    fn add_artist(&self, artist: Arc<Artist>) -> RepositoryResult<()>;

    fn add_many_artists(&self, artists: Vec<Arc<Artist>>) -> RepositoryResult<()>;

    fn get_artists(&self) -> RepositoryResult<Vec<Arc<Artist>>>;

    fn get_number_of_artists(&self) -> RepositoryResult<usize>;

    // =========================================================================
    // Albums
    // =========================================================================

    fn add_album(&self, album: Arc<Album>) -> RepositoryResult<()>;

    fn add_many_albums(&self, albums: Vec<Arc<Album>>) -> RepositoryResult<()>;

    /// Returns all albums, ordered by title when `sorted` is set.
    fn get_albums(&self, sorted: bool) -> RepositoryResult<Vec<Arc<Album>>>;

    fn get_album(&self, album_id: i64) -> RepositoryResult<Option<Arc<Album>>>;

    fn get_number_of_albums(&self) -> RepositoryResult<usize>;

    // =========================================================================
    // Genres
    // =========================================================================

    fn add_genre(&self, genre: Arc<Genre>) -> RepositoryResult<()>;

    fn add_many_genres(&self, genres: Vec<Arc<Genre>>) -> RepositoryResult<()>;

    fn get_genres(&self) -> RepositoryResult<Vec<Arc<Genre>>>;

    fn get_number_of_genres(&self) -> RepositoryResult<usize>;

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Adds a review. Fails with [`RepositoryError::UnreferencedReview`] and leaves the
    /// repository untouched when the review has no track.
    ///
    /// Implementations provide [`Repository::insert_review`] and keep this method as is.
    fn add_review(&self, review: Arc<Review>) -> RepositoryResult<()> {
        let checked = CheckedReview::check(review)?;
        self.insert_review(checked)
    }

    /// Backend-specific storage of a review that already passed the shared checks.
    fn insert_review(&self, review: CheckedReview) -> RepositoryResult<()>;

    fn get_reviews_for_track(&self, track_id: i64) -> RepositoryResult<Vec<Arc<Review>>>;

    // =========================================================================
    // Search
    // =========================================================================

    /// Tracks whose `field` contains `query`, ignoring case and surrounding whitespace.
    fn search_tracks(&self, field: SearchField, query: &str)
        -> RepositoryResult<Vec<Arc<Track>>>;

    fn search_tracks_by_title(&self, query: &str) -> RepositoryResult<Vec<Arc<Track>>> {
        self.search_tracks(SearchField::Title, query)
    }

    fn search_tracks_by_artist(&self, query: &str) -> RepositoryResult<Vec<Arc<Track>>> {
        self.search_tracks(SearchField::Artist, query)
    }

    fn search_tracks_by_album(&self, query: &str) -> RepositoryResult<Vec<Arc<Track>>> {
        self.search_tracks(SearchField::Album, query)
    }

    fn search_tracks_by_genre(&self, query: &str) -> RepositoryResult<Vec<Arc<Track>>> {
        self.search_tracks(SearchField::Genre, query)
    }

    // =========================================================================
    // Session hooks
    // =========================================================================

    /// Replaces the current storage session with a fresh one. No-op for backends
    /// without sessions.
    fn reset_session(&self) -> RepositoryResult<()> {
        Ok(())
    }

    /// Closes the current storage session. No-op for backends without sessions.
    fn close_session(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
