//! In-memory repository.
//!
//! Entities are kept as shared `Arc`s, callers get back the very instances they added.
//! Tracks live in a vector ordered by title collation plus an id index, both guarded by
//! the same lock so concurrent inserts cannot break the ordering.

use super::query::{filter_tracks, sort_albums_by_title, SearchField};
use super::trait_def::{CheckedReview, Repository, RepositoryError, RepositoryResult};
use crate::model::{normalize_user_name, Album, Artist, Genre, Review, Track, User};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Default)]
struct MemoryState {
    users: Vec<Arc<User>>,
    tracks: Vec<Arc<Track>>,
    tracks_by_id: HashMap<i64, Arc<Track>>,
    artists: BTreeMap<i64, Arc<Artist>>,
    albums: BTreeMap<i64, Arc<Album>>,
    genres: BTreeMap<i64, Arc<Genre>>,
    reviews: Vec<Arc<Review>>,
}

impl MemoryState {
    /// Binary-search insert keeping `tracks` in title order. Equal titles keep
    /// insertion order, the new track goes before them.
    fn insert_track(&mut self, track: Arc<Track>) {
        let position = self
            .tracks
            .partition_point(|t| t.cmp_by_title(&track).is_lt());
        self.tracks.insert(position, track.clone());
        self.tracks_by_id.insert(track.id(), track);
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, MemoryState>> {
        self.state.read().map_err(|_| RepositoryError::Poisoned)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state.write().map_err(|_| RepositoryError::Poisoned)
    }
}

impl Repository for MemoryRepository {
    fn add_user(&self, user: Arc<User>) -> RepositoryResult<()> {
        self.write()?.users.push(user);
        Ok(())
    }

    fn get_user(&self, user_name: &str) -> RepositoryResult<Option<Arc<User>>> {
        let user_name = normalize_user_name(user_name);
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.user_name() == user_name)
            .cloned())
    }

    fn add_track(&self, track: Arc<Track>) -> RepositoryResult<()> {
        self.write()?.insert_track(track);
        Ok(())
    }

    fn add_many_tracks(&self, tracks: Vec<Arc<Track>>) -> RepositoryResult<()> {
        let mut state = self.write()?;
        debug!("Adding {} tracks", tracks.len());
        for track in tracks {
            state.insert_track(track);
        }
        Ok(())
    }

    fn get_track(&self, track_id: i64) -> RepositoryResult<Option<Arc<Track>>> {
        Ok(self.read()?.tracks_by_id.get(&track_id).cloned())
    }

    fn get_tracks(&self, _sorted: bool) -> RepositoryResult<Vec<Arc<Track>>> {
        // Always in title order already.
        Ok(self.read()?.tracks.clone())
    }

    fn get_tracks_by_album(&self, album_id: i64) -> RepositoryResult<Vec<Arc<Track>>> {
        Ok(self
            .read()?
            .tracks
            .iter()
            .filter(|t| t.album().is_some_and(|a| a.id() == album_id))
            .cloned()
            .collect())
    }

    fn get_number_of_tracks(&self) -> RepositoryResult<usize> {
        Ok(self.read()?.tracks.len())
    }

    fn add_artist(&self, artist: Arc<Artist>) -> RepositoryResult<()> {
        self.write()?.artists.entry(artist.id()).or_insert(artist);
        Ok(())
    }

    fn add_many_artists(&self, artists: Vec<Arc<Artist>>) -> RepositoryResult<()> {
        let mut state = self.write()?;
        for artist in artists {
            state.artists.entry(artist.id()).or_insert(artist);
        }
        Ok(())
    }

    fn get_artists(&self) -> RepositoryResult<Vec<Arc<Artist>>> {
        Ok(self.read()?.artists.values().cloned().collect())
    }

    fn get_number_of_artists(&self) -> RepositoryResult<usize> {
        Ok(self.read()?.artists.len())
    }

    fn add_album(&self, album: Arc<Album>) -> RepositoryResult<()> {
        self.write()?.albums.entry(album.id()).or_insert(album);
        Ok(())
    }

    fn add_many_albums(&self, albums: Vec<Arc<Album>>) -> RepositoryResult<()> {
        let mut state = self.write()?;
        for album in albums {
            state.albums.entry(album.id()).or_insert(album);
        }
        Ok(())
    }

    fn get_albums(&self, sorted: bool) -> RepositoryResult<Vec<Arc<Album>>> {
        let mut albums: Vec<Arc<Album>> = self.read()?.albums.values().cloned().collect();
        if sorted {
            sort_albums_by_title(&mut albums);
        }
        Ok(albums)
    }

    fn get_album(&self, album_id: i64) -> RepositoryResult<Option<Arc<Album>>> {
        Ok(self.read()?.albums.get(&album_id).cloned())
    }

    fn get_number_of_albums(&self) -> RepositoryResult<usize> {
        Ok(self.read()?.albums.len())
    }

    fn add_genre(&self, genre: Arc<Genre>) -> RepositoryResult<()> {
        self.write()?.genres.entry(genre.id()).or_insert(genre);
        Ok(())
    }

    fn add_many_genres(&self, genres: Vec<Arc<Genre>>) -> RepositoryResult<()> {
        let mut state = self.write()?;
        for genre in genres {
            state.genres.entry(genre.id()).or_insert(genre);
        }
        Ok(())
    }

    fn get_genres(&self) -> RepositoryResult<Vec<Arc<Genre>>> {
        Ok(self.read()?.genres.values().cloned().collect())
    }

    fn get_number_of_genres(&self) -> RepositoryResult<usize> {
        Ok(self.read()?.genres.len())
    }

    fn insert_review(&self, review: CheckedReview) -> RepositoryResult<()> {
        self.write()?.reviews.push(review.review().clone());
        Ok(())
    }

    fn get_reviews_for_track(&self, track_id: i64) -> RepositoryResult<Vec<Arc<Review>>> {
        Ok(self
            .read()?
            .reviews
            .iter()
            .filter(|r| r.track().is_some_and(|t| t.id() == track_id))
            .cloned()
            .collect())
    }

    fn search_tracks(
        &self,
        field: SearchField,
        query: &str,
    ) -> RepositoryResult<Vec<Arc<Track>>> {
        Ok(filter_tracks(self.read()?.tracks.iter(), field, query))
    }
}
