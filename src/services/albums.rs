use super::tracks::{track_records, TrackRecord};
use super::{page_bounds, ServiceError, ServiceResult};
use crate::model::Album;
use crate::repository::Repository;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumRecord {
    pub album_id: i64,
    pub title: String,
    pub album_url: Option<String>,
    pub release_year: Option<i32>,
    pub album_type: Option<String>,
    pub index: Option<usize>,
    /// Only filled in by [`get_album`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<TrackRecord>>,
}

pub fn album_record(album: &Album, index: Option<usize>) -> AlbumRecord {
    AlbumRecord {
        album_id: album.id(),
        title: album.title().to_string(),
        album_url: album.url().map(str::to_string),
        release_year: album.release_year(),
        album_type: album.album_type().map(str::to_string),
        index,
        tracks: None,
    }
}

pub fn get_number_of_albums(repo: &dyn Repository) -> ServiceResult<usize> {
    Ok(repo.get_number_of_albums()?)
}

/// Albums ordered by title, split in pages of `albums_per_page`.
pub fn get_albums_for_page(
    repo: &dyn Repository,
    page_index: i64,
    albums_per_page: usize,
) -> ServiceResult<Vec<AlbumRecord>> {
    let albums = repo.get_albums(true)?;
    let bounds = page_bounds(page_index, albums_per_page, albums.len())?;
    Ok(albums[bounds.clone()]
        .iter()
        .zip(bounds)
        .map(|(album, index)| album_record(album, Some(index)))
        .collect())
}

pub fn get_album(repo: &dyn Repository, album_id: i64) -> ServiceResult<AlbumRecord> {
    let album = repo
        .get_album(album_id)?
        .ok_or(ServiceError::NonExistentAlbum(album_id))?;
    let tracks = repo.get_tracks_by_album(album_id)?;

    let mut record = album_record(&album, None);
    record.tracks = Some(track_records(&tracks, 0));
    Ok(record)
}
