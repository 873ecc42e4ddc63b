//! Search and ordering helpers shared by the repository implementations.

use crate::model::{Album, Track};
use std::str::FromStr;
use std::sync::Arc;

/// Track attribute a substring search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Artist,
    Album,
    Genre,
}

impl FromStr for SearchField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "artist" => Ok(SearchField::Artist),
            "album" => Ok(SearchField::Album),
            "genre" => Ok(SearchField::Genre),
            _ => anyhow::bail!("Unknown search field \"{}\"", s),
        }
    }
}

/// Case-insensitive substring check, the query is trimmed first.
pub fn matches_query(value: &str, query: &str) -> bool {
    value
        .to_lowercase()
        .contains(&query.trim().to_lowercase())
}

pub fn track_matches(track: &Track, field: SearchField, query: &str) -> bool {
    match field {
        SearchField::Title => matches_query(track.title().unwrap_or_default(), query),
        SearchField::Artist => matches_query(
            track.artist().map(|a| a.full_name()).unwrap_or_default(),
            query,
        ),
        SearchField::Album => {
            matches_query(track.album().map(|a| a.title()).unwrap_or_default(), query)
        }
        SearchField::Genre => track.genres().iter().any(|g| matches_query(g.name(), query)),
    }
}

pub fn filter_tracks<'a, I>(tracks: I, field: SearchField, query: &str) -> Vec<Arc<Track>>
where
    I: IntoIterator<Item = &'a Arc<Track>>,
{
    tracks
        .into_iter()
        .filter(|t| track_matches(t, field, query))
        .cloned()
        .collect()
}

pub fn sort_albums_by_title(albums: &mut [Arc<Album>]) {
    albums.sort_by(|a, b| {
        a.title()
            .to_lowercase()
            .cmp(&b.title().to_lowercase())
            .then(a.id().cmp(&b.id()))
    });
}
