use anyhow::Result;
use serde::Deserialize;

/// Raw album row. Every field is the unparsed cell text, absent or blank cells are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlbumRow {
    pub album_id: Option<String>,
    pub album_title: Option<String>,
    pub album_url: Option<String>,
    pub album_type: Option<String>,
    pub album_year_released: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenreCell {
    pub genre_id: Option<String>,
    pub genre_title: Option<String>,
}

/// Raw track row, same conventions as [`AlbumRow`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackRow {
    pub track_id: Option<String>,
    pub track_title: Option<String>,
    pub track_url: Option<String>,
    pub track_duration: Option<String>,
    pub album_id: Option<String>,
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub track_genres: Vec<GenreCell>,
}

/// Supplier of the tabular rows the catalog is loaded from.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RowSource {
    fn album_rows(&self) -> Result<Vec<AlbumRow>>;

    fn track_rows(&self) -> Result<Vec<TrackRow>>;
}

/// Rows held in memory, handy for seeding a repository from code.
#[derive(Debug, Clone, Default)]
pub struct StaticRowSource {
    pub albums: Vec<AlbumRow>,
    pub tracks: Vec<TrackRow>,
}

impl RowSource for StaticRowSource {
    fn album_rows(&self) -> Result<Vec<AlbumRow>> {
        Ok(self.albums.clone())
    }

    fn track_rows(&self) -> Result<Vec<TrackRow>> {
        Ok(self.tracks.clone())
    }
}

/// Returns the trimmed cell content, treating blank cells as missing.
pub(crate) fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
