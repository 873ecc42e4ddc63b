use super::error::check_id;
use super::{EntityKind, ValidationError};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Album {
    id: i64,
    title: String,
    url: Option<String>,
    album_type: Option<String>,
    release_year: Option<i32>,
}

fn trimmed_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Album {
    pub fn new(id: i64, title: &str) -> Result<Self, ValidationError> {
        Ok(Album {
            id: check_id(EntityKind::Album, id)?,
            title: title.trim().to_string(),
            url: None,
            album_type: None,
            release_year: None,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: Option<&str>) {
        self.url = trimmed_or_none(url);
    }

    pub fn album_type(&self) -> Option<&str> {
        self.album_type.as_deref()
    }

    pub fn set_album_type(&mut self, album_type: Option<&str>) {
        self.album_type = trimmed_or_none(album_type);
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_year
    }

    /// Negative years are dropped rather than rejected.
    pub fn set_release_year(&mut self, year: Option<i32>) {
        self.release_year = year.filter(|y| *y >= 0);
    }
}

impl PartialEq for Album {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Album {}

impl Hash for Album {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
