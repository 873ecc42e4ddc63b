use super::error::check_id;
use super::{Album, Artist, EntityKind, EntityRef, Genre, ValidationError};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Track {
    id: i64,
    title: Option<String>,
    url: Option<String>,
    /// Seconds.
    duration: Option<i64>,
    artist: Option<Arc<Artist>>,
    album: Option<Arc<Album>>,
    genres: Vec<Arc<Genre>>,
}

impl Track {
    pub fn new(id: i64, title: Option<&str>) -> Result<Self, ValidationError> {
        let mut track = Track {
            id: check_id(EntityKind::Track, id)?,
            title: None,
            url: None,
            duration: None,
            artist: None,
            album: None,
            genres: vec![],
        };
        track.set_title(title);
        Ok(track)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Blank titles are stored as no title.
    pub fn set_title(&mut self, title: Option<&str>) {
        self.title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: Option<&str>) {
        self.url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
    }

    pub fn duration(&self) -> Option<i64> {
        self.duration
    }

    /// Sets the duration in seconds. A negative value clears the current duration
    /// and is reported as an error.
    pub fn set_duration(&mut self, seconds: i64) -> Result<(), ValidationError> {
        self.duration = None;
        if seconds < 0 {
            return Err(ValidationError::NegativeDuration(seconds));
        }
        self.duration = Some(seconds);
        Ok(())
    }

    pub fn artist(&self) -> Option<&Arc<Artist>> {
        self.artist.as_ref()
    }

    /// Anything other than an artist reference resets the artist to none.
    pub fn set_artist(&mut self, artist: impl Into<EntityRef>) {
        self.artist = match artist.into() {
            EntityRef::Artist(artist) => Some(artist),
            _ => None,
        };
    }

    pub fn album(&self) -> Option<&Arc<Album>> {
        self.album.as_ref()
    }

    /// Anything other than an album reference resets the album to none.
    pub fn set_album(&mut self, album: impl Into<EntityRef>) {
        self.album = match album.into() {
            EntityRef::Album(album) => Some(album),
            _ => None,
        };
    }

    pub fn genres(&self) -> &[Arc<Genre>] {
        &self.genres
    }

    /// Appends a genre. Non-genre references and genres already present are ignored.
    pub fn add_genre(&mut self, genre: impl Into<EntityRef>) {
        if let EntityRef::Genre(genre) = genre.into() {
            if !self.genres.iter().any(|g| g.id() == genre.id()) {
                self.genres.push(genre);
            }
        }
    }

    pub fn cmp_by_title(&self, other: &Track) -> Ordering {
        compare_titles(self.title(), other.title())
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn starts_alphabetic(title: &str) -> bool {
    title.chars().next().is_some_and(char::is_alphabetic)
}

/// Title collation used to keep tracks ordered.
///
/// Titles starting with a letter come first, compared case-insensitively, followed by the
/// remaining titles compared the same way. Missing or empty titles sort last.
pub fn compare_titles(a: Option<&str>, b: Option<&str>) -> Ordering {
    let a = a.map(str::trim).filter(|t| !t.is_empty());
    let b = b.map(str::trim).filter(|t| !t.is_empty());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (starts_alphabetic(a), starts_alphabetic(b)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.to_lowercase().cmp(&b.to_lowercase()),
        },
    }
}

/// Parses a raw duration field: `"mm:ss"`, `"hh:mm:ss"` or a plain number of seconds.
pub fn parse_duration(raw: &str) -> Result<i64, ValidationError> {
    let malformed = || ValidationError::MalformedDuration(raw.to_string());
    let raw_trimmed = raw.trim();
    if raw_trimmed.is_empty() {
        return Err(malformed());
    }

    let mut seconds: i64 = 0;
    let parts: Vec<&str> = raw_trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(malformed());
    }
    for (index, part) in parts.iter().enumerate() {
        let value = part.trim().parse::<i64>().map_err(|_| malformed())?;
        if index > 0 && !(0..60).contains(&value) {
            return Err(malformed());
        }
        seconds = seconds
            .checked_mul(60)
            .and_then(|s| s.checked_add(value))
            .ok_or_else(malformed)?;
    }

    if seconds < 0 {
        return Err(ValidationError::NegativeDuration(seconds));
    }
    Ok(seconds)
}
