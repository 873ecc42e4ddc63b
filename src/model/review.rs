use super::{Track, User};
use chrono::{NaiveDateTime, Utc};
use std::sync::Arc;

/// A user's review of a track.
///
/// A review without a track can be built but is refused by every repository.
/// The rating is not range-checked here, the service layer does that.
#[derive(Debug, Clone)]
pub struct Review {
    track: Option<Arc<Track>>,
    text: String,
    rating: i32,
    timestamp: NaiveDateTime,
    user: Option<Arc<User>>,
}

impl Review {
    pub fn new(track: Option<Arc<Track>>, text: &str, rating: i32) -> Self {
        Self::with_timestamp(track, text, rating, Utc::now().naive_utc())
    }

    pub fn with_timestamp(
        track: Option<Arc<Track>>,
        text: &str,
        rating: i32,
        timestamp: NaiveDateTime,
    ) -> Self {
        Review {
            track,
            text: text.trim().to_string(),
            rating,
            timestamp,
            user: None,
        }
    }

    pub fn with_user(mut self, user: Option<Arc<User>>) -> Self {
        self.user = user;
        self
    }

    pub fn track(&self) -> Option<&Arc<Track>> {
        self.track.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }
}
