use super::{Track, ValidationError};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// User names are compared trimmed and lowercased.
pub fn normalize_user_name(user_name: &str) -> String {
    user_name.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct User {
    user_name: String,
    /// Salted hash produced by the credential hasher, never the clear text password.
    password: String,
    liked_tracks: Vec<Arc<Track>>,
}

impl User {
    pub fn new(user_name: &str, password_hash: &str) -> Result<Self, ValidationError> {
        let user_name = normalize_user_name(user_name);
        if user_name.is_empty() {
            return Err(ValidationError::EmptyUserName);
        }
        Ok(User {
            user_name,
            password: password_hash.to_string(),
            liked_tracks: vec![],
        })
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn liked_tracks(&self) -> &[Arc<Track>] {
        &self.liked_tracks
    }

    pub fn add_liked_track(&mut self, track: Arc<Track>) {
        if !self.liked_tracks.contains(&track) {
            self.liked_tracks.push(track);
        }
    }

    pub fn remove_liked_track(&mut self, track: &Track) {
        self.liked_tracks.retain(|t| t.as_ref() != track);
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.user_name == other.user_name
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.user_name.hash(state);
    }
}

impl PartialOrd for User {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for User {
    fn cmp(&self, other: &Self) -> Ordering {
        self.user_name.cmp(&other.user_name)
    }
}
