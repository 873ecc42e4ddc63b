use super::{page_bounds, ServiceError, ServiceResult};
use crate::model::{normalize_user_name, Review, Track};
use crate::repository::{Repository, SearchField};
use serde::Serialize;
use std::sync::Arc;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub track_id: i64,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_id: Option<i64>,
    pub album: Option<String>,
    pub track_url: Option<String>,
    /// `m:ss`
    pub track_duration: Option<String>,
    /// Genre names joined with `", "`.
    pub genres: String,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRecord {
    pub review_text: String,
    pub rating: i32,
    pub user: Option<String>,
    pub track: Option<String>,
    /// `%d %b, %Y`, e.g. `28 Feb, 2020`.
    pub timestamp: String,
}

pub fn format_duration(total_seconds: i64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

pub fn track_record(track: &Track, index: Option<usize>) -> TrackRecord {
    TrackRecord {
        track_id: track.id(),
        title: track.title().map(str::to_string),
        artist: track.artist().map(|a| a.full_name().to_string()),
        album_id: track.album().map(|a| a.id()),
        album: track.album().map(|a| a.title().to_string()),
        track_url: track.url().map(str::to_string),
        track_duration: track.duration().map(format_duration),
        genres: track
            .genres()
            .iter()
            .map(|g| g.name())
            .collect::<Vec<_>>()
            .join(", "),
        index,
    }
}

pub(crate) fn track_records(tracks: &[Arc<Track>], start_index: usize) -> Vec<TrackRecord> {
    tracks
        .iter()
        .enumerate()
        .map(|(offset, track)| track_record(track, Some(start_index + offset)))
        .collect()
}

pub fn review_record(review: &Review) -> ReviewRecord {
    ReviewRecord {
        review_text: review.text().to_string(),
        rating: review.rating(),
        user: review.user().map(|u| u.user_name().to_string()),
        track: review.track().and_then(|t| t.title()).map(str::to_string),
        timestamp: review.timestamp().format("%d %b, %Y").to_string(),
    }
}

pub fn get_track(repo: &dyn Repository, track_id: i64) -> ServiceResult<Option<TrackRecord>> {
    Ok(repo.get_track(track_id)?.map(|t| track_record(&t, None)))
}

pub fn get_number_of_tracks(repo: &dyn Repository) -> ServiceResult<usize> {
    Ok(repo.get_number_of_tracks()?)
}

pub fn get_tracks_for_page(
    repo: &dyn Repository,
    page_index: i64,
    tracks_per_page: usize,
) -> ServiceResult<Vec<TrackRecord>> {
    let tracks = repo.get_tracks(true)?;
    let bounds = page_bounds(page_index, tracks_per_page, tracks.len())?;
    let start = bounds.start;
    Ok(track_records(&tracks[bounds], start))
}

/// `search_key` is one of `title`, `artist`, `album` or `genre`, in any case.
pub fn get_tracks_for_search(
    repo: &dyn Repository,
    search_key: &str,
    text: &str,
) -> ServiceResult<Vec<TrackRecord>> {
    let field: SearchField = search_key
        .parse()
        .map_err(|_| ServiceError::InvalidSearchKey(search_key.trim().to_lowercase()))?;
    let tracks = repo.search_tracks(field, text)?;
    Ok(track_records(&tracks, 0))
}

/// Adds a review by `user_name`. A user reviewing the same track a second time is ignored.
pub fn add_review(
    repo: &dyn Repository,
    track_id: i64,
    user_name: &str,
    review_text: &str,
    rating: i32,
) -> ServiceResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ServiceError::InvalidRating(rating));
    }

    let user_name = normalize_user_name(user_name);
    let already_reviewed = repo
        .get_reviews_for_track(track_id)?
        .iter()
        .any(|r| r.user().is_some_and(|u| u.user_name() == user_name));
    if already_reviewed {
        return Ok(());
    }

    let track = repo
        .get_track(track_id)?
        .ok_or(ServiceError::NonExistentTrack(track_id))?;
    let user = repo
        .get_user(&user_name)?
        .ok_or_else(|| ServiceError::UnknownUser(user_name.clone()))?;

    let review = Review::new(Some(track), review_text, rating).with_user(Some(user));
    repo.add_review(Arc::new(review))?;
    Ok(())
}

pub fn get_reviews_for_track(
    repo: &dyn Repository,
    track_id: i64,
) -> ServiceResult<Vec<ReviewRecord>> {
    Ok(repo
        .get_reviews_for_track(track_id)?
        .iter()
        .map(|r| review_record(r))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Album, Artist, Genre};
    use chrono::NaiveDate;

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(168), "2:48");
        assert_eq!(format_duration(61), "1:01");
        assert_eq!(format_duration(0), "0:00");
    }

    #[test]
    fn builds_track_record() {
        let mut track = Track::new(48, Some("Light of Light")).unwrap();
        track.set_duration(255).unwrap();
        track.set_artist(Artist::new(13, "Here Comes A Big Black Cloud!!").unwrap());
        track.set_album(Album::new(9, "Trick or Treat").unwrap());
        track.add_genre(Genre::new(12, "Rock").unwrap());
        track.add_genre(Genre::new(1, "Avant-Garde").unwrap());

        let record = track_record(&track, Some(3));
        assert_eq!(record.genres, "Rock, Avant-Garde");
        assert_eq!(record.track_duration.as_deref(), Some("4:15"));
        assert_eq!(record.album_id, Some(9));
        assert_eq!(record.index, Some(3));
    }

    #[test]
    fn formats_review_dates() {
        let timestamp = NaiveDate::from_ymd_opt(2020, 2, 28)
            .unwrap()
            .and_hms_opt(14, 31, 26)
            .unwrap();
        let review = Review::with_timestamp(None, " Loved it ", 4, timestamp);
        let record = review_record(&review);
        assert_eq!(record.timestamp, "28 Feb, 2020");
        assert_eq!(record.review_text, "Loved it");
        assert!(record.user.is_none());
    }
}
