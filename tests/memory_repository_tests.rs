//! In-memory repository behaviour on the loaded fixture.

mod common;

use common::*;
use music_catalog::model::{Review, Track};
use music_catalog::repository::SearchField;
use music_catalog::{MemoryRepository, Repository, RepositoryError};
use std::sync::Arc;

fn titles(tracks: &[Arc<Track>]) -> Vec<&str> {
    tracks.iter().map(|t| t.title().unwrap_or_default()).collect()
}

#[test]
fn search_matches_substrings_ignoring_case() {
    let repo = MemoryRepository::new();
    for (id, title) in [(1, "New track 1"), (2, "New track 2"), (3, "Random track")] {
        repo.add_track(Arc::new(Track::new(id, Some(title)).unwrap()))
            .unwrap();
    }

    assert_eq!(repo.search_tracks_by_title("new track").unwrap().len(), 2);
    assert_eq!(repo.search_tracks_by_title("  NEW ").unwrap().len(), 2);
    assert_eq!(repo.search_tracks_by_title("track").unwrap().len(), 3);
    assert!(repo.search_tracks_by_title("unicorn").unwrap().is_empty());
}

#[test]
fn searches_every_field_of_the_fixture() {
    let repo = loaded_memory_repo();

    let by_artist = repo.search_tracks_by_artist("nicky").unwrap();
    assert_eq!(
        titles(&by_artist),
        vec!["Spiritual Level", "Too Happy", "Where is your Love?", "Yosemite"]
    );

    let by_album = repo.search_tracks_by_album("way of life").unwrap();
    assert_eq!(titles(&by_album), vec!["Electric Ave", "Food", "This World"]);

    let by_genre = repo.search_tracks_by_genre("avant").unwrap();
    assert_eq!(titles(&by_genre), vec!["Light of Light", "1-2-3 Go!"]);

    let by_field = repo.search_tracks(SearchField::Genre, "pop").unwrap();
    assert_eq!(by_field.len(), 5);
}

#[test]
fn sorted_listing_follows_title_collation() {
    let repo = loaded_memory_repo();
    assert_eq!(titles(&repo.get_tracks(true).unwrap()), SORTED_TITLES);
}

#[test]
fn albums_sort_by_title_ignoring_case() {
    let repo = loaded_memory_repo();
    let ids: Vec<i64> = repo
        .get_albums(true)
        .unwrap()
        .iter()
        .map(|a| a.id())
        .collect();
    assert_eq!(ids, vec![60, 1, 6, 4, 9]);
}

#[test]
fn tracks_share_the_loaded_album() {
    let repo = loaded_memory_repo();
    let album_tracks = repo.get_tracks_by_album(ALBUM_AWOL_ID).unwrap();
    let album = repo.get_album(ALBUM_AWOL_ID).unwrap().unwrap();

    assert_eq!(album_tracks.len(), ALBUM_AWOL_TRACKS);
    for track in &album_tracks {
        assert!(Arc::ptr_eq(track.album().unwrap(), &album));
    }
}

#[test]
fn re_adding_a_track_keeps_both_copies() {
    let repo = loaded_memory_repo();
    let renamed = Track::new(TRACK_FOOD_ID, Some("Food (remix)")).unwrap();
    repo.add_track(Arc::new(renamed)).unwrap();

    assert_eq!(repo.get_number_of_tracks().unwrap(), FIXTURE_TRACKS + 1);
    assert_eq!(
        repo.get_track(TRACK_FOOD_ID).unwrap().unwrap().title(),
        Some("Food (remix)")
    );
}

#[test]
fn unknown_ids_are_absent() {
    let repo = loaded_memory_repo();
    assert!(repo.get_track(MISSING_ID).unwrap().is_none());
    assert!(repo.get_album(MISSING_ID).unwrap().is_none());
    assert!(repo.get_tracks_by_album(MISSING_ID).unwrap().is_empty());
    assert!(repo.get_reviews_for_track(MISSING_ID).unwrap().is_empty());
    assert!(repo.get_user("nobody").unwrap().is_none());
}

#[test]
fn reviews_need_a_track() {
    let repo = memory_repo_with_users();
    let err = repo
        .add_review(Arc::new(Review::new(None, "Great", 5)))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UnreferencedReview));

    let food = repo.get_track(TRACK_FOOD_ID).unwrap();
    let user = repo.get_user(USER_THORKE).unwrap();
    let review = Review::new(food, "Great", 5).with_user(user);
    repo.add_review(Arc::new(review)).unwrap();

    let reviews = repo.get_reviews_for_track(TRACK_FOOD_ID).unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].user().unwrap().user_name(), USER_THORKE);
}

#[test]
fn session_hooks_are_no_ops() {
    let repo = loaded_memory_repo();
    repo.reset_session().unwrap();
    repo.close_session().unwrap();
    assert_eq!(repo.get_number_of_tracks().unwrap(), FIXTURE_TRACKS);
}
