//! SQLite repository behaviour on the loaded fixture.

mod common;

use common::*;
use music_catalog::model::{Review, Track};
use music_catalog::{Repository, RepositoryError, SqliteRepository};
use std::sync::Arc;

fn titles(tracks: &[Arc<Track>]) -> Vec<&str> {
    tracks.iter().map(|t| t.title().unwrap_or_default()).collect()
}

#[test]
fn search_matches_substrings_ignoring_case() {
    let (repo, _temp_dir) = tmp_sqlite_repo();
    let tracks = [(1, "New track 1"), (2, "New track 2"), (3, "Random track")]
        .into_iter()
        .map(|(id, title)| Arc::new(Track::new(id, Some(title)).unwrap()))
        .collect();
    repo.add_many_tracks(tracks).unwrap();

    assert_eq!(
        titles(&repo.search_tracks_by_title("new track").unwrap()),
        vec!["New track 1", "New track 2"]
    );
    assert_eq!(repo.search_tracks_by_title("  NEW ").unwrap().len(), 2);
    assert_eq!(repo.search_tracks_by_title("track").unwrap().len(), 3);
}

#[test]
fn search_results_match_the_memory_repository() {
    let memory = loaded_memory_repo();
    let (sqlite, _temp_dir) = loaded_sqlite_repo();

    for query in ["o", "nicky", "  AWOL ", "zzz"] {
        assert_eq!(
            titles(&sqlite.search_tracks_by_artist(query).unwrap()),
            titles(&memory.search_tracks_by_artist(query).unwrap())
        );
        assert_eq!(
            titles(&sqlite.search_tracks_by_title(query).unwrap()),
            titles(&memory.search_tracks_by_title(query).unwrap())
        );
    }
    for query in ["pop", "avant", "rock"] {
        assert_eq!(
            titles(&sqlite.search_tracks_by_genre(query).unwrap()),
            titles(&memory.search_tracks_by_genre(query).unwrap())
        );
    }
    assert_eq!(
        titles(&sqlite.search_tracks_by_album("unicorn").unwrap()),
        vec!["1-2-3 Go!"]
    );
}

#[test]
fn re_adding_a_track_replaces_the_row() {
    let (repo, _temp_dir) = loaded_sqlite_repo();
    let renamed = Track::new(TRACK_FOOD_ID, Some("Food (remix)")).unwrap();
    repo.add_track(Arc::new(renamed)).unwrap();

    assert_eq!(repo.get_number_of_tracks().unwrap(), FIXTURE_TRACKS);
    let food = repo.get_track(TRACK_FOOD_ID).unwrap().unwrap();
    assert_eq!(food.title(), Some("Food (remix)"));
    assert!(food.album().is_none());
    assert!(food.genres().is_empty());
    // Related rows stay in place for the other tracks.
    assert_eq!(repo.get_number_of_albums().unwrap(), FIXTURE_ALBUMS);
    assert_eq!(
        repo.get_tracks_by_album(ALBUM_AWOL_ID).unwrap().len(),
        ALBUM_AWOL_TRACKS - 1
    );
}

#[test]
fn albums_sort_by_title_ignoring_case() {
    let (repo, _temp_dir) = loaded_sqlite_repo();
    let ids: Vec<i64> = repo
        .get_albums(true)
        .unwrap()
        .iter()
        .map(|a| a.id())
        .collect();
    assert_eq!(ids, vec![60, 1, 6, 4, 9]);
}

#[test]
fn reviews_persist_across_reopening() {
    let (repo, temp_dir) = sqlite_repo_with_users();

    let err = repo
        .add_review(Arc::new(Review::new(None, "Great", 5)))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UnreferencedReview));

    let food = repo.get_track(TRACK_FOOD_ID).unwrap();
    let user = repo.get_user(USER_FMERCURY).unwrap();
    repo.add_review(Arc::new(Review::new(food, "  Tasty  ", 4).with_user(user)))
        .unwrap();
    repo.close_session().unwrap();
    drop(repo);

    let reopened = SqliteRepository::open(temp_dir.path().join("catalog.db")).unwrap();
    let reviews = reopened.get_reviews_for_track(TRACK_FOOD_ID).unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].text(), "Tasty");
    assert_eq!(reviews[0].rating(), 4);
    assert_eq!(reviews[0].user().unwrap().user_name(), USER_FMERCURY);
    assert_eq!(reviews[0].track().unwrap().title(), Some(TRACK_FOOD_TITLE));
}

#[test]
fn user_lookup_ignores_case_and_whitespace() {
    let (repo, _temp_dir) = sqlite_repo_with_users();
    let user = repo.get_user("  THorke ").unwrap().unwrap();
    assert_eq!(user.user_name(), USER_THORKE);
    assert!(repo.get_user("nobody").unwrap().is_none());
}

#[test]
fn unknown_ids_are_absent() {
    let (repo, _temp_dir) = loaded_sqlite_repo();
    assert!(repo.get_track(MISSING_ID).unwrap().is_none());
    assert!(repo.get_album(MISSING_ID).unwrap().is_none());
    assert!(repo.get_tracks_by_album(MISSING_ID).unwrap().is_empty());
    assert!(repo.get_reviews_for_track(MISSING_ID).unwrap().is_empty());
}

#[test]
fn reopening_a_foreign_database_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("foreign.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE playlists (id INTEGER PRIMARY KEY)", [])
            .unwrap();
    }
    assert!(SqliteRepository::open(&path).is_err());
}
