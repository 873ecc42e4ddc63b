//! Bulk loading of tabular rows into a repository.
//!
//! Rows are turned into entities in a first pass that also groups track ids by the album,
//! artist and genre they reference. A second pass attaches those relationships group by group
//! before everything is handed to the repository through its batch operations.

use super::rows::{cell, AlbumRow, RowSource, TrackRow};
use crate::model::{parse_duration, parse_id, Album, Artist, EntityKind, Genre, Track};
use crate::repository::Repository;
use anyhow::{Context, Result};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// A row, or part of a row, that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProblem {
    MalformedAlbumRow(String),
    MalformedTrackRow(String),
    DuplicateTrack(i64),
    UnknownAlbum { track_id: i64, album_id: i64 },
    MalformedArtist { track_id: i64, detail: String },
    MalformedGenre { track_id: i64, detail: String },
    MalformedDuration { track_id: i64, raw: String },
}

impl fmt::Display for LoadProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadProblem::MalformedAlbumRow(detail) => write!(f, "Skipped album row: {}", detail),
            LoadProblem::MalformedTrackRow(detail) => write!(f, "Skipped track row: {}", detail),
            LoadProblem::DuplicateTrack(id) => write!(f, "Skipped duplicate track {}", id),
            LoadProblem::UnknownAlbum { track_id, album_id } => {
                write!(f, "Track {} references unknown album {}", track_id, album_id)
            }
            LoadProblem::MalformedArtist { track_id, detail } => {
                write!(f, "Track {} has no artist: {}", track_id, detail)
            }
            LoadProblem::MalformedGenre { track_id, detail } => {
                write!(f, "Track {} skipped a genre: {}", track_id, detail)
            }
            LoadProblem::MalformedDuration { track_id, raw } => {
                write!(f, "Track {} has malformed duration \"{}\"", track_id, raw)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub tracks: usize,
    pub artists: usize,
    pub albums: usize,
    pub genres: usize,
    pub problems: Vec<LoadProblem>,
}

/// An entity together with the ids of the tracks referencing it.
struct Group<T> {
    entity: Arc<T>,
    track_ids: Vec<i64>,
}

fn add_to_group<T>(groups: &mut BTreeMap<i64, Group<T>>, id: i64, entity: T, track_id: i64) {
    match groups.entry(id) {
        Entry::Occupied(mut entry) => entry.get_mut().track_ids.push(track_id),
        Entry::Vacant(entry) => {
            entry.insert(Group {
                entity: Arc::new(entity),
                track_ids: vec![track_id],
            });
        }
    }
}

fn parse_album(row: &AlbumRow) -> Result<Album, String> {
    let raw_id = cell(&row.album_id).ok_or("missing album id")?;
    let id = parse_id(EntityKind::Album, raw_id).map_err(|e| e.to_string())?;
    let title = cell(&row.album_title).ok_or_else(|| format!("album {} has no title", id))?;

    let mut album = Album::new(id, title).map_err(|e| e.to_string())?;
    album.set_url(cell(&row.album_url));
    album.set_album_type(cell(&row.album_type));
    album.set_release_year(cell(&row.album_year_released).and_then(parse_year));
    Ok(album)
}

/// Accepts `"2008"` as well as full dates such as `"2008-11-26"`.
fn parse_year(raw: &str) -> Option<i32> {
    raw.split(['-', '/', ' ']).next()?.parse().ok()
}

#[derive(Default)]
struct Pass {
    tracks: BTreeMap<i64, Track>,
    artists: BTreeMap<i64, Group<Artist>>,
    albums: BTreeMap<i64, Group<Album>>,
    genres: BTreeMap<i64, Arc<Genre>>,
    /// Genre ids of each track, in row order.
    track_genres: BTreeMap<i64, Vec<i64>>,
    problems: Vec<LoadProblem>,
}

impl Pass {
    fn read_track(&mut self, row: &TrackRow, albums: &BTreeMap<i64, Album>) {
        let track_id = match cell(&row.track_id).map(|raw| parse_id(EntityKind::Track, raw)) {
            Some(Ok(id)) => id,
            Some(Err(err)) => {
                self.problems
                    .push(LoadProblem::MalformedTrackRow(err.to_string()));
                return;
            }
            None => {
                self.problems
                    .push(LoadProblem::MalformedTrackRow("missing track id".to_string()));
                return;
            }
        };
        if self.tracks.contains_key(&track_id) {
            self.problems.push(LoadProblem::DuplicateTrack(track_id));
            return;
        }

        let mut track = match Track::new(track_id, cell(&row.track_title)) {
            Ok(track) => track,
            Err(err) => {
                self.problems
                    .push(LoadProblem::MalformedTrackRow(err.to_string()));
                return;
            }
        };
        track.set_url(cell(&row.track_url));
        if let Some(raw) = cell(&row.track_duration) {
            let parsed = parse_duration(raw).and_then(|seconds| track.set_duration(seconds));
            if parsed.is_err() {
                self.problems.push(LoadProblem::MalformedDuration {
                    track_id,
                    raw: raw.to_string(),
                });
            }
        }

        // Unparseable or blank album ids leave the track without an album.
        if let Some(album_id) = cell(&row.album_id).and_then(|raw| raw.parse::<i64>().ok()) {
            match albums.get(&album_id) {
                Some(album) => add_to_group(&mut self.albums, album_id, album.clone(), track_id),
                None => self
                    .problems
                    .push(LoadProblem::UnknownAlbum { track_id, album_id }),
            }
        }

        match (cell(&row.artist_id), cell(&row.artist_name)) {
            (Some(raw_id), Some(name)) => {
                match parse_id(EntityKind::Artist, raw_id).and_then(|id| Artist::new(id, name)) {
                    Ok(artist) => add_to_group(&mut self.artists, artist.id(), artist, track_id),
                    Err(err) => self.problems.push(LoadProblem::MalformedArtist {
                        track_id,
                        detail: err.to_string(),
                    }),
                }
            }
            (None, None) => {}
            _ => self.problems.push(LoadProblem::MalformedArtist {
                track_id,
                detail: "artist id and name must both be present".to_string(),
            }),
        }

        for genre_cell in &row.track_genres {
            let genre = match (cell(&genre_cell.genre_id), cell(&genre_cell.genre_title)) {
                (Some(raw_id), Some(name)) => {
                    parse_id(EntityKind::Genre, raw_id).and_then(|id| Genre::new(id, name))
                }
                _ => {
                    self.problems.push(LoadProblem::MalformedGenre {
                        track_id,
                        detail: "genre id and title must both be present".to_string(),
                    });
                    continue;
                }
            };
            match genre {
                Ok(genre) => {
                    let genre_id = genre.id();
                    self.genres.entry(genre_id).or_insert_with(|| Arc::new(genre));
                    self.track_genres.entry(track_id).or_default().push(genre_id);
                }
                Err(err) => self.problems.push(LoadProblem::MalformedGenre {
                    track_id,
                    detail: err.to_string(),
                }),
            }
        }

        self.tracks.insert(track_id, track);
    }

    fn link(&mut self) {
        for group in self.artists.values() {
            for track_id in &group.track_ids {
                if let Some(track) = self.tracks.get_mut(track_id) {
                    track.set_artist(group.entity.clone());
                }
            }
        }
        for group in self.albums.values() {
            for track_id in &group.track_ids {
                if let Some(track) = self.tracks.get_mut(track_id) {
                    track.set_album(group.entity.clone());
                }
            }
        }
        for (track_id, genre_ids) in &self.track_genres {
            if let Some(track) = self.tracks.get_mut(track_id) {
                for genre_id in genre_ids {
                    if let Some(genre) = self.genres.get(genre_id) {
                        track.add_genre(genre.clone());
                    }
                }
            }
        }
    }
}

fn entities<T>(groups: BTreeMap<i64, Group<T>>) -> Vec<Arc<T>> {
    groups.into_values().map(|g| g.entity).collect()
}

/// Loads every row of `source` into `repo`.
///
/// Bad rows are skipped and reported in [`LoadReport::problems`]; only a failing source or
/// repository aborts the load.
pub fn populate(source: &dyn RowSource, repo: &dyn Repository) -> Result<LoadReport> {
    let album_rows = source.album_rows().context("Failed to read album rows")?;
    let track_rows = source.track_rows().context("Failed to read track rows")?;

    let mut pass = Pass::default();
    let mut albums = BTreeMap::new();
    for row in &album_rows {
        match parse_album(row) {
            Ok(album) => {
                albums.insert(album.id(), album);
            }
            Err(detail) => pass.problems.push(LoadProblem::MalformedAlbumRow(detail)),
        }
    }

    for row in &track_rows {
        pass.read_track(row, &albums);
    }
    pass.link();

    let Pass {
        tracks,
        artists,
        albums,
        genres,
        problems,
        ..
    } = pass;
    let tracks: Vec<Arc<Track>> = tracks.into_values().map(Arc::new).collect();
    let artists = entities(artists);
    let albums = entities(albums);
    let genres: Vec<Arc<Genre>> = genres.into_values().collect();

    let report = LoadReport {
        tracks: tracks.len(),
        artists: artists.len(),
        albums: albums.len(),
        genres: genres.len(),
        problems,
    };

    repo.add_many_tracks(tracks)
        .context("Failed to add tracks")?;
    repo.add_many_artists(artists)
        .context("Failed to add artists")?;
    repo.add_many_albums(albums)
        .context("Failed to add albums")?;
    repo.add_many_genres(genres)
        .context("Failed to add genres")?;

    if !report.problems.is_empty() {
        info!("Found {} problems while loading:", report.problems.len());
        for problem in report.problems.iter() {
            info!("- {}", problem);
        }
    }
    info!(
        "Loaded {} tracks, {} artists, {} albums, {} genres",
        report.tracks, report.artists, report.albums, report.genres
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::rows::{GenreCell, StaticRowSource};
    use crate::repository::MemoryRepository;

    fn s(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn album_row(id: &str, title: &str) -> AlbumRow {
        AlbumRow {
            album_id: s(id),
            album_title: s(title),
            ..Default::default()
        }
    }

    fn track_row(id: &str, title: &str, album_id: &str) -> TrackRow {
        TrackRow {
            track_id: s(id),
            track_title: s(title),
            album_id: s(album_id),
            artist_id: s("1"),
            artist_name: s("AWOL"),
            track_genres: vec![GenreCell {
                genre_id: s("21"),
                genre_title: s("Hip-Hop"),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn links_shared_entities_once() {
        let source = StaticRowSource {
            albums: vec![album_row("1", "AWOL - A Way Of Life")],
            tracks: vec![
                track_row("2", "Food", "1"),
                track_row("3", "Electric Ave", "1"),
            ],
        };
        let repo = MemoryRepository::new();
        let report = populate(&source, &repo).unwrap();

        assert_eq!((report.tracks, report.artists, report.albums, report.genres), (2, 1, 1, 1));
        assert!(report.problems.is_empty());

        let food = repo.get_track(2).unwrap().unwrap();
        let electric = repo.get_track(3).unwrap().unwrap();
        assert!(Arc::ptr_eq(food.artist().unwrap(), electric.artist().unwrap()));
        assert!(Arc::ptr_eq(food.album().unwrap(), electric.album().unwrap()));
        assert!(Arc::ptr_eq(
            food.album().unwrap(),
            &repo.get_album(1).unwrap().unwrap()
        ));
    }

    #[test]
    fn genres_keep_row_order() {
        let genre = |id: &str, title: &str| GenreCell {
            genre_id: s(id),
            genre_title: s(title),
        };
        let mut light = track_row("48", "Light of Light", "1");
        light.track_genres = vec![genre("12", "Rock"), genre("1", "Avant-Garde")];
        let mut go = track_row("134", "1-2-3 Go!", "1");
        go.track_genres = vec![genre("17", "Folk"), genre("1", "Avant-Garde"), genre("17", "Folk")];

        let source = StaticRowSource {
            albums: vec![album_row("1", "AWOL - A Way Of Life")],
            tracks: vec![light, go],
        };
        let repo = MemoryRepository::new();
        let report = populate(&source, &repo).unwrap();
        assert_eq!(report.genres, 3);

        let names = |id: i64| -> Vec<String> {
            repo.get_track(id)
                .unwrap()
                .unwrap()
                .genres()
                .iter()
                .map(|g| g.name().to_string())
                .collect()
        };
        assert_eq!(names(48), vec!["Rock", "Avant-Garde"]);
        assert_eq!(names(134), vec!["Folk", "Avant-Garde"]);

        let light = repo.get_track(48).unwrap().unwrap();
        let go = repo.get_track(134).unwrap().unwrap();
        assert!(Arc::ptr_eq(&light.genres()[1], &go.genres()[1]));
    }

    #[test]
    fn bad_rows_are_reported_not_fatal() {
        let mut no_artist_name = track_row("5", "This World", "1");
        no_artist_name.artist_name = None;
        let mut bad_duration = track_row("6", "Bad duration", "1");
        bad_duration.track_duration = s("3:75");
        let mut huge_duration = track_row("9", "Huge duration", "1");
        huge_duration.track_duration = s("9223372036854775807:00");

        let source = StaticRowSource {
            albums: vec![album_row("1", "AWOL - A Way Of Life"), album_row("x", "Broken")],
            tracks: vec![
                track_row("2", "Food", "1"),
                track_row("2", "Food again", "1"),
                track_row("-4", "Negative", "1"),
                track_row("7", "Lost album", "99"),
                track_row("8", "Blank album", ""),
                no_artist_name,
                bad_duration,
                huge_duration,
            ],
        };
        let repo = MemoryRepository::new();
        let report = populate(&source, &repo).unwrap();

        assert_eq!(report.tracks, 6);
        assert!(report.problems.contains(&LoadProblem::DuplicateTrack(2)));
        assert!(report
            .problems
            .contains(&LoadProblem::UnknownAlbum { track_id: 7, album_id: 99 }));
        assert!(report.problems.iter().any(|p| matches!(p, LoadProblem::MalformedAlbumRow(_))));
        assert!(report
            .problems
            .iter()
            .any(|p| matches!(p, LoadProblem::MalformedArtist { track_id: 5, .. })));
        assert!(report
            .problems
            .iter()
            .any(|p| matches!(p, LoadProblem::MalformedDuration { track_id: 6, .. })));
        assert!(report
            .problems
            .iter()
            .any(|p| matches!(p, LoadProblem::MalformedDuration { track_id: 9, .. })));
        assert_eq!(report.problems.len(), 7);

        assert_eq!(repo.get_track(2).unwrap().unwrap().title(), Some("Food"));
        assert!(repo.get_track(7).unwrap().unwrap().album().is_none());
        assert!(repo.get_track(8).unwrap().unwrap().album().is_none());
        assert!(repo.get_track(5).unwrap().unwrap().artist().is_none());
        assert!(repo.get_track(6).unwrap().unwrap().duration().is_none());
        assert!(repo.get_track(9).unwrap().unwrap().duration().is_none());
    }

    #[test]
    fn unreferenced_albums_are_not_added() {
        let source = StaticRowSource {
            albums: vec![album_row("1", "Used"), album_row("2", "Unused")],
            tracks: vec![track_row("2", "Food", "1")],
        };
        let repo = MemoryRepository::new();
        populate(&source, &repo).unwrap();
        assert_eq!(repo.get_number_of_albums().unwrap(), 1);
    }

    #[test]
    fn parses_release_years() {
        assert_eq!(parse_year("2008"), Some(2008));
        assert_eq!(parse_year("2008-11-26"), Some(2008));
        assert_eq!(parse_year("unknown"), None);
    }
}

#[cfg(all(test, feature = "mock"))]
mod mock_tests {
    use super::*;
    use crate::loader::rows::MockRowSource;
    use crate::repository::MockRepository;
    use mockall::Sequence;

    #[test]
    fn adds_in_batches_in_order() {
        let mut source = MockRowSource::new();
        source.expect_album_rows().returning(|| Ok(vec![]));
        source.expect_track_rows().returning(|| {
            Ok(vec![TrackRow {
                track_id: Some("2".to_string()),
                track_title: Some("Food".to_string()),
                ..Default::default()
            }])
        });

        let mut repo = MockRepository::new();
        let mut seq = Sequence::new();
        repo.expect_add_many_tracks()
            .withf(|tracks| tracks.len() == 1 && tracks[0].id() == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repo.expect_add_many_artists()
            .withf(|artists| artists.is_empty())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repo.expect_add_many_albums()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repo.expect_add_many_genres()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let report = populate(&source, &repo).unwrap();
        assert_eq!(report.tracks, 1);
    }

    #[test]
    fn source_failure_aborts_before_touching_the_repository() {
        let mut source = MockRowSource::new();
        source
            .expect_album_rows()
            .returning(|| Err(anyhow::anyhow!("disk on fire")));
        let repo = MockRepository::new();

        assert!(populate(&source, &repo).is_err());
    }
}
