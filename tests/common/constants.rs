//! Shared constants for integration tests
//!
//! They describe the fixture rows under `tests/data`. When the fixture changes, update only
//! this file.
#![allow(dead_code)]

// ============================================================================
// Fixture sizes
// ============================================================================

pub const FIXTURE_TRACKS: usize = 10;
pub const FIXTURE_ARTISTS: usize = 5;
pub const FIXTURE_ALBUMS: usize = 5;
pub const FIXTURE_GENRES: usize = 7;

// ============================================================================
// Fixture catalog ids
// ============================================================================

/// "Food" by AWOL
pub const TRACK_FOOD_ID: i64 = 2;
pub const TRACK_FOOD_TITLE: &str = "Food";
pub const TRACK_FOOD_SECONDS: i64 = 168;

/// "Light of Light", tagged Rock and Avant-Garde
pub const TRACK_LIGHT_ID: i64 = 48;

/// "1-2-3 Go!", the only title not starting with a letter
pub const TRACK_GO_ID: i64 = 134;

pub const ARTIST_AWOL_NAME: &str = "AWOL";

pub const ALBUM_AWOL_ID: i64 = 1;
pub const ALBUM_AWOL_TITLE: &str = "AWOL - A Way Of Life";
pub const ALBUM_AWOL_TRACKS: usize = 3;

pub const GENRE_HIP_HOP: &str = "Hip-Hop";

/// No fixture entity carries this id.
pub const MISSING_ID: i64 = 10201901;

/// Fixture titles in title collation order.
pub const SORTED_TITLES: [&str; FIXTURE_TRACKS] = [
    "Electric Ave",
    "Food",
    "Freeway",
    "Light of Light",
    "Spiritual Level",
    "This World",
    "Too Happy",
    "Where is your Love?",
    "Yosemite",
    "1-2-3 Go!",
];

// ============================================================================
// Users
// ============================================================================

pub const USER_THORKE: &str = "thorke";
pub const USER_FMERCURY: &str = "fmercury";
pub const TEST_PASS: &str = "mvNNbc1eLA$i";
