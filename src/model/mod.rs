//! Domain entities of the catalog.
//!
//! Entities keep their invariants behind accessors: ids are checked at construction time,
//! names and titles are trimmed on the way in and track relationships only accept the entity
//! kind they expect.

mod album;
mod artist;
mod entity_ref;
mod error;
mod genre;
mod review;
mod track;
mod user;

pub use album::Album;
pub use artist::Artist;
pub use entity_ref::{EntityKind, EntityRef};
pub use error::{parse_id, ValidationError};
pub use genre::Genre;
pub use review::Review;
pub use track::{compare_titles, parse_duration, Track};
pub use user::{normalize_user_name, User};
