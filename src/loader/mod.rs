mod json_source;
mod populate;
mod rows;

pub use json_source::{JsonRowSource, ALBUMS_FILE_NAME, TRACKS_FILE_NAME};
pub use populate::{populate, LoadProblem, LoadReport};
pub use rows::{AlbumRow, GenreCell, RowSource, StaticRowSource, TrackRow};

#[cfg(feature = "mock")]
pub use rows::MockRowSource;
