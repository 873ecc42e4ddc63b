use super::rows::{AlbumRow, RowSource, TrackRow};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const ALBUMS_FILE_NAME: &str = "albums.json";
pub const TRACKS_FILE_NAME: &str = "tracks.json";

/// Reads `albums.json` and `tracks.json`, each a JSON array of row objects, from a directory.
#[derive(Debug, Clone)]
pub struct JsonRowSource {
    data_dir: PathBuf,
}

impl JsonRowSource {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        JsonRowSource {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    fn read_rows<T: DeserializeOwned>(&self, file_name: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(file_name);
        let file = File::open(&path).with_context(|| format!("Failed to open {:?}", path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse rows from {:?}", path))
    }
}

impl RowSource for JsonRowSource {
    fn album_rows(&self) -> Result<Vec<AlbumRow>> {
        self.read_rows(ALBUMS_FILE_NAME)
    }

    fn track_rows(&self) -> Result<Vec<TrackRow>> {
        self.read_rows(TRACKS_FILE_NAME)
    }
}
