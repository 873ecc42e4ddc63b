mod file_config;

pub use file_config::FileConfig;

use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_TRACKS_PER_PAGE: usize = 10;

/// Storage backend behind the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RepositoryKind {
    #[default]
    Memory,
    Sqlite,
}

impl RepositoryKind {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "memory" => Ok(RepositoryKind::Memory),
            "sqlite" | "database" => Ok(RepositoryKind::Sqlite),
            other => bail!("Unknown repository kind \"{}\"", other),
        }
    }
}

/// CLI arguments that take part in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    pub repository: RepositoryKind,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub tracks_per_page: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub repository: RepositoryKind,
    /// Always set when `repository` is [`RepositoryKind::Sqlite`].
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub tracks_per_page: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and an optional TOML file.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .or_else(|| cli.data_dir.clone())
            .ok_or_else(|| anyhow!("data_dir must be specified via --data-dir or in config file"))?;
        if !data_dir.exists() {
            bail!("Data directory does not exist: {:?}", data_dir);
        }
        if !data_dir.is_dir() {
            bail!("data_dir is not a directory: {:?}", data_dir);
        }

        let repository = match file.repository {
            Some(value) => RepositoryKind::parse(&value)?,
            None => cli.repository,
        };

        let database_path = file
            .database_path
            .map(PathBuf::from)
            .or_else(|| cli.database_path.clone());
        if repository == RepositoryKind::Sqlite && database_path.is_none() {
            bail!("database_path must be specified when using the sqlite repository");
        }

        let log_level = file.log_level.or_else(|| cli.log_level.clone());

        let tracks_per_page = file
            .tracks_per_page
            .or(cli.tracks_per_page)
            .unwrap_or(DEFAULT_TRACKS_PER_PAGE);
        if tracks_per_page == 0 {
            bail!("tracks_per_page must be greater than zero");
        }

        Ok(AppConfig {
            data_dir,
            repository,
            database_path,
            log_level,
            tracks_per_page,
        })
    }
}
