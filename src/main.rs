use anyhow::{Context, Result};
use clap::Parser;
use music_catalog::config::{AppConfig, CliConfig, FileConfig, RepositoryKind};
use music_catalog::services::tracks;
use music_catalog::{populate, JsonRowSource, MemoryRepository, Repository, SqliteRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory containing albums.json and tracks.json.
    #[clap(long, value_parser = parse_path)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend to load the catalog into.
    #[clap(long, value_enum)]
    pub repository: Option<RepositoryKind>,

    /// Path to the SQLite database file, required by the sqlite repository.
    #[clap(long, value_parser = parse_path)]
    pub database_path: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "music_catalog=trace". Defaults to $LOG_LEVEL, then info.
    #[clap(long)]
    pub log_level: Option<String>,

    /// Number of tracks shown by --page.
    #[clap(long)]
    pub tracks_per_page: Option<usize>,

    /// Print the given page of tracks, ordered by title.
    #[clap(long)]
    pub page: Option<i64>,

    /// Search field: title, artist, album or genre.
    #[clap(long, requires = "search_text")]
    pub search_key: Option<String>,

    /// Text to search for with --search-key.
    #[clap(long, requires = "search_key")]
    pub search_text: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            data_dir: self.data_dir.clone(),
            repository: self.repository.unwrap_or_default(),
            database_path: self.database_path.clone(),
            log_level: self.log_level.clone(),
            tracks_per_page: self.tracks_per_page,
        }
    }
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    let filter = match log_level {
        Some(level) => builder.parse_lossy(level),
        None => builder.with_env_var("LOG_LEVEL").from_env_lossy(),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init()
        .context("Failed to initialise logging")
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    init_tracing(config.log_level.as_deref())?;

    let repo: Arc<dyn Repository> = match config.repository {
        RepositoryKind::Memory => {
            info!("Using in-memory repository");
            Arc::new(MemoryRepository::new())
        }
        RepositoryKind::Sqlite => {
            let database_path = config
                .database_path
                .as_ref()
                .context("database_path is required by the sqlite repository")?;
            info!("Opening SQLite catalog database at {:?}...", database_path);
            Arc::new(SqliteRepository::open(database_path)?)
        }
    };

    info!("Loading catalog rows from {:?}...", config.data_dir);
    let source = JsonRowSource::new(&config.data_dir);
    let report = populate(&source, repo.as_ref())?;
    if !report.problems.is_empty() {
        info!("{} rows were loaded only partially or skipped", report.problems.len());
    }

    info!(
        "Catalog holds {} tracks, {} artists, {} albums, {} genres",
        repo.get_number_of_tracks()?,
        repo.get_number_of_artists()?,
        repo.get_number_of_albums()?,
        repo.get_number_of_genres()?
    );

    if let Some(page) = cli_args.page {
        let records = tracks::get_tracks_for_page(repo.as_ref(), page, config.tracks_per_page)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    if let (Some(key), Some(text)) = (&cli_args.search_key, &cli_args.search_text) {
        let records = tracks::get_tracks_for_search(repo.as_ref(), key, text)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    repo.close_session()?;
    Ok(())
}
