use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;

use tvshelf::cache::{CacheStorage, NoopStorage, SqliteStorage};
use tvshelf::catalog::{CacheErrorPolicy, CatalogController};
use tvshelf::config::Config;
use tvshelf::db::Database;
use tvshelf::settings::SqliteSettings;
use tvshelf::tmdb::TmdbClient;
use tvshelf::{app, event, logging};

#[derive(Parser, Debug)]
#[command(name = "tvshelf")]
#[command(about = "Browse popular TV shows from TMDB, with an offline cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/tvshelf/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Content language (ISO 639-1), remembered for later runs
  #[arg(short, long)]
  language: Option<String>,

  /// Do not read or write the offline cache
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;
  if args.no_cache {
    config.cache.enabled = false;
  }

  let _log_guard = logging::init(&Config::data_dir()?);
  tracing::info!(cache = config.cache.enabled, "tvshelf starting");

  let client = TmdbClient::new(&config.tmdb, Config::get_api_key()?)?;

  // Settings always persist unless caching is off entirely
  let db = if config.cache.enabled {
    Arc::new(Database::open_at(&config.cache_path()?)?)
  } else {
    Arc::new(Database::open_in_memory()?)
  };
  let settings = SqliteSettings::new(Arc::clone(&db));
  let policy = if config.cache.strict_writes {
    CacheErrorPolicy::Strict
  } else {
    CacheErrorPolicy::Log
  };

  if config.cache.enabled {
    let storage = SqliteStorage::new(db);
    let catalog = CatalogController::new(client, storage, settings, &config.tmdb.default_language);
    run(catalog.with_cache_policy(policy), args.language).await
  } else {
    let catalog = CatalogController::new(client, NoopStorage, settings, &config.tmdb.default_language);
    run(catalog.with_cache_policy(policy), args.language).await
  }
}

async fn run<C: CacheStorage>(
  mut catalog: CatalogController<TmdbClient, C, SqliteSettings>,
  language: Option<String>,
) -> Result<()> {
  if let Some(language) = language {
    catalog.apply_language(&language);
  }

  let mut events = event::EventHandler::new();
  let mut app = app::App::new(catalog, events.sender(), std::io::stdout());
  app.run(&mut events).await
}
