use crate::cache::CacheStorage;
use crate::catalog::CatalogController;
use crate::commands::{self, Action};
use crate::event::{Event, EventHandler};
use crate::render;
use crate::settings::SettingsStore;
use crate::tmdb::{Fetcher, Show, ShowId};
use color_eyre::Result;
use std::io::Write;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Line-driven front end: owns the controller, runs fetches on background tasks
/// and applies their results when they come back.
pub struct App<F, C, S, W> {
  catalog: CatalogController<F, C, S>,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Where command output goes
  out: W,

  /// Image CDN base from the last configuration refresh
  image_base_url: String,

  /// Spawned fetches whose result has not come back yet
  in_flight: usize,

  /// Stdin is gone; quit once `in_flight` drains
  input_closed: bool,

  /// Whether to quit
  should_quit: bool,
}

impl<F, C, S, W> App<F, C, S, W>
where
  F: Fetcher + 'static,
  C: CacheStorage,
  S: SettingsStore,
  W: Write,
{
  pub fn new(catalog: CatalogController<F, C, S>, event_tx: mpsc::UnboundedSender<Event>, out: W) -> Self {
    let image_base_url = catalog.secure_base_url();
    Self {
      catalog,
      event_tx,
      out,
      image_base_url,
      in_flight: 0,
      input_closed: false,
      should_quit: false,
    }
  }

  pub async fn run(&mut self, events: &mut EventHandler) -> Result<()> {
    self.image_base_url = self.catalog.refresh_configuration_if_stale().await;

    // Initial data load
    writeln!(self.out, "tvshelf: popular TV shows ({}). Type `help` for commands.", self.catalog.language())?;
    self.start_page_load()?;

    // Main loop
    while !self.should_quit {
      match events.next().await {
        Some(event) => self.handle_event(event).await?,
        None => break,
      }
    }

    info!("tvshelf exiting");
    Ok(())
  }

  async fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Input(line) => self.handle_input(&line).await?,
      Event::InputClosed => self.input_closed = true,
      Event::PageLoaded(ticket, result) => {
        self.in_flight -= 1;
        if self.catalog.finish_load(ticket, result) {
          self.render_state()?;
        }
      }
      Event::DetailLoaded(summary, result) => {
        self.in_flight -= 1;
        let shown = self.catalog.finish_detail(&summary, result);
        render::write_detail(&mut self.out, &shown, &self.image_base_url)?;
      }
    }
    if self.input_closed && self.in_flight == 0 {
      self.should_quit = true;
    }
    self.out.flush()?;
    Ok(())
  }

  async fn handle_input(&mut self, line: &str) -> Result<()> {
    let action = match commands::parse_action(line) {
      Ok(Some(action)) => action,
      Ok(None) => return Ok(()),
      Err(e) => {
        writeln!(self.out, "{e}")?;
        return Ok(());
      }
    };
    debug!(?action, "command");

    match action {
      Action::NextPage => self.start_page_load()?,
      Action::Reset => {
        self.catalog.restart();
        self.start_page_load()?;
      }
      Action::Detail(id) => self.start_detail_load(id),
      Action::Language(language) => {
        self.catalog.apply_language(&language);
        writeln!(self.out, "Language set to {language}.")?;
        // The next load clears the banner, so report a failed write now
        self.write_cache_error()?;
        self.start_page_load()?;
      }
      Action::Forget(id) => {
        self.catalog.evict(id);
        writeln!(self.out, "Removed {id} from the offline cache.")?;
      }
      Action::Purge => {
        self.catalog.clear_cache();
        writeln!(self.out, "Offline cache cleared.")?;
      }
      Action::Configuration => {
        self.image_base_url = self.catalog.refresh_configuration_if_stale().await;
        writeln!(self.out, "Image base URL: {}", self.image_base_url)?;
      }
      Action::Help => render::write_help(&mut self.out)?,
      Action::Quit => self.should_quit = true,
    }
    Ok(())
  }

  fn start_page_load(&mut self) -> Result<()> {
    let Some(ticket) = self.catalog.begin_load() else {
      if self.catalog.is_busy() {
        writeln!(self.out, "Still loading...")?;
      } else {
        writeln!(self.out, "No more shows to load.")?;
      }
      return Ok(());
    };

    if self.catalog.state().is_loading() {
      self.render_state()?;
    }

    self.in_flight += 1;
    let fetcher = self.catalog.fetcher();
    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let result = fetcher.fetch_page(&ticket.language, ticket.page).await;
      let _ = tx.send(Event::PageLoaded(ticket, result));
    });
    Ok(())
  }

  fn start_detail_load(&mut self, id: ShowId) {
    let summary = self
      .catalog
      .content()
      .get(id)
      .cloned()
      .unwrap_or_else(|| Show::bare(id));

    self.in_flight += 1;
    let fetcher = self.catalog.fetcher();
    let language = self.catalog.language().to_string();
    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let result = fetcher.fetch_detail(summary.id, &language).await;
      let _ = tx.send(Event::DetailLoaded(summary, result));
    });
  }

  fn render_state(&mut self) -> Result<()> {
    let banner = if self.catalog.has_error() {
      self.catalog.last_error()
    } else {
      None
    };
    render::write_state(&mut self.out, self.catalog.state(), banner)?;
    self.write_cache_error()
  }

  fn write_cache_error(&mut self) -> Result<()> {
    if self.catalog.has_error() {
      if let Some(cache_error) = self.catalog.last_cache_error() {
        writeln!(self.out, "! cache: {cache_error}")?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::NoopStorage;
  use crate::catalog::testing::{page, shows, ScriptedFetcher};
  use crate::catalog::CacheErrorPolicy;
  use crate::db::Database;
  use crate::settings::SqliteSettings;
  use crate::tmdb::FetchError;
  use std::sync::Arc;

  type TestApp = App<ScriptedFetcher, NoopStorage, SqliteSettings, Vec<u8>>;

  fn app(fetcher: ScriptedFetcher) -> (TestApp, mpsc::UnboundedReceiver<Event>) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let catalog = CatalogController::new(fetcher, NoopStorage, SqliteSettings::new(db), "en");
    let (tx, rx) = mpsc::unbounded_channel();
    (App::new(catalog, tx, Vec::new()), rx)
  }

  fn take_output(app: &mut TestApp) -> String {
    String::from_utf8(std::mem::take(&mut app.out)).unwrap()
  }

  /// Feed one line, then apply the result of the fetch it started.
  async fn input_and_settle(app: &mut TestApp, rx: &mut mpsc::UnboundedReceiver<Event>, line: &str) {
    app.handle_event(Event::Input(line.to_string())).await.unwrap();
    let event = rx.recv().await.unwrap();
    app.handle_event(event).await.unwrap();
  }

  #[tokio::test]
  async fn test_next_loads_and_renders_page() {
    let (mut app, mut rx) = app(ScriptedFetcher::new().with_page(Ok(page(1, 3, &[1, 2]))));

    input_and_settle(&mut app, &mut rx, "next").await;

    let text = take_output(&mut app);
    assert!(text.starts_with("Loading...\n"));
    assert!(text.contains("Show 1"));
    assert!(text.contains("-- 2 shows, page 1, more available, from network"));
  }

  #[tokio::test]
  async fn test_next_while_loading_is_refused() {
    let (mut app, mut rx) = app(ScriptedFetcher::new().with_page(Ok(page(1, 3, &[1]))));

    app.handle_event(Event::Input("next".to_string())).await.unwrap();
    app.handle_event(Event::Input("next".to_string())).await.unwrap();
    assert!(take_output(&mut app).ends_with("Still loading...\n"));

    let event = rx.recv().await.unwrap();
    app.handle_event(event).await.unwrap();
    assert_eq!(app.catalog.fetcher().page_requests().len(), 1);
  }

  #[tokio::test]
  async fn test_reset_drops_late_page() {
    let fetcher = ScriptedFetcher::new()
      .with_page(Ok(page(1, 3, &[1, 2])))
      .with_page(Ok(page(1, 3, &[7])));
    let (mut app, mut rx) = app(fetcher);

    app.handle_event(Event::Input("next".to_string())).await.unwrap();
    app.handle_event(Event::Input("reset".to_string())).await.unwrap();

    // Both fetches complete; only the one issued after reset is applied
    for _ in 0..2 {
      let event = rx.recv().await.unwrap();
      app.handle_event(event).await.unwrap();
    }

    let ids: Vec<i64> = app.catalog.content().records.iter().map(|s| s.id.0).collect();
    assert_eq!(ids, vec![7]);
  }

  #[tokio::test]
  async fn test_detail_falls_back_to_loaded_summary() {
    let fetcher = ScriptedFetcher::new()
      .with_page(Ok(page(1, 1, &[5])))
      .with_detail(Err(FetchError::Transport("offline".to_string())));
    let (mut app, mut rx) = app(fetcher);

    input_and_settle(&mut app, &mut rx, "next").await;
    take_output(&mut app);
    input_and_settle(&mut app, &mut rx, "detail 5").await;

    assert!(take_output(&mut app).starts_with("Show 5 (#5)\n"));
    assert_eq!(app.catalog.selected(), Some(&shows(&[5])[0]));
  }

  #[tokio::test]
  async fn test_bad_input_reports_usage() {
    let (mut app, _rx) = app(ScriptedFetcher::new());

    app.handle_event(Event::Input("detail".to_string())).await.unwrap();
    app.handle_event(Event::Input("quit".to_string())).await.unwrap();

    assert_eq!(take_output(&mut app), "usage: detail <id>\n");
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_closed_input_waits_for_pending_fetch() {
    let (mut app, mut rx) = app(ScriptedFetcher::new().with_page(Ok(page(1, 1, &[3]))));

    app.handle_event(Event::Input("next".to_string())).await.unwrap();
    app.handle_event(Event::InputClosed).await.unwrap();
    assert!(!app.should_quit);

    let event = rx.recv().await.unwrap();
    app.handle_event(event).await.unwrap();
    assert!(app.should_quit);
    assert!(take_output(&mut app).contains("Show 3"));
  }

  #[tokio::test]
  async fn test_language_write_failure_is_reported() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let catalog = CatalogController::new(
      ScriptedFetcher::new(),
      NoopStorage,
      SqliteSettings::new(Arc::clone(&db)),
      "en",
    )
    .with_cache_policy(CacheErrorPolicy::Strict);
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut app = App::new(catalog, tx, Vec::new());
    db.lock().execute_batch("DROP TABLE settings;").unwrap();

    app.handle_event(Event::Input("lang fr".to_string())).await.unwrap();

    let text = take_output(&mut app);
    assert!(text.starts_with("Language set to fr.\n! cache: store language"), "{text}");
  }
}
