use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::catalog::PageTicket;
use crate::tmdb::{FetchError, Page, Show};

/// Application events
#[derive(Debug)]
pub enum Event {
  /// One line typed on stdin, without the newline
  Input(String),
  /// Stdin reached EOF or failed
  InputClosed,
  /// A page fetch started by `begin_load` finished
  PageLoaded(PageTicket, Result<Page, FetchError>),
  /// A detail fetch for the given summary finished
  DetailLoaded(Show, Result<Show, FetchError>),
}

/// Event handler that merges stdin lines with results from fetch tasks
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler and start reading stdin
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn stdin reader
    let input_tx = tx.clone();
    tokio::spawn(async move {
      let mut lines = BufReader::new(tokio::io::stdin()).lines();
      loop {
        match lines.next_line().await {
          Ok(Some(line)) => {
            if input_tx.send(Event::Input(line)).is_err() {
              break;
            }
          }
          Ok(None) => {
            let _ = input_tx.send(Event::InputClosed);
            break;
          }
          Err(e) => {
            tracing::warn!(error = %e, "failed to read stdin");
            let _ = input_tx.send(Event::InputClosed);
            break;
          }
        }
      }
    });

    Self { tx, rx }
  }

  /// Sender for background tasks to report results
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
