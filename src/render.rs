//! Plain-text output for the line driver.

use std::io::{self, Write};

use crate::cache::CacheSource;
use crate::catalog::{Content, ViewState};
use crate::commands::COMMANDS;
use crate::tmdb::{FetchError, Show};

const OVERVIEW_WIDTH: usize = 72;
const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "w780";

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
  }
}

/// Error banner shown above content that is still usable
pub fn write_banner(out: &mut impl Write, error: &FetchError) -> io::Result<()> {
  writeln!(out, "! [{}] {}", error.message_key(), error)
}

pub fn write_state(
  out: &mut impl Write,
  state: ViewState<&Content, &FetchError>,
  banner: Option<&FetchError>,
) -> io::Result<()> {
  match state {
    ViewState::Idle => writeln!(out, "Nothing loaded yet. Type `next` to start."),
    ViewState::Loading => writeln!(out, "Loading..."),
    ViewState::Failed(error) => {
      writeln!(out, "x [{}] {}", error.message_key(), error)?;
      writeln!(out, "Type `next` to retry.")
    }
    ViewState::Success(content) => {
      if let Some(error) = banner {
        write_banner(out, error)?;
      }
      write_list(out, content)
    }
  }
}

pub fn write_list(out: &mut impl Write, content: &Content) -> io::Result<()> {
  for show in &content.records {
    let year = show
      .first_air_date
      .map(|d| d.format("%Y").to_string())
      .unwrap_or_else(|| "----".to_string());
    let rating = show
      .vote_average
      .map(|v| format!("{v:.1}"))
      .unwrap_or_else(|| "-".to_string());
    writeln!(
      out,
      "{:>8}  {}  {:>4}  {}",
      show.id,
      year,
      rating,
      truncate(&show.display_name(), 48)
    )?;
  }

  let source = match content.source {
    CacheSource::Network => "network",
    CacheSource::Offline => "offline cache",
  };
  let more = if content.can_load_next_page {
    "more available"
  } else {
    "end of list"
  };
  writeln!(
    out,
    "-- {} shows, page {}, {}, from {}",
    content.records.len(),
    content.current_page,
    more,
    source
  )
}

pub fn write_detail(out: &mut impl Write, show: &Show, image_base_url: &str) -> io::Result<()> {
  writeln!(out, "{} (#{})", show.display_name(), show.id)?;
  if let Some(original) = show.original_name.as_deref().filter(|o| Some(*o) != show.name.as_deref()) {
    writeln!(out, "  original: {original}")?;
  }
  if let Some(date) = show.first_air_date {
    writeln!(out, "  first aired: {}", date.format("%Y-%m-%d"))?;
  }
  if let (Some(average), Some(count)) = (show.vote_average, show.vote_count) {
    writeln!(out, "  rating: {average:.1} ({count} votes)")?;
  }
  if let (Some(seasons), Some(episodes)) = (show.number_of_seasons, show.number_of_episodes) {
    writeln!(out, "  seasons: {seasons}, episodes: {episodes}")?;
  }
  if let Some(genres) = show.genres.as_ref().filter(|g| !g.is_empty()) {
    let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
    writeln!(out, "  genres: {}", names.join(", "))?;
  }
  if let Some(networks) = show.networks.as_ref().filter(|n| !n.is_empty()) {
    let names: Vec<&str> = networks.iter().map(|n| n.name.as_str()).collect();
    writeln!(out, "  networks: {}", names.join(", "))?;
  }
  if let Some(poster) = show.poster_url(image_base_url, POSTER_SIZE) {
    writeln!(out, "  poster: {poster}")?;
  }
  if let Some(backdrop) = show.backdrop_url(image_base_url, BACKDROP_SIZE) {
    writeln!(out, "  backdrop: {backdrop}")?;
  }
  if let Some(overview) = show.overview.as_deref().filter(|o| !o.is_empty()) {
    writeln!(out, "  {}", truncate(overview, OVERVIEW_WIDTH))?;
  }
  Ok(())
}

pub fn write_help(out: &mut impl Write) -> io::Result<()> {
  for cmd in COMMANDS {
    let aliases = if cmd.aliases.is_empty() {
      String::new()
    } else {
      format!(" ({})", cmd.aliases.join(", "))
    };
    writeln!(out, "  {:<14} {}{}", cmd.usage, cmd.description, aliases)?;
  }
  Ok(())
}
