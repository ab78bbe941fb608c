//! Available commands, autocomplete and parsing of input lines

use thiserror::Error;

use crate::tmdb::ShowId;

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub usage: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "next",
    aliases: &["n", "more"],
    usage: "next",
    description: "Load the next page of popular shows",
  },
  Command {
    name: "reset",
    aliases: &["r", "refresh", "reload"],
    usage: "reset",
    description: "Drop loaded shows and start again from page 1",
  },
  Command {
    name: "detail",
    aliases: &["d", "show"],
    usage: "detail <id>",
    description: "Show the full record for one show",
  },
  Command {
    name: "lang",
    aliases: &["l", "language"],
    usage: "lang <code>",
    description: "Switch content language (ISO 639-1) and reload",
  },
  Command {
    name: "forget",
    aliases: &["f", "evict"],
    usage: "forget <id>",
    description: "Remove one show from the offline cache",
  },
  Command {
    name: "purge",
    aliases: &["clear"],
    usage: "purge",
    description: "Remove every show from the offline cache",
  },
  Command {
    name: "config",
    aliases: &["c", "images"],
    usage: "config",
    description: "Refresh the image configuration if stale",
  },
  Command {
    name: "help",
    aliases: &["h", "?"],
    usage: "help",
    description: "List commands",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    usage: "quit",
    description: "Exit tvshelf",
  },
];

/// What an input line asks the app to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  NextPage,
  Reset,
  Detail(ShowId),
  Language(String),
  Forget(ShowId),
  Purge,
  Configuration,
  Help,
  Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
  #[error("unknown command: {0}")]
  Unknown(String),
  #[error("ambiguous command {input}: could be {candidates}")]
  Ambiguous { input: String, candidates: String },
  #[error("usage: {0}")]
  Usage(&'static str),
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Resolve the first word of `input` to a command.
///
/// Exact names and aliases always win; a prefix must match exactly one command.
fn resolve(word: &str) -> Result<&'static Command, ParseError> {
  let word_lower = word.to_lowercase();
  let exact = COMMANDS
    .iter()
    .find(|c| c.name == word_lower || c.aliases.contains(&word_lower.as_str()));
  if let Some(cmd) = exact {
    return Ok(cmd);
  }

  match get_suggestions(word).as_slice() {
    [] => Err(ParseError::Unknown(word.to_string())),
    [only] => Ok(*only),
    many => Err(ParseError::Ambiguous {
      input: word.to_string(),
      candidates: many.iter().map(|c| c.name).collect::<Vec<_>>().join(", "),
    }),
  }
}

fn parse_id(cmd: &Command, arg: Option<&str>) -> Result<ShowId, ParseError> {
  arg
    .and_then(|a| a.parse::<i64>().ok())
    .map(ShowId)
    .ok_or(ParseError::Usage(cmd.usage))
}

/// Parse one input line. Blank lines are `Ok(None)`.
pub fn parse_action(line: &str) -> Result<Option<Action>, ParseError> {
  let mut words = line.split_whitespace();
  let Some(word) = words.next() else {
    return Ok(None);
  };
  let arg = words.next();

  let cmd = resolve(word)?;
  let action = match cmd.name {
    "next" => Action::NextPage,
    "reset" => Action::Reset,
    "detail" => Action::Detail(parse_id(cmd, arg)?),
    "forget" => Action::Forget(parse_id(cmd, arg)?),
    "lang" => {
      let code = arg
        .filter(|a| a.len() >= 2 && a.chars().all(|c| c.is_ascii_alphabetic() || c == '-'))
        .ok_or(ParseError::Usage(cmd.usage))?;
      Action::Language(code.to_string())
    }
    "purge" => Action::Purge,
    "config" => Action::Configuration,
    "help" => Action::Help,
    _ => Action::Quit,
  };

  Ok(Some(action))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("detail");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "detail");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("refresh");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "reset");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("pur");
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].name, "purge");
  }

  #[test]
  fn test_parse_blank_line() {
    assert_eq!(parse_action("   "), Ok(None));
  }

  #[test]
  fn test_parse_commands_with_arguments() {
    assert_eq!(parse_action("detail 1399"), Ok(Some(Action::Detail(ShowId(1399)))));
    assert_eq!(parse_action("f 7"), Ok(Some(Action::Forget(ShowId(7)))));
    assert_eq!(
      parse_action("lang pt-BR"),
      Ok(Some(Action::Language("pt-BR".to_string())))
    );
    assert_eq!(parse_action("NEXT"), Ok(Some(Action::NextPage)));
    assert_eq!(parse_action("q"), Ok(Some(Action::Quit)));
  }

  #[test]
  fn test_parse_missing_argument_is_usage_error() {
    assert_eq!(parse_action("detail"), Err(ParseError::Usage("detail <id>")));
    assert_eq!(parse_action("detail abc"), Err(ParseError::Usage("detail <id>")));
    assert_eq!(parse_action("lang 1"), Err(ParseError::Usage("lang <code>")));
  }

  #[test]
  fn test_parse_unknown_and_ambiguous() {
    assert_eq!(
      parse_action("bogus"),
      Err(ParseError::Unknown("bogus".to_string()))
    );
    // "re" prefixes both "reset" and its alias "refresh" but names one command
    assert_eq!(parse_action("re"), Ok(Some(Action::Reset)));
    assert!(matches!(
      parse_action("e"),
      Err(ParseError::Ambiguous { .. })
    ));
  }
}
