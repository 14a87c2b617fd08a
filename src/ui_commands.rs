//! Terminal command parsing for the interactive front-end.
//!
//! `ban <field>` is the terminal stand-in for clicking a displayed value: it
//! resolves the field against the record currently on screen and excludes the
//! value's display string.

use crate::backends::CatalogRecord;
use crate::protocol::{Message, SessionMessage};

pub const HELP_TEXT: &str = "\
Commands:
  n, next               draw the next creature
  ban name|id|height|weight
  ban type <k>          exclude the k-th type shown
  ban types             exclude every type shown
  ban \"<text>\"          exclude a literal value
  unban <value>         remove a value from the ban list
  unban #<k>            remove the k-th ban list entry
  list                  redraw the screen
  help                  show this help
  q, quit               exit";

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Next,
    Exclude(Vec<String>),
    Unexclude(String),
    /// Zero-based ban list position.
    UnexcludeAt(usize),
    Show,
    Help,
    Quit,
}

impl UiCommand {
    /// Bus messages that carry this command to the session manager.
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            UiCommand::Next => vec![Message::Session(SessionMessage::RequestNext)],
            UiCommand::Exclude(tokens) => tokens
                .into_iter()
                .map(|token| Message::Session(SessionMessage::ExcludeValue(token)))
                .collect(),
            UiCommand::Unexclude(token) => {
                vec![Message::Session(SessionMessage::UnexcludeValue(token))]
            }
            UiCommand::UnexcludeAt(index) => {
                vec![Message::Session(SessionMessage::UnexcludeAt(index))]
            }
            UiCommand::Show => vec![Message::Session(SessionMessage::RequestSnapshot)],
            UiCommand::Help | UiCommand::Quit => Vec::new(),
        }
    }
}

fn strip_quotes(value: &str) -> Option<&str> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
}

fn parse_position(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position - 1),
        _ => Err(format!("'{value}' is not a position (use 1, 2, ...)")),
    }
}

fn resolve_field(argument: &str, record: Option<&CatalogRecord>) -> Result<Vec<String>, String> {
    let mut parts = argument.split_whitespace();
    let field = parts.next().unwrap_or_default().to_ascii_lowercase();
    let record = record.ok_or_else(|| "no creature is displayed yet".to_string())?;
    let values = match field.as_str() {
        "name" => vec![record.name.clone()],
        "id" => vec![record.id.to_string()],
        "height" => vec![record.height.to_string()],
        "weight" => vec![record.weight.to_string()],
        "types" => {
            if record.category_tags.is_empty() {
                return Err("the displayed creature has no types".to_string());
            }
            record.category_tags.clone()
        }
        "type" => {
            let position = parts
                .next()
                .ok_or_else(|| "usage: ban type <k>".to_string())
                .and_then(parse_position)?;
            let tag = record.category_tags.get(position).ok_or_else(|| {
                format!(
                    "the displayed creature has {} type(s)",
                    record.category_tags.len()
                )
            })?;
            vec![tag.clone()]
        }
        other => return Err(format!("unknown field '{other}', try 'help'")),
    };
    if parts.next().is_some() && field != "type" {
        return Err(format!("'ban {field}' takes no extra arguments"));
    }
    Ok(values)
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(
    line: &str,
    record: Option<&CatalogRecord>,
) -> Result<Option<UiCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, argument) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "n" | "next" => UiCommand::Next,
        "list" | "show" => UiCommand::Show,
        "help" | "?" => UiCommand::Help,
        "q" | "quit" | "exit" => UiCommand::Quit,
        "ban" => {
            if argument.is_empty() {
                return Err("usage: ban <field> or ban \"<text>\"".to_string());
            }
            if let Some(literal) = strip_quotes(argument) {
                if literal.is_empty() {
                    return Err("an empty value would exclude every creature".to_string());
                }
                UiCommand::Exclude(vec![literal.to_string()])
            } else {
                UiCommand::Exclude(resolve_field(argument, record)?)
            }
        }
        "unban" => {
            if argument.is_empty() {
                return Err("usage: unban <value> or unban #<k>".to_string());
            }
            if let Some(position) = argument.strip_prefix('#') {
                UiCommand::UnexcludeAt(parse_position(position)?)
            } else {
                let token = strip_quotes(argument).unwrap_or(argument);
                UiCommand::Unexclude(token.to_string())
            }
        }
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::{parse_command, UiCommand};
    use crate::backends::CatalogRecord;
    use crate::protocol::{Message, SessionMessage};

    fn charizard() -> CatalogRecord {
        CatalogRecord {
            id: 6,
            name: "charizard".to_string(),
            category_tags: vec!["fire".to_string(), "flying".to_string()],
            image_url: None,
            height: 17,
            weight: 905,
        }
    }

    fn parse(line: &str) -> Result<Option<UiCommand>, String> {
        parse_command(line, Some(&charizard()))
    }

    #[test]
    fn test_ban_fields_resolve_displayed_values() {
        assert_eq!(
            parse("ban name"),
            Ok(Some(UiCommand::Exclude(vec!["charizard".to_string()])))
        );
        assert_eq!(
            parse("ban ID"),
            Ok(Some(UiCommand::Exclude(vec!["6".to_string()])))
        );
        assert_eq!(
            parse("ban height"),
            Ok(Some(UiCommand::Exclude(vec!["17".to_string()])))
        );
        assert_eq!(
            parse("ban weight"),
            Ok(Some(UiCommand::Exclude(vec!["905".to_string()])))
        );
        assert_eq!(
            parse("ban type 2"),
            Ok(Some(UiCommand::Exclude(vec!["flying".to_string()])))
        );
        assert_eq!(
            parse("ban types"),
            Ok(Some(UiCommand::Exclude(vec![
                "fire".to_string(),
                "flying".to_string()
            ])))
        );
    }

    #[test]
    fn test_ban_errors_are_reported() {
        assert!(parse("ban type 3").is_err());
        assert!(parse("ban type 0").is_err());
        assert!(parse("ban colour").is_err());
        assert!(parse("ban").is_err());
        assert!(parse("ban \"\"").is_err());
        assert!(parse("ban name extra").is_err());
        assert_eq!(
            parse_command("ban name", None),
            Err("no creature is displayed yet".to_string())
        );
    }

    #[test]
    fn test_ban_types_refuses_creature_without_types() {
        let untyped = CatalogRecord {
            category_tags: Vec::new(),
            ..charizard()
        };
        assert_eq!(
            parse_command("ban types", Some(&untyped)),
            Err("the displayed creature has no types".to_string())
        );
        assert!(parse_command("ban type 1", Some(&untyped)).is_err());
    }

    #[test]
    fn test_ban_literal_keeps_case_and_needs_no_record() {
        assert_eq!(
            parse_command("ban \"Pika Chu\"", None),
            Ok(Some(UiCommand::Exclude(vec!["Pika Chu".to_string()])))
        );
    }

    #[test]
    fn test_unban_by_value_and_position() {
        assert_eq!(
            parse("unban Fire"),
            Ok(Some(UiCommand::Unexclude("Fire".to_string())))
        );
        assert_eq!(
            parse("unban \"mr mime\""),
            Ok(Some(UiCommand::Unexclude("mr mime".to_string())))
        );
        assert_eq!(parse("unban #2"), Ok(Some(UiCommand::UnexcludeAt(1))));
        assert!(parse("unban #x").is_err());
        assert!(parse("unban").is_err());
    }

    #[test]
    fn test_simple_commands_and_blank_lines() {
        assert_eq!(parse("  "), Ok(None));
        assert_eq!(parse("n"), Ok(Some(UiCommand::Next)));
        assert_eq!(parse("NEXT"), Ok(Some(UiCommand::Next)));
        assert_eq!(parse("list"), Ok(Some(UiCommand::Show)));
        assert_eq!(parse("help"), Ok(Some(UiCommand::Help)));
        assert_eq!(parse("q"), Ok(Some(UiCommand::Quit)));
        assert!(parse("jump").is_err());
    }

    #[test]
    fn test_exclude_command_expands_to_one_message_per_token() {
        let messages =
            UiCommand::Exclude(vec!["fire".to_string(), "flying".to_string()]).into_messages();
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            &messages[1],
            Message::Session(SessionMessage::ExcludeValue(token)) if token == "flying"
        ));
        assert!(UiCommand::Quit.into_messages().is_empty());
    }
}
