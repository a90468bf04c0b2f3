//! Host event types for the Autosquelch event feed.
//!
//! A host (the CLI, or an adapter around a deck tracker) forwards game
//! signals as append-only JSONL, one event per line. Blank lines and lines
//! starting with `#` are ignored.

use serde::{Deserialize, Serialize};

use crate::mode::GameMode;

/// Whose turn just started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivePlayer {
    Player,
    Opponent,
}

/// Discriminated union of host events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A new match began.
    GameStart {
        #[serde(default)]
        mode: GameMode,
    },

    /// The current match ended.
    GameEnd,

    /// The host learned the match's mode after it started.
    ModeChange { mode: GameMode },

    /// A turn began.
    TurnStart { active_player: ActivePlayer },

    /// The user pressed the enable/disable hotkey.
    Toggle,

    /// The host is unloading the plugin.
    Unload,
}

impl HostEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::GameStart { .. } => "game_start",
            HostEvent::GameEnd => "game_end",
            HostEvent::ModeChange { .. } => "mode_change",
            HostEvent::TurnStart { .. } => "turn_start",
            HostEvent::Toggle => "toggle",
            HostEvent::Unload => "unload",
        }
    }
}

/// Parse a single feed line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_event_line(line: &str) -> Result<Option<HostEvent>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Parse events from JSONL content (one JSON object per line).
pub fn parse_events(jsonl: &str) -> Result<Vec<HostEvent>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize events to JSONL format.
pub fn serialize_events(events: &[HostEvent]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_skips_comments_and_blanks() {
        let jsonl = "# recorded session\n\
                     {\"type\":\"game_start\",\"mode\":\"ranked\"}\n\
                     \n\
                     {\"type\":\"turn_start\",\"active_player\":\"opponent\"}\n\
                     {\"type\":\"toggle\"}\n";
        let events = parse_events(jsonl).unwrap();
        assert_eq!(
            events,
            vec![
                HostEvent::GameStart {
                    mode: GameMode::Ranked
                },
                HostEvent::TurnStart {
                    active_player: ActivePlayer::Opponent
                },
                HostEvent::Toggle,
            ]
        );
    }

    #[test]
    fn test_game_start_mode_defaults_to_none() {
        let event = parse_event_line(r#"{"type":"game_start"}"#).unwrap();
        assert_eq!(
            event,
            Some(HostEvent::GameStart {
                mode: GameMode::None
            })
        );
    }

    #[test]
    fn test_parse_event_line_ignores_comment() {
        assert_eq!(parse_event_line("   # note").unwrap(), None);
        assert_eq!(parse_event_line("").unwrap(), None);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(parse_event_line(r#"{"type":"mulligan"}"#).is_err());
    }

    #[test]
    fn test_json_format_uses_type_tag() {
        let json = serde_json::to_string(&HostEvent::ModeChange {
            mode: GameMode::Arena,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"mode_change\""));
        assert!(json.contains("\"mode\":\"arena\""));
    }

    #[test]
    fn test_serialized_feed_parses_back() {
        let events = vec![
            HostEvent::GameStart {
                mode: GameMode::Casual,
            },
            HostEvent::TurnStart {
                active_player: ActivePlayer::Player,
            },
            HostEvent::GameEnd,
            HostEvent::Unload,
        ];
        let jsonl = serialize_events(&events).unwrap();
        assert_eq!(parse_events(&jsonl).unwrap(), events);
    }
}
