//! Game modes reported by the host.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of match the game client is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// No match, or the mode is not known yet.
    #[default]
    None,
    /// Solo adventures against the AI.
    Practice,
    Ranked,
    Casual,
    Arena,
    Brawl,
    Friendly,
    Spectator,
    Duels,
    Mercenaries,
    /// Eight-player mode where there is no single opponent portrait.
    Battlegrounds,
}

impl GameMode {
    pub const ALL: [GameMode; 11] = [
        GameMode::None,
        GameMode::Practice,
        GameMode::Ranked,
        GameMode::Casual,
        GameMode::Arena,
        GameMode::Brawl,
        GameMode::Friendly,
        GameMode::Spectator,
        GameMode::Duels,
        GameMode::Mercenaries,
        GameMode::Battlegrounds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::None => "none",
            GameMode::Practice => "practice",
            GameMode::Ranked => "ranked",
            GameMode::Casual => "casual",
            GameMode::Arena => "arena",
            GameMode::Brawl => "brawl",
            GameMode::Friendly => "friendly",
            GameMode::Spectator => "spectator",
            GameMode::Duels => "duels",
            GameMode::Mercenaries => "mercenaries",
            GameMode::Battlegrounds => "battlegrounds",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_display() {
        for mode in GameMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{mode}\""));
        }
    }

    #[test]
    fn default_is_none() {
        assert_eq!(GameMode::default(), GameMode::None);
    }
}
