//! Immutable game content: card decks and game-mode presets.
//!
//! The server never interprets card effects; a drawn card is broadcast
//! verbatim and clients apply it locally.

use serde::{Deserialize, Serialize};

use super::mode::GameMode;

/// One chance / community-chest card. Optional fields are omitted from the
/// wire when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tileid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    modes: Vec<GameMode>,
    chance: Vec<Card>,
    communitychest: Vec<Card>,
}

/// Immutable lookup of decks and mode presets, loaded once at startup.
#[derive(Debug)]
pub struct ContentStore {
    chance: Vec<Card>,
    community_chest: Vec<Card>,
    modes: Vec<GameMode>,
}

impl ContentStore {
    /// Load the content bundled into the binary at build time.
    pub fn bundled() -> Self {
        let file: ContentFile = serde_json::from_str(include_str!("../../data/cards.json"))
            .expect("bundled cards.json is valid");
        Self {
            chance: file.chance,
            community_chest: file.communitychest,
            modes: file.modes,
        }
    }

    /// The chance deck or the community-chest deck.
    pub fn deck(&self, is_chance: bool) -> &[Card] {
        if is_chance {
            &self.chance
        } else {
            &self.community_chest
        }
    }

    pub fn modes(&self) -> &[GameMode] {
        &self.modes
    }

    /// The preset a fresh room starts with (first in the bundle).
    pub fn default_mode(&self) -> GameMode {
        self.modes[0].clone()
    }
}
