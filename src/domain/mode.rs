//! Game-mode presets.

use serde::{Deserialize, Serialize};

/// Victory condition of a game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WinningMode {
    /// The game runs until a single solvent player remains.
    #[default]
    #[serde(rename = "last-standing")]
    LastStanding,
    /// The game ends as soon as one player completes a color monopoly.
    #[serde(rename = "monopols")]
    Monopols,
}

/// Immutable rule preset, selected once per room while it is still in the
/// lobby. Wire field names (`Name`, `startingCash`, `AllowDeals`,
/// `WinningMode`) are part of the client protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMode {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "startingCash")]
    pub starting_cash: i64,
    #[serde(rename = "AllowDeals")]
    pub allow_deals: bool,
    #[serde(rename = "WinningMode")]
    pub winning_mode: WinningMode,
}
