//! Per-participant state and its wire-safe snapshot form.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Volatile identifier of a live connection. Reassigned on every rejoin;
/// the durable identity of a player is their username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generate a fresh id for a newly accepted connection.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque board-space token. The server relays and exchanges these without
/// interpreting them; clients compute ownership transitions themselves.
pub type PropertyToken = serde_json::Value;

/// Mutable state of one participant. Serializes under the same field names
/// as [`PlayerSnapshot`] so debug output matches the wire format.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: ConnectionId,
    pub username: String,
    pub icon: usize,
    pub position: u8,
    /// May go negative transiently; a non-positive balance marks the player
    /// as eliminated at the next turn advance.
    pub balance: i64,
    pub properties: Vec<PropertyToken>,
    #[serde(rename = "isInJail")]
    pub is_in_jail: bool,
    #[serde(rename = "jailTurnsRemaining")]
    pub jail_turns_remaining: u32,
    #[serde(rename = "getoutCards")]
    pub getout_cards: u32,
}

impl Player {
    pub fn new(id: ConnectionId, username: impl Into<String>, icon: usize, cash: i64) -> Self {
        Self {
            id,
            username: username.into(),
            icon,
            position: 0,
            balance: cash,
            properties: Vec::new(),
            is_in_jail: false,
            jail_turns_remaining: 0,
            getout_cards: 0,
        }
    }

    /// Produce an immutable wire-safe copy of all mutable fields, used both
    /// for broadcast and for persistence writes.
    pub fn to_snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id.clone(),
            username: self.username.clone(),
            icon: self.icon,
            position: self.position,
            balance: self.balance,
            properties: self.properties.clone(),
            is_in_jail: self.is_in_jail,
            jail_turns_remaining: self.jail_turns_remaining,
            getout_cards: self.getout_cards,
        }
    }

    /// Apply a client-submitted snapshot in place, only if the snapshot's
    /// identity matches this record. A mismatched identity is a silent no-op,
    /// not an error: it prevents one client from overwriting another player's
    /// record via a stale or mis-keyed payload.
    ///
    /// Username and icon are fixed at join time and never overwritten.
    pub fn apply_snapshot(&mut self, snapshot: &PlayerSnapshot) {
        if self.id != snapshot.id {
            return;
        }
        self.position = snapshot.position;
        self.balance = snapshot.balance;
        self.properties = snapshot.properties.clone();
        self.is_in_jail = snapshot.is_in_jail;
        self.jail_turns_remaining = snapshot.jail_turns_remaining;
        self.getout_cards = snapshot.getout_cards;
    }
}

/// Point-in-time copy of a [`Player`]. Field names match the wire format
/// expected by clients (`pJson` payloads).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: ConnectionId,
    pub username: String,
    pub icon: usize,
    pub position: u8,
    pub balance: i64,
    pub properties: Vec<PropertyToken>,
    #[serde(rename = "isInJail")]
    pub is_in_jail: bool,
    #[serde(rename = "jailTurnsRemaining")]
    pub jail_turns_remaining: u32,
    #[serde(rename = "getoutCards")]
    pub getout_cards: u32,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn test_player(id: &str) -> Player {
        Player::new(ConnectionId::new(id), "alice", 0, 1500)
    }

    #[test]
    fn test_snapshot_round_trip_is_idempotent() {
        // given (precondition): a player with some mid-game state
        let mut player = test_player("conn-1");
        player.position = 24;
        player.balance = 820;
        player.properties = vec![json!({ "posistion": 24 })];
        player.is_in_jail = true;
        player.jail_turns_remaining = 2;
        player.getout_cards = 1;
        let before = player.to_snapshot();

        // when (operation): applying the player's own snapshot back
        player.apply_snapshot(&before);

        // then (expected result): nothing changed
        assert_eq!(player.to_snapshot(), before);
    }

    #[test]
    fn test_apply_snapshot_with_mismatched_identity_is_a_no_op() {
        // given (precondition): a snapshot carrying a different connection id
        let mut player = test_player("conn-1");
        let mut foreign = test_player("conn-2").to_snapshot();
        foreign.balance = 1;
        foreign.position = 39;

        // when (operation):
        player.apply_snapshot(&foreign);

        // then (expected result): the record is untouched
        assert_eq!(player.balance, 1500);
        assert_eq!(player.position, 0);
    }

    #[test]
    fn test_apply_snapshot_does_not_overwrite_username_or_icon() {
        let mut player = test_player("conn-1");
        let mut snapshot = player.to_snapshot();
        snapshot.username = "mallory".to_string();
        snapshot.icon = 5;
        snapshot.balance = 900;

        player.apply_snapshot(&snapshot);

        assert_eq!(player.username, "alice");
        assert_eq!(player.icon, 0);
        assert_eq!(player.balance, 900);
    }

    #[test]
    fn test_snapshot_wire_field_names() {
        // Clients depend on these exact field names.
        let value = serde_json::to_value(test_player("conn-1").to_snapshot()).unwrap();
        let object = value.as_object().unwrap();
        for field in [
            "id",
            "username",
            "icon",
            "position",
            "balance",
            "properties",
            "isInJail",
            "jailTurnsRemaining",
            "getoutCards",
        ] {
            assert!(object.contains_key(field), "missing field '{field}'");
        }
    }
}
