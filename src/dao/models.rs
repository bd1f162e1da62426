use std::{collections::BTreeMap, time::SystemTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A client waiting to be paired, as carried by the pending queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entrant {
    /// Opaque identifier of the originating connection.
    pub connection_id: String,
    /// Display name the client entered with.
    pub name: String,
}

/// One of the two fixed player slots stored on a game session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSlotEntity {
    /// Opaque identifier of the player's connection.
    pub connection_id: String,
    /// Display name chosen by the player.
    pub name: String,
}

/// Persisted lifecycle status of a whole game session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStatusEntity {
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "ongoing")]
    Ongoing,
    #[serde(rename = "finished")]
    Finished,
}

/// Persisted status of a single turn record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnStatusEntity {
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "ongoing")]
    Ongoing,
    #[serde(rename = "finished")]
    Finished,
}

/// Persisted hand submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandEntity {
    Rock,
    Scissors,
    Paper,
}

/// Outcome stored once both hands of a turn are resolved.
///
/// `winner` holds the winning display name, or `"even"` for a draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnResultEntity {
    pub winner: String,
}

/// Per-turn sub-record: submitted hands keyed by display name plus the
/// computed result once the turn is closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnRecordEntity {
    pub status: TurnStatusEntity,
    #[serde(default)]
    pub hands: IndexMap<String, HandEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TurnResultEntity>,
}

/// Aggregate game session entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSessionEntity {
    /// Primary key of the session; never reused.
    pub game_id: String,
    /// The two players, assigned at creation and immutable thereafter.
    pub users: [PlayerSlotEntity; 2],
    /// Fixed number of turns this match is played over.
    pub max_turns: u32,
    /// Turn currently being played, in `1..=max_turns`.
    pub current_turn: u32,
    /// Lifecycle status of the session.
    pub status: GameStatusEntity,
    /// Turn records pre-populated for every turn at creation.
    pub turns: BTreeMap<u32, TurnRecordEntity>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
}
