use std::{collections::BTreeMap, time::SystemTime};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::models::{
    Entrant, GameSessionEntity, GameStatusEntity, HandEntity, PlayerSlotEntity, TurnRecordEntity,
    TurnResultEntity, TurnStatusEntity,
};

/// One of the two fixed player slots of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSlot {
    /// Opaque identifier of the player's connection.
    pub connection_id: String,
    /// Display name chosen by the player.
    pub name: String,
}

/// Lifecycle status of a whole game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    Ongoing,
    Finished,
}

/// Status of a single turn record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    NotStarted,
    Ongoing,
    Finished,
}

/// A playable hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Rock,
    Scissors,
    Paper,
}

impl Hand {
    /// Parse a submitted hand string, returning `None` for anything outside
    /// the three legal values.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "rock" => Some(Hand::Rock),
            "scissors" => Some(Hand::Scissors),
            "paper" => Some(Hand::Paper),
            _ => None,
        }
    }

    /// Wire representation of the hand.
    pub fn as_str(self) -> &'static str {
        match self {
            Hand::Rock => "rock",
            Hand::Scissors => "scissors",
            Hand::Paper => "paper",
        }
    }

    /// Whether this hand defeats `other` under the rock/scissors/paper cycle.
    pub fn beats(self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors)
                | (Hand::Scissors, Hand::Paper)
                | (Hand::Paper, Hand::Rock)
        )
    }
}

/// Outcome of one resolved turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    /// Both players showed the same hand.
    Even,
    /// The named player took the turn.
    Player(String),
}

impl Winner {
    /// Wire representation: the winning display name, or `"even"`.
    pub fn as_field(&self) -> String {
        match self {
            Winner::Even => "even".to_owned(),
            Winner::Player(name) => name.clone(),
        }
    }
}

/// Result stored on a closed turn record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub winner: Winner,
}

/// Per-turn record holding submitted hands keyed by display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub status: TurnStatus,
    pub hands: IndexMap<String, Hand>,
    pub result: Option<TurnResult>,
}

impl TurnRecord {
    fn open(status: TurnStatus) -> Self {
        Self {
            status,
            hands: IndexMap::new(),
            result: None,
        }
    }
}

/// Aggregated state for one two-player match and its turn history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    /// Primary key of the session; generated once, never reused.
    pub game_id: String,
    /// The two players, assigned at creation and immutable thereafter.
    pub users: [PlayerSlot; 2],
    /// Fixed number of turns this match is played over.
    pub max_turns: u32,
    /// Turn currently being played, in `1..=max_turns`.
    pub current_turn: u32,
    /// Lifecycle status of the session.
    pub status: GameStatus,
    /// Turn records pre-populated for every turn at creation, so lookups for
    /// a valid turn number never fail.
    pub turns: BTreeMap<u32, TurnRecord>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
}

impl GameSession {
    /// Build a fresh session for two paired entrants.
    ///
    /// Turn 1 starts `Ongoing`; every later turn stays `NotStarted` until
    /// `advance_turn` reaches it.
    pub fn new(first: Entrant, second: Entrant, max_turns: u32) -> Self {
        let turns = (1..=max_turns)
            .map(|turn| {
                let status = if turn == 1 {
                    TurnStatus::Ongoing
                } else {
                    TurnStatus::NotStarted
                };
                (turn, TurnRecord::open(status))
            })
            .collect();

        Self {
            game_id: format!("rps-{}", Uuid::new_v4()),
            users: [first.into(), second.into()],
            max_turns,
            current_turn: 1,
            status: GameStatus::NotStarted,
            turns,
            created_at: SystemTime::now(),
        }
    }

    /// The other of the two fixed player slots, identified by display name.
    pub fn opponent_of(&self, name: &str) -> &PlayerSlot {
        if self.users[1].name != name {
            &self.users[1]
        } else {
            &self.users[0]
        }
    }

    /// Record for the turn currently being played.
    pub fn current_record(&self) -> Option<&TurnRecord> {
        self.turns.get(&self.current_turn)
    }

    /// Display names of both players, in slot order.
    pub fn user_names(&self) -> Vec<String> {
        self.users.iter().map(|slot| slot.name.clone()).collect()
    }

    /// Connection identifiers of both players, in slot order.
    pub fn connection_ids(&self) -> [&str; 2] {
        [
            self.users[0].connection_id.as_str(),
            self.users[1].connection_id.as_str(),
        ]
    }
}

impl From<Entrant> for PlayerSlot {
    fn from(value: Entrant) -> Self {
        Self {
            connection_id: value.connection_id,
            name: value.name,
        }
    }
}

impl From<PlayerSlotEntity> for PlayerSlot {
    fn from(value: PlayerSlotEntity) -> Self {
        Self {
            connection_id: value.connection_id,
            name: value.name,
        }
    }
}

impl From<PlayerSlot> for PlayerSlotEntity {
    fn from(value: PlayerSlot) -> Self {
        Self {
            connection_id: value.connection_id,
            name: value.name,
        }
    }
}

impl From<GameStatusEntity> for GameStatus {
    fn from(value: GameStatusEntity) -> Self {
        match value {
            GameStatusEntity::NotStarted => GameStatus::NotStarted,
            GameStatusEntity::Ongoing => GameStatus::Ongoing,
            GameStatusEntity::Finished => GameStatus::Finished,
        }
    }
}

impl From<GameStatus> for GameStatusEntity {
    fn from(value: GameStatus) -> Self {
        match value {
            GameStatus::NotStarted => GameStatusEntity::NotStarted,
            GameStatus::Ongoing => GameStatusEntity::Ongoing,
            GameStatus::Finished => GameStatusEntity::Finished,
        }
    }
}

impl From<TurnStatusEntity> for TurnStatus {
    fn from(value: TurnStatusEntity) -> Self {
        match value {
            TurnStatusEntity::NotStarted => TurnStatus::NotStarted,
            TurnStatusEntity::Ongoing => TurnStatus::Ongoing,
            TurnStatusEntity::Finished => TurnStatus::Finished,
        }
    }
}

impl From<TurnStatus> for TurnStatusEntity {
    fn from(value: TurnStatus) -> Self {
        match value {
            TurnStatus::NotStarted => TurnStatusEntity::NotStarted,
            TurnStatus::Ongoing => TurnStatusEntity::Ongoing,
            TurnStatus::Finished => TurnStatusEntity::Finished,
        }
    }
}

impl From<HandEntity> for Hand {
    fn from(value: HandEntity) -> Self {
        match value {
            HandEntity::Rock => Hand::Rock,
            HandEntity::Scissors => Hand::Scissors,
            HandEntity::Paper => Hand::Paper,
        }
    }
}

impl From<Hand> for HandEntity {
    fn from(value: Hand) -> Self {
        match value {
            Hand::Rock => HandEntity::Rock,
            Hand::Scissors => HandEntity::Scissors,
            Hand::Paper => HandEntity::Paper,
        }
    }
}

impl From<TurnResultEntity> for TurnResult {
    fn from(value: TurnResultEntity) -> Self {
        let winner = if value.winner == "even" {
            Winner::Even
        } else {
            Winner::Player(value.winner)
        };
        Self { winner }
    }
}

impl From<TurnResult> for TurnResultEntity {
    fn from(value: TurnResult) -> Self {
        Self {
            winner: value.winner.as_field(),
        }
    }
}

impl From<TurnRecordEntity> for TurnRecord {
    fn from(value: TurnRecordEntity) -> Self {
        Self {
            status: value.status.into(),
            hands: value
                .hands
                .into_iter()
                .map(|(name, hand)| (name, hand.into()))
                .collect(),
            result: value.result.map(Into::into),
        }
    }
}

impl From<TurnRecord> for TurnRecordEntity {
    fn from(value: TurnRecord) -> Self {
        Self {
            status: value.status.into(),
            hands: value
                .hands
                .into_iter()
                .map(|(name, hand)| (name, hand.into()))
                .collect(),
            result: value.result.map(Into::into),
        }
    }
}

impl From<GameSessionEntity> for GameSession {
    fn from(value: GameSessionEntity) -> Self {
        let [first, second] = value.users;
        Self {
            game_id: value.game_id,
            users: [first.into(), second.into()],
            max_turns: value.max_turns,
            current_turn: value.current_turn,
            status: value.status.into(),
            turns: value
                .turns
                .into_iter()
                .map(|(turn, record)| (turn, record.into()))
                .collect(),
            created_at: value.created_at,
        }
    }
}

impl From<GameSession> for GameSessionEntity {
    fn from(value: GameSession) -> Self {
        let [first, second] = value.users;
        Self {
            game_id: value.game_id,
            users: [first.into(), second.into()],
            max_turns: value.max_turns,
            current_turn: value.current_turn,
            status: value.status.into(),
            turns: value
                .turns
                .into_iter()
                .map(|(turn, record)| (turn, record.into()))
                .collect(),
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrant(connection_id: &str, name: &str) -> Entrant {
        Entrant {
            connection_id: connection_id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn new_session_prepopulates_every_turn() {
        let session = GameSession::new(entrant("c1", "alice"), entrant("c2", "bob"), 5);

        assert_eq!(session.current_turn, 1);
        assert_eq!(session.status, GameStatus::NotStarted);
        assert_eq!(session.turns.len(), 5);
        assert_eq!(session.turns[&1].status, TurnStatus::Ongoing);
        for turn in 2..=5 {
            assert_eq!(session.turns[&turn].status, TurnStatus::NotStarted);
        }
    }

    #[test]
    fn opponent_is_the_other_slot() {
        let session = GameSession::new(entrant("c1", "alice"), entrant("c2", "bob"), 5);

        assert_eq!(session.opponent_of("alice").name, "bob");
        assert_eq!(session.opponent_of("bob").name, "alice");
    }

    #[test]
    fn hand_cycle() {
        assert!(Hand::Rock.beats(Hand::Scissors));
        assert!(Hand::Scissors.beats(Hand::Paper));
        assert!(Hand::Paper.beats(Hand::Rock));
        assert!(!Hand::Scissors.beats(Hand::Rock));
        assert!(!Hand::Rock.beats(Hand::Rock));
    }

    #[test]
    fn hand_parsing_rejects_anything_else() {
        assert_eq!(Hand::parse("rock"), Some(Hand::Rock));
        assert_eq!(Hand::parse("scissors"), Some(Hand::Scissors));
        assert_eq!(Hand::parse("paper"), Some(Hand::Paper));
        assert_eq!(Hand::parse("Rock"), None);
        assert_eq!(Hand::parse("lizard"), None);
        assert_eq!(Hand::parse(""), None);
    }

    #[test]
    fn entity_round_trip_preserves_the_session() {
        let mut session = GameSession::new(entrant("c1", "alice"), entrant("c2", "bob"), 3);
        let record = session.turns.get_mut(&1).unwrap();
        record.hands.insert("alice".into(), Hand::Rock);
        record.hands.insert("bob".into(), Hand::Scissors);
        record.result = Some(TurnResult {
            winner: Winner::Player("alice".into()),
        });
        record.status = TurnStatus::Finished;

        let entity: GameSessionEntity = session.clone().into();
        let back: GameSession = entity.into();
        assert_eq!(back, session);
    }
}
