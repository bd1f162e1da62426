use std::collections::BTreeMap;

use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use super::error::MongoDaoError;
use crate::dao::models::{
    GameSessionEntity, GameStatusEntity, PlayerSlotEntity, TurnRecordEntity,
};

/// Session document as stored in the `game_sessions` collection.
///
/// Turn records live in a sub-document keyed by the decimal turn number, so
/// targeted updates can address a single record as `turns.<n>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSessionDocument {
    #[serde(rename = "_id")]
    id: String,
    users: [PlayerSlotEntity; 2],
    max_turns: u32,
    current_turn: u32,
    status: GameStatusEntity,
    turns: BTreeMap<String, TurnRecordEntity>,
    created_at: DateTime,
}

impl From<GameSessionEntity> for MongoSessionDocument {
    fn from(value: GameSessionEntity) -> Self {
        Self {
            id: value.game_id,
            users: value.users,
            max_turns: value.max_turns,
            current_turn: value.current_turn,
            status: value.status,
            turns: value
                .turns
                .into_iter()
                .map(|(turn, record)| (turn.to_string(), record))
                .collect(),
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoSessionDocument> for GameSessionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoSessionDocument) -> Result<Self, Self::Error> {
        let turns = value
            .turns
            .into_iter()
            .map(|(key, record)| {
                key.parse::<u32>()
                    .map(|turn| (turn, record))
                    .map_err(|_| MongoDaoError::MalformedTurnKey { key })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            game_id: value.id,
            users: value.users,
            max_turns: value.max_turns,
            current_turn: value.current_turn,
            status: value.status,
            turns,
            created_at: value.created_at.to_system_time(),
        })
    }
}

pub fn doc_id(game_id: &str) -> Document {
    doc! {"_id": game_id}
}
