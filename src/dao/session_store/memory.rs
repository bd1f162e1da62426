use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use super::SessionStore;
use crate::dao::{
    models::{GameSessionEntity, GameStatusEntity, TurnRecordEntity, TurnStatusEntity},
    storage::{StorageError, StorageResult},
};

/// Process-local session store used when no database backend is configured
/// (and by the test suite).
///
/// Each targeted update runs under the session's map entry lock, which gives
/// `advance_turn` the same all-three-effects-or-none behavior the database
/// backends provide with a single update document.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, GameSessionEntity>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_session<F>(&self, game_id: &str, mutate: F) -> StorageResult<()>
    where
        F: FnOnce(&mut GameSessionEntity),
    {
        let mut entry =
            self.sessions
                .get_mut(game_id)
                .ok_or_else(|| StorageError::NoSuchSession {
                    game_id: game_id.to_owned(),
                })?;
        mutate(entry.value_mut());
        Ok(())
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, session: GameSessionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.sessions.insert(session.game_id.clone(), session);
            Ok(())
        })
    }

    fn find(&self, game_id: &str) -> BoxFuture<'static, StorageResult<Option<GameSessionEntity>>> {
        let store = self.clone();
        let game_id = game_id.to_owned();
        Box::pin(async move { Ok(store.sessions.get(&game_id).map(|entry| entry.value().clone())) })
    }

    fn update_status(
        &self,
        game_id: &str,
        status: GameStatusEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let game_id = game_id.to_owned();
        Box::pin(async move { store.with_session(&game_id, |session| session.status = status) })
    }

    fn update_turn_record(
        &self,
        game_id: &str,
        turn: u32,
        record: TurnRecordEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let game_id = game_id.to_owned();
        Box::pin(async move {
            store.with_session(&game_id, |session| {
                session.turns.insert(turn, record);
            })
        })
    }

    fn advance_turn(&self, game_id: &str, from_turn: u32) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let game_id = game_id.to_owned();
        Box::pin(async move {
            store.with_session(&game_id, |session| {
                if let Some(record) = session.turns.get_mut(&from_turn) {
                    record.status = TurnStatusEntity::Finished;
                }
                if let Some(record) = session.turns.get_mut(&(from_turn + 1)) {
                    record.status = TurnStatusEntity::Ongoing;
                }
                session.current_turn += 1;
            })
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::PlayerSlotEntity;
    use std::collections::BTreeMap;
    use std::time::SystemTime;

    fn sample_session(game_id: &str) -> GameSessionEntity {
        let turns = (1..=3)
            .map(|turn| {
                (
                    turn,
                    TurnRecordEntity {
                        status: if turn == 1 {
                            TurnStatusEntity::Ongoing
                        } else {
                            TurnStatusEntity::NotStarted
                        },
                        hands: Default::default(),
                        result: None,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        GameSessionEntity {
            game_id: game_id.into(),
            users: [
                PlayerSlotEntity {
                    connection_id: "c1".into(),
                    name: "alice".into(),
                },
                PlayerSlotEntity {
                    connection_id: "c2".into(),
                    name: "bob".into(),
                },
            ],
            max_turns: 3,
            current_turn: 1,
            status: GameStatusEntity::NotStarted,
            turns,
            created_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn find_returns_created_sessions_and_misses_unknown_ids() {
        let store = MemorySessionStore::new();
        store.create(sample_session("rps-1")).await.unwrap();

        assert!(store.find("rps-1").await.unwrap().is_some());
        assert!(store.find("rps-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn advance_turn_applies_all_three_effects() {
        let store = MemorySessionStore::new();
        store.create(sample_session("rps-1")).await.unwrap();

        store.advance_turn("rps-1", 1).await.unwrap();

        let session = store.find("rps-1").await.unwrap().unwrap();
        assert_eq!(session.current_turn, 2);
        assert_eq!(session.turns[&1].status, TurnStatusEntity::Finished);
        assert_eq!(session.turns[&2].status, TurnStatusEntity::Ongoing);
        assert_eq!(session.turns[&3].status, TurnStatusEntity::NotStarted);
    }

    #[tokio::test]
    async fn updates_against_missing_sessions_fail() {
        let store = MemorySessionStore::new();
        let result = store
            .update_status("rps-404", GameStatusEntity::Finished)
            .await;
        assert!(matches!(result, Err(StorageError::NoSuchSession { .. })));
    }
}
