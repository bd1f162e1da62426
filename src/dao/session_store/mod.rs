pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::models::{GameSessionEntity, GameStatusEntity, TurnRecordEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for game sessions.
///
/// Mutations are targeted: callers update one field or one turn record at a
/// time rather than rewriting the whole session, so two concurrent
/// submissions against different parts of a session do not clobber each
/// other. `advance_turn` applies its three effects (close the finished turn,
/// open the next one, bump the counter) atomically or not at all.
pub trait SessionStore: Send + Sync {
    fn create(&self, session: GameSessionEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find(&self, game_id: &str) -> BoxFuture<'static, StorageResult<Option<GameSessionEntity>>>;
    fn update_status(
        &self,
        game_id: &str,
        status: GameStatusEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn update_turn_record(
        &self,
        game_id: &str,
        turn: u32,
        record: TurnRecordEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn advance_turn(&self, game_id: &str, from_turn: u32) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
