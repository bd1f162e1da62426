use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{
    Client, Collection, Database,
    bson::{doc, serialize_to_bson},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoSessionDocument, doc_id},
};
use crate::dao::{
    models::{GameSessionEntity, GameStatusEntity, TurnRecordEntity},
    session_store::SessionStore,
    storage::StorageResult,
};

const SESSION_COLLECTION_NAME: &str = "game_sessions";

#[derive(Clone)]
pub struct MongoSessionStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoSessionStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn collection(&self) -> Collection<MongoSessionDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoSessionDocument>(SESSION_COLLECTION_NAME)
    }

    async fn create(&self, session: GameSessionEntity) -> MongoResult<()> {
        let game_id = session.game_id.clone();
        let document: MongoSessionDocument = session.into();
        let collection = self.collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::CreateSession { game_id, source })?;
        Ok(())
    }

    async fn find(&self, game_id: &str) -> MongoResult<Option<GameSessionEntity>> {
        let collection = self.collection().await;

        let document = collection
            .find_one(doc_id(game_id))
            .await
            .map_err(|source| MongoDaoError::LoadSession {
                game_id: game_id.to_owned(),
                source,
            })?;

        document.map(GameSessionEntity::try_from).transpose()
    }

    async fn update_status(&self, game_id: &str, status: GameStatusEntity) -> MongoResult<()> {
        let status = serialize_to_bson(&status).map_err(|source| MongoDaoError::Serialize { source })?;
        let collection = self.collection().await;
        collection
            .update_one(doc_id(game_id), doc! { "$set": { "status": status } })
            .await
            .map_err(|source| MongoDaoError::UpdateSession {
                game_id: game_id.to_owned(),
                source,
            })?;
        Ok(())
    }

    async fn update_turn_record(
        &self,
        game_id: &str,
        turn: u32,
        record: TurnRecordEntity,
    ) -> MongoResult<()> {
        let record = serialize_to_bson(&record).map_err(|source| MongoDaoError::Serialize { source })?;
        let collection = self.collection().await;
        collection
            .update_one(
                doc_id(game_id),
                doc! { "$set": { format!("turns.{turn}"): record } },
            )
            .await
            .map_err(|source| MongoDaoError::UpdateSession {
                game_id: game_id.to_owned(),
                source,
            })?;
        Ok(())
    }

    /// Close `from_turn`, open the next turn, and bump the counter in one
    /// atomic update document.
    async fn advance_turn(&self, game_id: &str, from_turn: u32) -> MongoResult<()> {
        let collection = self.collection().await;
        collection
            .update_one(
                doc_id(game_id),
                doc! {
                    "$set": {
                        format!("turns.{from_turn}.status"): "finished",
                        format!("turns.{}.status", from_turn + 1): "ongoing",
                    },
                    "$inc": { "current_turn": 1 },
                },
            )
            .await
            .map_err(|source| MongoDaoError::UpdateSession {
                game_id: game_id.to_owned(),
                source,
            })?;
        Ok(())
    }
}

impl SessionStore for MongoSessionStore {
    fn create(&self, session: GameSessionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.create(session).await.map_err(Into::into) })
    }

    fn find(&self, game_id: &str) -> BoxFuture<'static, StorageResult<Option<GameSessionEntity>>> {
        let store = self.clone();
        let game_id = game_id.to_owned();
        Box::pin(async move { store.find(&game_id).await.map_err(Into::into) })
    }

    fn update_status(
        &self,
        game_id: &str,
        status: GameStatusEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let game_id = game_id.to_owned();
        Box::pin(async move {
            store
                .update_status(&game_id, status)
                .await
                .map_err(Into::into)
        })
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
            store
                .update_turn_record(&game_id, turn, record)
                .await
                .map_err(Into::into)
        })
    }

    fn advance_turn(&self, game_id: &str, from_turn: u32) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let game_id = game_id.to_owned();
        Box::pin(async move {
            store
                .advance_turn(&game_id, from_turn)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
