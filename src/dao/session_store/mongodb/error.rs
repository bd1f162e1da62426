use thiserror::Error;

pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Errors specific to the MongoDB session store backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        #[source]
        source: mongodb::error::Error,
    },
    #[error("initial MongoDB ping failed after {attempts} attempts")]
    InitialPing {
        attempts: u32,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("MongoDB health ping failed")]
    HealthPing {
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to create session `{game_id}`")]
    CreateSession {
        game_id: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to load session `{game_id}`")]
    LoadSession {
        game_id: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to update session `{game_id}`")]
    UpdateSession {
        game_id: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to serialize session data to BSON")]
    Serialize {
        #[source]
        source: mongodb::bson::error::Error,
    },
    #[error("stored session has a malformed turn key `{key}`")]
    MalformedTurnKey { key: String },
}
