use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema, Set};
use sentibot_core::{SessionState, SessionStateStore, StorageError};
use sentibot_entities::sessions;
use tracing::{debug, info};

use crate::convert;

/// Session state persisted in the `sessions` table, so `chat --session ID`
/// resumes where the last process stopped.
pub struct SessionStateManager {
    db: DatabaseConnection,
}

impl SessionStateManager {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let db = Database::connect(database_url).await?;
        Self::from_connection(db).await
    }

    /// Share an existing connection, e.g. the transcript store's.
    pub async fn from_connection(db: DatabaseConnection) -> anyhow::Result<Self> {
        Self::ensure_schema(&db).await?;
        info!("SessionStateManager initialized");
        Ok(Self { db })
    }

    async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(sessions::Entity);
        stmt.if_not_exists();
        db.execute_unprepared(&backend.build(&stmt).to_string()).await?;
        debug!("sessions table ready");
        Ok(())
    }

    fn state_error(session_id: &str, e: &DbErr) -> StorageError {
        StorageError::State {
            session_id: session_id.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl SessionStateStore for SessionStateManager {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, StorageError> {
        sessions::Entity::find_by_id(session_id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| Self::state_error(session_id, &e))?
            .map(convert::state_from_model)
            .transpose()
    }

    async fn save(&self, session_id: &str, state: &SessionState) -> Result<(), StorageError> {
        let row = sessions::ActiveModel {
            session_id: Set(session_id.to_string()),
            interaction_count: Set(i64::from(state.interaction_count)),
            awaiting_feedback: Set(state.awaiting_feedback),
            recognized_name: Set(state.recognized_name.clone()),
            updated_at: Set(Utc::now()),
        };

        let exists = sessions::Entity::find_by_id(session_id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| Self::state_error(session_id, &e))?
            .is_some();

        if exists {
            sessions::Entity::update(row)
                .exec(&self.db)
                .await
                .map_err(|e| Self::state_error(session_id, &e))?;
        } else {
            sessions::Entity::insert(row)
                .exec_without_returning(&self.db)
                .await
                .map_err(|e| Self::state_error(session_id, &e))?;
        }

        debug!(
            "Saved state for session {session_id} (count {}, awaiting feedback: {})",
            state.interaction_count, state.awaiting_feedback
        );
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<(), StorageError> {
        sessions::Entity::delete_by_id(session_id.to_owned())
            .exec(&self.db)
            .await
            .map_err(|e| Self::state_error(session_id, &e))?;
        Ok(())
    }
}
