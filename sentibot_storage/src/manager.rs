use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
};
use sentibot_core::{Sender, StorageError, TranscriptEntry, TranscriptStore};
use sentibot_entities::messages;
use tracing::{debug, info, warn};

use crate::convert;

/// Transcript store over a relational database.
///
/// Works with any backend sea-orm is built for; the `messages` table is
/// created on first connect.
pub struct TranscriptManager {
    db: DatabaseConnection,
}

impl TranscriptManager {
    /// Connect to `database_url` and make sure the schema exists.
    ///
    /// # Arguments
    /// * `database_url` - e.g. `sqlite://chat_history.db?mode=rwc` or `sqlite::memory:`
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to transcript database");
        let db = Database::connect(database_url).await?;
        Self::ensure_schema(&db).await?;
        info!("TranscriptManager initialized");
        Ok(Self { db })
    }

    /// Wrap an existing connection. The schema is created if missing.
    pub async fn from_connection(db: DatabaseConnection) -> anyhow::Result<Self> {
        Self::ensure_schema(&db).await?;
        Ok(Self { db })
    }

    async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(messages::Entity);
        stmt.if_not_exists();
        db.execute_unprepared(&backend.build(&stmt).to_string()).await?;
        debug!("messages table ready");
        Ok(())
    }

    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Number of entries currently stored for a session.
    pub async fn count(&self, session_id: &str) -> Result<u64, StorageError> {
        messages::Entity::find()
            .filter(messages::Column::SessionId.eq(session_id))
            .count(&self.db)
            .await
            .map_err(|e| StorageError::Fetch {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl TranscriptStore for TranscriptManager {
    async fn append(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let row = messages::ActiveModel {
            id: NotSet,
            session_id: Set(session_id.to_string()),
            timestamp: Set(timestamp),
            sender: Set(sender.as_str().to_string()),
            message: Set(text.to_string()),
        };

        messages::Entity::insert(row)
            .exec(&self.db)
            .await
            .map_err(|e| StorageError::Append {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Appended {sender} entry to session: {session_id}");
        Ok(())
    }

    async fn fetch_all(&self, session_id: &str) -> Result<Vec<TranscriptEntry>, StorageError> {
        let rows = messages::Entity::find()
            .filter(messages::Column::SessionId.eq(session_id))
            .order_by_asc(messages::Column::Timestamp)
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| StorageError::Fetch {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match convert::entry_from_model(row) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping transcript row: {e}");
                    None
                }
            })
            .collect())
    }

    async fn delete_all(&self, session_id: &str) -> Result<(), StorageError> {
        let result = messages::Entity::delete_many()
            .filter(messages::Column::SessionId.eq(session_id))
            .exec(&self.db)
            .await
            .map_err(|e| StorageError::Delete {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })?;

        info!(
            "Cleared {} transcript entries for session: {}",
            result.rows_affected, session_id
        );
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        messages::Entity::find()
            .select_only()
            .column(messages::Column::SessionId)
            .distinct()
            .order_by_asc(messages::Column::SessionId)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}
