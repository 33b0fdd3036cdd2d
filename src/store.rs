use crate::entity::dreams;
use crate::interpret::{DEFAULT_CONFIDENCE, DEFAULT_EMOTION};
use sea_orm::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub(crate) const DB_FILE: &str = "dreams.db";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamRecord {
    pub id: i64,
    pub dream_text: String,
    pub interpretation: String,
    pub emotion: String,
    pub confidence: f64,
}

impl From<dreams::Model> for DreamRecord {
    fn from(r: dreams::Model) -> Self {
        Self {
            id: r.id,
            dream_text: r.dream_text,
            interpretation: r.interpretation,
            emotion: r.emotion.unwrap_or_else(|| DEFAULT_EMOTION.to_string()),
            confidence: r.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDream {
    pub dream_text: String,
    pub interpretation: String,
    pub emotion: String,
    pub confidence: f64,
}

/// SQLite-backed dream history. Each operation opens its own connection on a
/// blocking thread and drops it before returning.
pub struct DreamStore {
    db_url: String,
}

impl DreamStore {
    pub async fn new(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)?;
        let db_path = data_dir.join(DB_FILE);
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        tokio::task::spawn_blocking({
            let db_url = db_url.clone();
            move || -> Result<(), StoreError> {
                let db = Database::connect(&db_url)?;

                db.get_schema_builder()
                    .register(dreams::Entity)
                    .sync(&db)?;

                Ok(())
            }
        })
        .await??;

        info!("Dream store ready ({})", db_path.display());
        Ok(Self { db_url })
    }

    pub async fn create(&self, dream: NewDream) -> Result<DreamRecord, StoreError> {
        let record = dreams::ActiveModel {
            id: NotSet,
            dream_text: Set(dream.dream_text),
            interpretation: Set(dream.interpretation),
            emotion: Set(Some(dream.emotion)),
            confidence: Set(Some(dream.confidence)),
        };

        let db_url = self.db_url.clone();
        let saved = tokio::task::spawn_blocking(move || -> Result<dreams::Model, StoreError> {
            let db = Database::connect(&db_url)?;
            Ok(record.insert(&db)?)
        })
        .await??;

        info!("Stored dream #{}", saved.id);
        Ok(saved.into())
    }

    /// All records in insertion order.
    pub async fn list_all(&self) -> Result<Vec<DreamRecord>, StoreError> {
        let db_url = self.db_url.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<DreamRecord>, StoreError> {
            let db = Database::connect(&db_url)?;
            let rows = dreams::Entity::find()
                .order_by_asc(dreams::Column::Id)
                .all(&db)?;

            Ok(rows.into_iter().map(|r| r.into()).collect())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_dream(text: &str, emotion: &str, confidence: f64) -> NewDream {
        NewDream {
            dream_text: text.to_string(),
            interpretation: format!("about {}", text),
            emotion: emotion.to_string(),
            confidence,
        }
    }

    async fn open() -> (TempDir, DreamStore) {
        let dir = TempDir::new().unwrap();
        let store = DreamStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn create_assigns_id_and_keeps_fields() {
        let (_dir, store) = open().await;

        let saved = store
            .create(new_dream("I flew over mountains", "Joy", 0.87))
            .await
            .unwrap();

        assert!(saved.id > 0);
        assert_eq!(saved.dream_text, "I flew over mountains");
        assert_eq!(saved.interpretation, "about I flew over mountains");
        assert_eq!(saved.emotion, "Joy");
        assert_eq!(saved.confidence, 0.87);
    }

    #[tokio::test]
    async fn list_all_returns_insertion_order() {
        let (_dir, store) = open().await;

        let first = store.create(new_dream("falling", "Fear", 0.2)).await.unwrap();
        let second = store.create(new_dream("flying", "Joy", 0.9)).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![first.clone(), second.clone()]);
        assert!(first.id < second.id);

        assert_eq!(store.list_all().await.unwrap(), all);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let (_dir, store) = open().await;
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let saved = {
            let store = DreamStore::new(dir.path()).await.unwrap();
            store.create(new_dream("teeth", "Anxiety", 0.6)).await.unwrap()
        };

        let reopened = DreamStore::new(dir.path()).await.unwrap();
        assert_eq!(reopened.list_all().await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn null_columns_read_back_as_defaults() {
        let (_dir, store) = open().await;

        let db_url = store.db_url.clone();
        tokio::task::spawn_blocking(move || {
            let db = Database::connect(&db_url).unwrap();
            dreams::ActiveModel {
                id: NotSet,
                dream_text: Set("edited by hand".into()),
                interpretation: Set("n/a".into()),
                emotion: Set(None),
                confidence: Set(None),
            }
            .insert(&db)
            .unwrap();
        })
        .await
        .unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].emotion, DEFAULT_EMOTION);
        assert_eq!(all[0].confidence, DEFAULT_CONFIDENCE);
    }
}
