use async_trait::async_trait;
use bson::doc;
use mongodb::{options::FindOptions, Database};
use tracing::error;

use crate::model::activity::ActivityEntry;
use crate::repository::collect_cursor;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record(&self, entry: ActivityEntry) -> RepositoryResult<()>;
    /// Most recent entries first.
    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActivityEntry>>;
}

pub struct MongoActivityRepository {
    collection: mongodb::Collection<ActivityEntry>,
}

impl MongoActivityRepository {
    pub fn new(db: &Database) -> Self {
        MongoActivityRepository { collection: db.collection::<ActivityEntry>("activity") }
    }
}

#[async_trait]
impl ActivityRepository for MongoActivityRepository {
    #[tracing::instrument(skip(self, entry), fields(kind = ?entry.kind))]
    async fn record(&self, entry: ActivityEntry) -> RepositoryResult<()> {
        self.collection.insert_one(entry, None).await.map(|_| ()).map_err(|e| {
            error!("Failed to record activity: {}", e);
            RepositoryError::from(e)
        })
    }

    #[tracing::instrument(skip(self))]
    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActivityEntry>> {
        let options = FindOptions::builder().sort(doc! { "timestamp": -1 }).limit(limit).build();
        let cursor = self.collection.find(None, options).await.map_err(|e| {
            error!("Failed to list activity: {}", e);
            RepositoryError::database(format!("Failed to list activity: {}", e))
        })?;
        collect_cursor(cursor, "activity entry").await
    }
}
