use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{options::UpdateOptions, Database};
use tracing::{error, info, warn};

use crate::model::{now_timestamp, role::Role, user::UserProfile};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Per-account profile documents in the `users` collection.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<UserProfile>>;
    /// Write the whole profile, replacing any document with the same id.
    async fn create(&self, profile: UserProfile) -> RepositoryResult<()>;
    /// Set only the role field, leaving every other field untouched.
    async fn set_role(&self, id: ObjectId, role: Role) -> RepositoryResult<()>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoProfileRepository {
    collection: mongodb::Collection<UserProfile>,
}

impl MongoProfileRepository {
    pub fn new(db: &Database) -> Self {
        MongoProfileRepository { collection: db.collection::<UserProfile>("users") }
    }
}

#[async_trait]
impl ProfileRepository for MongoProfileRepository {
    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<UserProfile>> {
        let filter = doc! { "_id": id };
        self.collection.find_one(filter, None).await.map_err(RepositoryError::from)
    }

    #[tracing::instrument(skip(self, profile), fields(id = %profile.id))]
    async fn create(&self, profile: UserProfile) -> RepositoryResult<()> {
        info!(role = ?profile.role, "Writing user profile");
        let filter = doc! { "_id": profile.id };
        let options = mongodb::options::ReplaceOptions::builder().upsert(true).build();
        match self.collection.replace_one(filter, profile, options).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to write user profile: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id, role = %role))]
    async fn set_role(&self, id: ObjectId, role: Role) -> RepositoryResult<()> {
        info!("Correcting stored role");
        let filter = doc! { "_id": id };
        let update = doc! {
            "$set": { "role": role.as_str() },
            "$setOnInsert": { "created_at": now_timestamp() },
        };
        let options = UpdateOptions::builder().upsert(true).build();
        match self.collection.update_one(filter, update, options).await {
            Ok(result) => {
                if result.matched_count == 0 && result.upserted_id.is_none() {
                    warn!("Role update matched nothing");
                }
                Ok(())
            }
            Err(e) => {
                error!("Failed to update role: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.collection.count_documents(None, None).await.map_err(RepositoryError::from)
    }
}
