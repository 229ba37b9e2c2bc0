use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{options::FindOptions, Database};
use tracing::{error, info};

use crate::model::quote_request::QuoteRequest;
use crate::repository::collect_cursor;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait QuoteRequestRepository: Send + Sync {
    /// Insert a fully built request. The id is chosen by the caller.
    async fn create(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteRequest>;
    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<QuoteRequest>>;
    async fn list_by_contact_email(&self, email: &str) -> RepositoryResult<Vec<QuoteRequest>>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoQuoteRequestRepository {
    collection: mongodb::Collection<QuoteRequest>,
}

impl MongoQuoteRequestRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        MongoQuoteRequestRepository { collection: db.collection::<QuoteRequest>(collection_name) }
    }

    async fn find_sorted(&self, filter: Option<bson::Document>, limit: Option<i64>) -> RepositoryResult<Vec<QuoteRequest>> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).limit(limit).build();
        let cursor = self.collection.find(filter, options).await.map_err(|e| {
            error!("Failed to list quote requests: {}", e);
            RepositoryError::database(format!("Failed to list quote requests: {}", e))
        })?;
        collect_cursor(cursor, "quote request").await
    }
}

#[async_trait]
impl QuoteRequestRepository for MongoQuoteRequestRepository {
    #[tracing::instrument(skip(self, request), fields(id = %request.id))]
    async fn create(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest> {
        info!(media = request.media.len(), "Storing quote request");
        match self.collection.insert_one(request.clone(), None).await {
            Ok(_) => {
                info!("Quote request stored");
                Ok(request)
            }
            Err(e) => {
                error!("Failed to store quote request: {}", e);
                Err(RepositoryError::database(format!("Failed to store quote request: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteRequest> {
        let filter = doc! { "_id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(request)) => Ok(request),
            Ok(None) => {
                error!("Quote request not found for ID: {}", id);
                Err(RepositoryError::not_found(format!("Quote request not found for ID: {}", id)))
            }
            Err(e) => {
                error!("Failed to fetch quote request: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch quote request: {}", e)))
            }
        }
    }

    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<QuoteRequest>> {
        self.find_sorted(None, Some(limit)).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_contact_email(&self, email: &str) -> RepositoryResult<Vec<QuoteRequest>> {
        let filter = doc! { "contact.email": email.to_lowercase() };
        self.find_sorted(Some(filter), None).await
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.collection.count_documents(None, None).await.map_err(RepositoryError::from)
    }
}
