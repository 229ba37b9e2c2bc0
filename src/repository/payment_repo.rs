use async_trait::async_trait;
use bson::doc;
use mongodb::{options::FindOptions, Database};
use tracing::{error, info};

use crate::model::payment::Payment;
use crate::repository::collect_cursor;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Read-only access to the `payments` collection.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Every payment, newest first.
    async fn list_all(&self) -> RepositoryResult<Vec<Payment>>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoPaymentRepository {
    collection: mongodb::Collection<Payment>,
}

impl MongoPaymentRepository {
    pub fn new(db: &Database) -> Self {
        MongoPaymentRepository { collection: db.collection::<Payment>("payments") }
    }
}

#[async_trait]
impl PaymentRepository for MongoPaymentRepository {
    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<Payment>> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self.collection.find(None, options).await.map_err(|e| {
            error!("Failed to list payments: {}", e);
            RepositoryError::database(format!("Failed to list payments: {}", e))
        })?;
        let payments = collect_cursor(cursor, "payment").await?;
        info!("Fetched {} payments", payments.len());
        Ok(payments)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.collection.count_documents(None, None).await.map_err(RepositoryError::from)
    }
}
