use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{options::FindOptions, Database};
use tracing::{error, info};

use crate::model::company::Company;
use crate::repository::collect_cursor;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create(&self, company: Company) -> RepositoryResult<Company>;
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Company>>;
    async fn list(&self) -> RepositoryResult<Vec<Company>>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoCompanyRepository {
    collection: mongodb::Collection<Company>,
}

impl MongoCompanyRepository {
    pub fn new(db: &Database) -> Self {
        MongoCompanyRepository { collection: db.collection::<Company>("companies") }
    }
}

#[async_trait]
impl CompanyRepository for MongoCompanyRepository {
    #[tracing::instrument(skip(self, company), fields(id = %company.id, name = %company.name))]
    async fn create(&self, company: Company) -> RepositoryResult<Company> {
        info!("Registering company");
        if self.find_by_id(company.id).await?.is_some() {
            return Err(RepositoryError::already_exists(format!("Company already registered for {}", company.id)));
        }
        match self.collection.insert_one(company.clone(), None).await {
            Ok(_) => {
                info!("Company registered");
                Ok(company)
            }
            Err(e) => {
                error!("Failed to register company: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Company>> {
        let filter = doc! { "_id": id };
        self.collection.find_one(filter, None).await.map_err(RepositoryError::from)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<Company>> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self.collection.find(None, options).await.map_err(|e| {
            error!("Failed to list companies: {}", e);
            RepositoryError::database(format!("Failed to list companies: {}", e))
        })?;
        collect_cursor(cursor, "company").await
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.collection.count_documents(None, None).await.map_err(RepositoryError::from)
    }
}
