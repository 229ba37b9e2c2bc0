use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{options::IndexOptions, Database, IndexModel};
use tracing::{error, info};

use crate::model::user::Account;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, account: Account) -> RepositoryResult<Account>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>>;
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Account>>;
}

pub struct MongoAccountRepository {
    collection: mongodb::Collection<Account>,
}

impl MongoAccountRepository {
    pub fn new(db: &Database) -> Self {
        MongoAccountRepository { collection: db.collection::<Account>("accounts") }
    }

    /// Create the unique index on `email`. Two racing registrations for the
    /// same address then fail on the second insert with a duplicate key.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        self.collection.create_index(email_index(), None).await.map_err(|e| {
            error!("Failed to create accounts email index: {}", e);
            RepositoryError::from(e)
        })?;
        info!("Accounts email index ready");
        Ok(())
    }
}

fn email_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).name("accounts_email_unique".to_string()).build())
        .build()
}

#[async_trait]
impl AccountRepository for MongoAccountRepository {
    #[tracing::instrument(skip(self, account), fields(email = %account.email))]
    async fn create(&self, account: Account) -> RepositoryResult<Account> {
        info!("Creating account");
        if self.find_by_email(&account.email).await?.is_some() {
            error!("Account already exists for email");
            return Err(RepositoryError::already_exists(format!("Account already exists for {}", account.email)));
        }

        match self.collection.insert_one(account.clone(), None).await {
            Ok(_) => {
                info!(account_id = %account.id, "Account created");
                Ok(account)
            }
            Err(e) => {
                error!("Failed to create account: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>> {
        let filter = doc! { "email": email.to_lowercase() };
        self.collection.find_one(filter, None).await.map_err(|e| {
            error!("Failed to fetch account by email: {}", e);
            RepositoryError::database(format!("Failed to fetch account by email: {}", e))
        })
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Account>> {
        let filter = doc! { "_id": id };
        self.collection.find_one(filter, None).await.map_err(|e| {
            error!("Failed to fetch account by ID: {}", e);
            RepositoryError::database(format!("Failed to fetch account by ID: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_index_is_unique() {
        let index = email_index();
        assert_eq!(index.keys, doc! { "email": 1 });
        assert_eq!(index.options.and_then(|o| o.unique), Some(true));
    }
}
