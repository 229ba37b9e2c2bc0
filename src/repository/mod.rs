pub mod account_repo;
pub mod activity_repo;
pub mod company_repo;
pub mod payment_repo;
pub mod profile_repo;
pub mod quote_request_repo;
pub mod repository_error;

pub use account_repo::{AccountRepository, MongoAccountRepository};
pub use activity_repo::{ActivityRepository, MongoActivityRepository};
pub use company_repo::{CompanyRepository, MongoCompanyRepository};
pub use payment_repo::{MongoPaymentRepository, PaymentRepository};
pub use profile_repo::{MongoProfileRepository, ProfileRepository};
pub use quote_request_repo::{MongoQuoteRequestRepository, QuoteRequestRepository};
pub use repository_error::{RepositoryError, RepositoryResult};

use futures::stream::StreamExt;
use serde::de::DeserializeOwned;
use tracing::error;

/// Drain a cursor into a vector, failing on the first document that does not deserialize.
pub(crate) async fn collect_cursor<T>(mut cursor: mongodb::Cursor<T>, what: &str) -> RepositoryResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = Vec::new();
    while let Some(item) = cursor.next().await {
        match item {
            Ok(i) => items.push(i),
            Err(e) => {
                error!("Failed to deserialize {}: {}", what, e);
                return Err(RepositoryError::serialization(format!("Failed to deserialize {}: {}", what, e)));
            }
        }
    }
    Ok(items)
}
