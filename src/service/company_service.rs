use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::dto::admin_dto::NewCompanyRequest;
use crate::model::activity::{ActivityEntry, ActivityKind};
use crate::model::company::Company;
use crate::model::now_timestamp;
use crate::repository::{AccountRepository, ActivityRepository, CompanyRepository};
use crate::util::error::ServiceError;

/// Admin-side management of moving companies.
pub struct CompanyServiceImpl {
    pub company_repo: Arc<dyn CompanyRepository>,
    pub account_repo: Arc<dyn AccountRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
}

impl CompanyServiceImpl {
    pub fn new(
        company_repo: Arc<dyn CompanyRepository>,
        account_repo: Arc<dyn AccountRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self { company_repo, account_repo, activity_repo }
    }

    /// The owner's next sign-in resolves to company.
    #[instrument(skip(self, request), fields(account_id = %request.account_id, name = %request.name))]
    pub async fn register(&self, request: NewCompanyRequest, registered_by: &str) -> Result<Company, ServiceError> {
        let id = ObjectId::parse_str(&request.account_id)
            .map_err(|_| ServiceError::InvalidInput(format!("Invalid account id: {}", request.account_id)))?;
        if self.account_repo.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("No account with id {}", request.account_id)));
        }

        let company = Company {
            id,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            phone: request.phone,
            verified: request.verified,
            created_at: now_timestamp(),
        };
        let company = self.company_repo.create(company).await?;
        info!("Company registered");

        let entry = ActivityEntry::new(ActivityKind::CompanyRegistered, format!("Company {} registered", company.name))
            .with_actor(registered_by.to_string())
            .with_target(company.id.to_hex());
        if let Err(e) = self.activity_repo.record(entry).await {
            warn!("Failed to record company activity: {}", e);
        }
        Ok(company)
    }

    pub async fn list(&self) -> Result<Vec<Company>, ServiceError> {
        Ok(self.company_repo.list().await?)
    }
}
