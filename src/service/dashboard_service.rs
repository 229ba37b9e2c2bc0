use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;

use crate::dto::admin_dto::{AdminDashboard, AdminStats, CompanyDashboard, CustomerDashboard};
use crate::repository::{
    ActivityRepository, CompanyRepository, PaymentRepository, ProfileRepository, QuoteRequestRepository,
};
use crate::util::error::ServiceError;

pub const RECENT_LIMIT: i64 = 20;

/// Read-only summaries behind the three dashboards.
pub struct DashboardServiceImpl {
    pub request_repo: Arc<dyn QuoteRequestRepository>,
    pub company_repo: Arc<dyn CompanyRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
}

impl DashboardServiceImpl {
    #[instrument(skip(self))]
    pub async fn admin(&self) -> Result<AdminDashboard, ServiceError> {
        let stats = AdminStats {
            requests: self.request_repo.count().await?,
            companies: self.company_repo.count().await?,
            profiles: self.profile_repo.count().await?,
            payments: self.payment_repo.count().await?,
        };
        let recent_activity = self.activity_repo.list_recent(RECENT_LIMIT).await?;
        Ok(AdminDashboard { stats, recent_activity })
    }

    #[instrument(skip(self))]
    pub async fn company(&self, account_id: &str) -> Result<CompanyDashboard, ServiceError> {
        let id = parse_subject(account_id)?;
        let company = self
            .company_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No company registered for this account".to_string()))?;
        let recent_requests = self.request_repo.list_recent(RECENT_LIMIT).await?;
        Ok(CompanyDashboard { company, recent_requests })
    }

    #[instrument(skip(self))]
    pub async fn customer(&self, account_id: &str, email: &str) -> Result<CustomerDashboard, ServiceError> {
        let id = parse_subject(account_id)?;
        let profile = self.profile_repo.find_by_id(id).await?;
        let requests = self.request_repo.list_by_contact_email(email).await?;
        Ok(CustomerDashboard { profile, requests })
    }
}

fn parse_subject(account_id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(account_id).map_err(|_| ServiceError::Unauthorized("Malformed token subject".to_string()))
}
