use bson::oid::ObjectId;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::model::activity::{ActivityEntry, ActivityKind};
use crate::model::role::{resolve_role, Role};
use crate::model::user::UserProfile;
use crate::repository::{ActivityRepository, CompanyRepository, ProfileRepository, RepositoryResult};

pub const FALLBACK_NOTICE: &str = "We could not load your account details. You have been signed in as a customer.";

/// Where a freshly authenticated user goes, and as whom.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoleResolution {
    pub role: Role,
    pub redirect: String,
    /// Set when a backend error forced the customer default
    pub fallback: bool,
    pub notice: Option<String>,
}

impl RoleResolution {
    fn resolved(role: Role) -> Self {
        RoleResolution { role, redirect: role.dashboard_route().to_string(), fallback: false, notice: None }
    }

    fn fallback() -> Self {
        RoleResolution {
            role: Role::Customer,
            redirect: Role::Customer.dashboard_route().to_string(),
            fallback: true,
            notice: Some(FALLBACK_NOTICE.to_string()),
        }
    }
}

/// Decides the role of an identity on every authentication event and
/// keeps the stored profile in line with that decision.
pub struct RoleResolver {
    admin_emails: HashSet<String>,
    profile_repo: Arc<dyn ProfileRepository>,
    company_repo: Arc<dyn CompanyRepository>,
    activity_repo: Arc<dyn ActivityRepository>,
}

impl RoleResolver {
    pub fn new(
        admin_emails: &[String],
        profile_repo: Arc<dyn ProfileRepository>,
        company_repo: Arc<dyn CompanyRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
    ) -> Self {
        RoleResolver {
            admin_emails: admin_emails.iter().map(|e| e.trim().to_lowercase()).collect(),
            profile_repo,
            company_repo,
            activity_repo,
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(&email.trim().to_lowercase())
    }

    /// Never fails. Backend errors route to the customer dashboard with a notice.
    #[instrument(skip(self, display_name), fields(account_id = %account_id))]
    pub async fn resolve(&self, account_id: ObjectId, email: &str, display_name: Option<&str>) -> RoleResolution {
        match self.try_resolve(account_id, email, display_name).await {
            Ok(role) => {
                info!(role = %role, "Role resolved");
                RoleResolution::resolved(role)
            }
            Err(e) => {
                if e.is_permission_denied() {
                    warn!("Profile or company lookup was refused by the database, check the service credentials");
                }
                error!("Role resolution failed, falling back to customer: {}", e);
                RoleResolution::fallback()
            }
        }
    }

    async fn try_resolve(&self, id: ObjectId, email: &str, display_name: Option<&str>) -> RepositoryResult<Role> {
        if self.is_admin_email(email) {
            match self.profile_repo.find_by_id(id).await? {
                None => {
                    let profile = UserProfile::new(id, &email.to_lowercase(), display_name.map(str::to_string), Role::Admin);
                    self.profile_repo.create(profile).await?;
                }
                Some(profile) if profile.role.as_deref() != Some(Role::Admin.as_str()) => {
                    self.profile_repo.set_role(id, Role::Admin).await?;
                }
                Some(_) => {}
            }
            return Ok(resolve_role(true, false, Some(Role::Admin.as_str())));
        }

        let stored = match self.profile_repo.find_by_id(id).await? {
            Some(profile) => profile.role,
            None => {
                let profile =
                    UserProfile::new(id, &email.to_lowercase(), display_name.map(str::to_string), Role::Customer);
                let stored = profile.role.clone();
                self.profile_repo.create(profile).await?;
                self.record(ActivityEntry::new(ActivityKind::ProfileCreated, "Customer profile created")
                    .with_actor(email.to_lowercase())
                    .with_target(id.to_hex()))
                    .await;
                stored
            }
        };

        let has_company = self.company_repo.find_by_id(id).await?.is_some();
        let role = resolve_role(false, has_company, stored.as_deref());

        if has_company && stored.as_deref() != Some(Role::Company.as_str()) {
            // Two writes, not atomic
            self.profile_repo.set_role(id, Role::Company).await?;
            self.record(
                ActivityEntry::new(
                    ActivityKind::RoleCorrected,
                    format!("Role corrected from {} to company", stored.as_deref().unwrap_or("none")),
                )
                .with_actor(email.to_lowercase())
                .with_target(id.to_hex()),
            )
            .await;
        }
        Ok(role)
    }

    /// Activity is best effort; a failed audit line never changes the routing.
    async fn record(&self, entry: ActivityEntry) {
        if let Err(e) = self.activity_repo.record(entry).await {
            warn!("Failed to record activity: {}", e);
        }
    }
}
