use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::dto::auth_dto::{AuthResponse, RegisterRequest};
use crate::model::activity::{ActivityEntry, ActivityKind};
use crate::model::now_timestamp;
use crate::model::role::Role;
use crate::model::user::{Account, AccountView};
use crate::repository::{AccountRepository, ActivityRepository};
use crate::service::role_service::RoleResolver;
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

const BAD_CREDENTIALS: &str = "Invalid email or password";

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<AccountView, ServiceError>;
    /// `portal` is the sign-in page used; the resolved role decides the redirect.
    async fn sign_in(&self, portal: Role, email: &str, password: &str) -> Result<AuthResponse, ServiceError>;
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ServiceError>;
    /// Create the configured admin account when it does not exist yet.
    async fn bootstrap_admin(&self, email: &str, password: &str, display_name: &str) -> Result<(), ServiceError>;
}

pub struct AuthServiceImpl {
    pub account_repo: Arc<dyn AccountRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
    pub resolver: Arc<RoleResolver>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl AuthServiceImpl {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
        resolver: Arc<RoleResolver>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
    ) -> Self {
        Self { account_repo, activity_repo, resolver, jwt_utils }
    }

    async fn create_account(&self, email: &str, password: &str, display_name: &str) -> Result<Account, ServiceError> {
        if let Err(errors) = PasswordUtilsImpl::validate_password_strength(password) {
            return Err(ServiceError::InvalidInput(errors.join("; ")));
        }
        let password_hash = PasswordUtilsImpl::hash_password(password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;

        let account = Account {
            id: ObjectId::new(),
            email: email.trim().to_lowercase(),
            display_name: display_name.trim().to_string(),
            password_hash,
            created_at: now_timestamp(),
        };
        let inserted = self.account_repo.create(account).await;
        match &inserted {
            Ok(a) => info!(account_id = %a.id, "Account created"),
            Err(e) => error!("Failed to create account: {}", e),
        }
        Ok(inserted?)
    }

    /// Resolve the role, then sign tokens carrying it.
    async fn authenticate(&self, account: &Account) -> Result<AuthResponse, ServiceError> {
        let resolution = self.resolver.resolve(account.id, &account.email, Some(&account.display_name)).await;
        let tokens = self
            .jwt_utils
            .generate_token_pair(&account.id.to_hex(), &account.email, resolution.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;

        Ok(AuthResponse {
            account: AccountView::from(account),
            role: resolution.role,
            redirect: resolution.redirect,
            tokens,
            notice: resolution.notice,
        })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<AccountView, ServiceError> {
        info!("Registering new account");
        if self.resolver.is_admin_email(&request.email) {
            warn!("Public registration refused for an admin address");
            return Err(ServiceError::Forbidden("This email address cannot be registered".to_string()));
        }
        let account = self.create_account(&request.email, &request.password, &request.display_name).await?;
        Ok(AccountView::from(&account))
    }

    #[instrument(skip(self, password), fields(portal = %portal))]
    async fn sign_in(&self, portal: Role, email: &str, password: &str) -> Result<AuthResponse, ServiceError> {
        info!("Sign-in attempt");
        let account = match self.account_repo.find_by_email(email).await? {
            Some(account) => account,
            None => {
                warn!("Sign-in for unknown email");
                return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
        };

        let valid = PasswordUtilsImpl::verify_password(password, &account.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            warn!(account_id = %account.id, "Invalid credentials");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let response = self.authenticate(&account).await?;
        if response.role != portal {
            info!(resolved = %response.role, "Signed in through another role's portal");
        }

        let entry = ActivityEntry::new(ActivityKind::SignIn, format!("Signed in as {}", response.role))
            .with_actor(account.email.clone())
            .with_target(account.id.to_hex());
        if let Err(e) = self.activity_repo.record(entry).await {
            warn!("Failed to record sign-in activity: {}", e);
        }
        Ok(response)
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ServiceError> {
        let claims = self
            .jwt_utils
            .validate_refresh_token(refresh_token)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        let id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Invalid refresh token subject".to_string()))?;

        let account = self
            .account_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Account no longer exists".to_string()))?;

        let response = self.authenticate(&account).await?;
        if response.role != claims.role {
            info!(previous = %claims.role, current = %response.role, "Role changed since last sign-in");
        }
        Ok(response)
    }

    #[instrument(skip(self, password, display_name))]
    async fn bootstrap_admin(&self, email: &str, password: &str, display_name: &str) -> Result<(), ServiceError> {
        if self.account_repo.find_by_email(email).await?.is_some() {
            info!("Admin account already present");
            return Ok(());
        }
        self.create_account(email, password, display_name).await?;
        info!("Admin account created");
        Ok(())
    }
}
