#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use bson::oid::ObjectId;
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use movequote_backend::app::app::{bootstrap_admins, build_services, AppDependencies};
use movequote_backend::form::DraftStore;
use movequote_backend::service::auth_service::AuthServiceImpl;
use movequote_backend::config::{AdminConfig, JwtConfig};
use movequote_backend::model::activity::ActivityEntry;
use movequote_backend::model::company::Company;
use movequote_backend::model::payment::Payment;
use movequote_backend::model::quote_request::QuoteRequest;
use movequote_backend::model::role::Role;
use movequote_backend::model::user::{Account, UserProfile};
use movequote_backend::repository::*;
use movequote_backend::util::email::{EmailError, QuoteNotifier};
use movequote_backend::util::minio::{build_download_link, MediaStore, MediaStoreError};

pub const ADMIN_EMAIL: &str = "ops@movequote.test";
pub const SECOND_ADMIN_EMAIL: &str = "boss@movequote.test";
pub const PASSWORD: &str = "removals2026";

fn outage() -> RepositoryError {
    RepositoryError::database("connection refused: permission denied")
}

#[derive(Default)]
pub struct MemAccounts {
    pub rows: Mutex<Vec<Account>>,
}

#[async_trait]
impl AccountRepository for MemAccounts {
    async fn create(&self, account: Account) -> RepositoryResult<Account> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|a| a.email == account.email) {
            return Err(RepositoryError::already_exists(account.email));
        }
        rows.push(account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>> {
        let email = email.to_lowercase();
        Ok(self.rows.lock().unwrap().iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Account>> {
        Ok(self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }
}

/// Profiles with a switch that makes every call fail like an unreachable database.
#[derive(Default)]
pub struct MemProfiles {
    pub rows: Mutex<HashMap<ObjectId, UserProfile>>,
    pub failing: AtomicBool,
}

impl MemProfiles {
    fn check(&self) -> RepositoryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(outage());
        }
        Ok(())
    }

    pub fn stored_role(&self, id: ObjectId) -> Option<String> {
        self.rows.lock().unwrap().get(&id).and_then(|p| p.role.clone())
    }
}

#[async_trait]
impl ProfileRepository for MemProfiles {
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<UserProfile>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, profile: UserProfile) -> RepositoryResult<()> {
        self.check()?;
        self.rows.lock().unwrap().insert(profile.id, profile);
        Ok(())
    }

    async fn set_role(&self, id: ObjectId, role: Role) -> RepositoryResult<()> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let entry = rows.entry(id).or_insert_with(|| UserProfile {
            id,
            email: String::new(),
            display_name: None,
            role: None,
            created_at: movequote_backend::model::now_timestamp(),
        });
        entry.role = Some(role.as_str().to_string());
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct MemCompanies {
    pub rows: Mutex<Vec<Company>>,
}

#[async_trait]
impl CompanyRepository for MemCompanies {
    async fn create(&self, company: Company) -> RepositoryResult<Company> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.id == company.id) {
            return Err(RepositoryError::already_exists(company.id.to_hex()));
        }
        rows.push(company.clone());
        Ok(company)
    }

    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Company>> {
        Ok(self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Company>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct MemRequests {
    pub rows: Mutex<Vec<QuoteRequest>>,
    pub failing: AtomicBool,
}

impl MemRequests {
    fn newest_first(&self) -> Vec<QuoteRequest> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl QuoteRequestRepository for MemRequests {
    async fn create(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest> {
        // A real insert suspends on I/O; let concurrent handlers interleave here
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.rows.lock().unwrap().push(request.clone());
        Ok(request)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteRequest> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(id.to_hex()))
    }

    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<QuoteRequest>> {
        Ok(self.newest_first().into_iter().take(limit as usize).collect())
    }

    async fn list_by_contact_email(&self, email: &str) -> RepositoryResult<Vec<QuoteRequest>> {
        let email = email.to_lowercase();
        Ok(self.newest_first().into_iter().filter(|r| r.contact.email == email).collect())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct MemPayments {
    pub rows: Mutex<Vec<Payment>>,
}

#[async_trait]
impl PaymentRepository for MemPayments {
    async fn list_all(&self) -> RepositoryResult<Vec<Payment>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct MemActivity {
    pub rows: Mutex<Vec<ActivityEntry>>,
}

#[async_trait]
impl ActivityRepository for MemActivity {
    async fn record(&self, entry: ActivityEntry) -> RepositoryResult<()> {
        self.rows.lock().unwrap().push(entry);
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActivityEntry>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().take(limit as usize).cloned().collect())
    }
}

#[derive(Default)]
pub struct FakeMediaStore {
    pub objects: Mutex<HashMap<String, (String, usize)>>,
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn put_object(&self, object_name: &str, data: Bytes, content_type: &str) -> Result<(), MediaStoreError> {
        self.objects.lock().unwrap().insert(object_name.to_string(), (content_type.to_string(), data.len()));
        Ok(())
    }

    async fn remove_object(&self, object_name: &str) -> Result<(), MediaStoreError> {
        self.objects.lock().unwrap().remove(object_name);
        Ok(())
    }

    fn download_link(&self, object_name: &str) -> String {
        build_download_link("http://media.test", "request-media", object_name)
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<String>>,
    pub failing: AtomicBool,
}

#[async_trait]
impl QuoteNotifier for FakeNotifier {
    async fn send_quote_confirmation(&self, request: &QuoteRequest) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::SmtpError("mail server unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(request.contact.email.clone());
        Ok(())
    }
}

/// The full router over in-memory storage, with handles to inspect it.
pub struct TestApp {
    pub router: Router,
    pub auth: Arc<AuthServiceImpl>,
    pub admin: AdminConfig,
    pub drafts: Arc<DraftStore>,
    pub accounts: Arc<MemAccounts>,
    pub profiles: Arc<MemProfiles>,
    pub companies: Arc<MemCompanies>,
    pub requests: Arc<MemRequests>,
    pub payments: Arc<MemPayments>,
    pub activity: Arc<MemActivity>,
    pub media: Arc<FakeMediaStore>,
    pub notifier: Arc<FakeNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_payments(Vec::new())
    }

    pub fn with_payments(payments: Vec<Payment>) -> Self {
        Self::build(payments, Arc::new(DraftStore::new()))
    }

    /// Drafts expire after `ttl` without being touched.
    pub fn with_draft_ttl(ttl: Duration) -> Self {
        Self::build(Vec::new(), Arc::new(DraftStore::with_limits(ttl, 100)))
    }

    fn build(payments: Vec<Payment>, drafts: Arc<DraftStore>) -> Self {
        let accounts = Arc::new(MemAccounts::default());
        let profiles = Arc::new(MemProfiles::default());
        let companies = Arc::new(MemCompanies::default());
        let requests = Arc::new(MemRequests::default());
        let payments = Arc::new(MemPayments { rows: Mutex::new(payments) });
        let activity = Arc::new(MemActivity::default());
        let media = Arc::new(FakeMediaStore::default());
        let notifier = Arc::new(FakeNotifier::default());

        let admin = AdminConfig {
            emails: vec![ADMIN_EMAIL.to_string(), SECOND_ADMIN_EMAIL.to_string()],
            bootstrap_password: Some(PASSWORD.to_string()),
            bootstrap_display_name: "Administrator".to_string(),
        };

        let deps = AppDependencies {
            jwt: JwtConfig::default(),
            admin: admin.clone(),
            accounts: accounts.clone(),
            profiles: profiles.clone(),
            companies: companies.clone(),
            requests: requests.clone(),
            payments: payments.clone(),
            activity: activity.clone(),
            media: media.clone(),
            notifier: Some(notifier.clone()),
            drafts: drafts.clone(),
        };
        let services = build_services(deps);

        TestApp {
            router: services.router,
            auth: services.auth,
            admin,
            drafts,
            accounts,
            profiles,
            companies,
            requests,
            payments,
            activity,
            media,
            notifier,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn register(&self, email: &str) -> Value {
        let body = serde_json::json!({ "email": email, "display_name": "Test User", "password": PASSWORD });
        let resp = self.send(json_request("POST", "/auth/register", &body, None)).await;
        assert_eq!(resp.status(), 201, "register {}", email);
        body_json(resp).await
    }

    /// Sign in through a portal and return the whole auth answer.
    pub async fn sign_in(&self, portal: &str, email: &str) -> Value {
        let body = serde_json::json!({ "email": email, "password": PASSWORD });
        let resp = self.send(json_request("POST", &format!("/{}/auth", portal), &body, None)).await;
        assert_eq!(resp.status(), 200, "sign in {}", email);
        body_json(resp).await
    }

    /// Create the allow-listed admin accounts the way startup does, then sign in as one.
    pub async fn admin_token(&self) -> String {
        bootstrap_admins(&self.auth, &self.admin).await;
        let auth = self.sign_in("admin", ADMIN_EMAIL).await;
        auth["tokens"]["access_token"].as_str().unwrap().to_string()
    }

    pub async fn access_token(&self, portal: &str, email: &str) -> String {
        self.register(email).await;
        let auth = self.sign_in(portal, email).await;
        auth["tokens"]["access_token"].as_str().unwrap().to_string()
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(resp: Response<Body>) -> Bytes {
    to_bytes(resp.into_body(), usize::MAX).await.unwrap()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}
