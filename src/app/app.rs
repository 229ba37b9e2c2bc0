use axum::{http::Method, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{AdminConfig, JwtConfig, Settings};
use crate::form::DraftStore;
use crate::handler::admin_handler::AdminState;
use crate::handler::form_handler::FormState;
use crate::middlewares::role_guard::RoleGuard;
use crate::model::role::Role;
use crate::repository::{
    AccountRepository, ActivityRepository, CompanyRepository, MongoAccountRepository, MongoActivityRepository,
    MongoCompanyRepository, MongoPaymentRepository, MongoProfileRepository, MongoQuoteRequestRepository,
    PaymentRepository, ProfileRepository, QuoteRequestRepository,
};
use crate::router::admin_router::admin_router;
use crate::router::auth_router::auth_router;
use crate::router::dashboard_router::{company_router, customer_router};
use crate::router::form_router::form_router;
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::company_service::CompanyServiceImpl;
use crate::service::dashboard_service::DashboardServiceImpl;
use crate::service::payment_service::PaymentServiceImpl;
use crate::service::quote_request_service::QuoteRequestServiceImpl;
use crate::service::role_service::RoleResolver;
use crate::util::email::{QuoteNotifier, SmtpEmailService};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::minio::{MediaStore, MinioMediaStore};

/// Everything the HTTP layer needs, behind the storage traits so the same
/// wiring serves MongoDB/MinIO in production and in-memory doubles in tests.
#[derive(Clone)]
pub struct AppDependencies {
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    pub accounts: Arc<dyn AccountRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub companies: Arc<dyn CompanyRepository>,
    pub requests: Arc<dyn QuoteRequestRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub activity: Arc<dyn ActivityRepository>,
    pub media: Arc<dyn MediaStore>,
    pub notifier: Option<Arc<dyn QuoteNotifier>>,
    pub drafts: Arc<DraftStore>,
}

/// How often expired form drafts are swept.
const DRAFT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Services built from one set of dependencies.
pub struct AppServices {
    pub auth: Arc<AuthServiceImpl>,
    pub router: Router,
}

pub fn build_services(deps: AppDependencies) -> AppServices {
    let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(deps.jwt.clone()));
    let resolver = Arc::new(RoleResolver::new(
        &deps.admin.emails,
        deps.profiles.clone(),
        deps.companies.clone(),
        deps.activity.clone(),
    ));

    let auth = Arc::new(AuthServiceImpl::new(
        deps.accounts.clone(),
        deps.activity.clone(),
        resolver,
        jwt_utils.clone(),
    ));
    let quotes = Arc::new(QuoteRequestServiceImpl::new(
        deps.requests.clone(),
        deps.activity.clone(),
        deps.media.clone(),
        deps.notifier.clone(),
    ));
    let dashboards = Arc::new(DashboardServiceImpl {
        request_repo: deps.requests.clone(),
        company_repo: deps.companies.clone(),
        profile_repo: deps.profiles.clone(),
        payment_repo: deps.payments.clone(),
        activity_repo: deps.activity.clone(),
    });
    let admin_state = Arc::new(AdminState {
        payments: Arc::new(PaymentServiceImpl::new(deps.payments.clone())),
        companies: Arc::new(CompanyServiceImpl::new(
            deps.companies.clone(),
            deps.accounts.clone(),
            deps.activity.clone(),
        )),
        quotes: quotes.clone(),
        dashboards: dashboards.clone(),
    });
    let form_state = Arc::new(FormState { drafts: deps.drafts.clone(), quote_service: quotes });

    let router = Router::new()
        .merge(auth_router(auth.clone()))
        .merge(form_router(form_state))
        .merge(admin_router(admin_state, RoleGuard::new(jwt_utils.clone(), Role::Admin)))
        .merge(company_router(dashboards.clone(), RoleGuard::new(jwt_utils.clone(), Role::Company)))
        .merge(customer_router(dashboards, RoleGuard::new(jwt_utils, Role::Customer)))
        .route("/health", get(|| async { "OK" }));

    AppServices { auth, router }
}

/// The router alone, as mounted by [`App`].
pub fn build_router(deps: AppDependencies) -> Router {
    build_services(deps).router
}

pub struct App {
    addr: SocketAddr,
    router: Router,
}

impl App {
    /// Connect every backend, create the bootstrap admin when configured and build the router.
    pub async fn new(settings: Settings) -> Result<Self, Box<dyn std::error::Error>> {
        let addr = SocketAddr::new(settings.app.host.parse()?, settings.app.port);

        let db = settings.mongo.connect().await?;
        info!("Connected to MongoDB database '{}'", settings.mongo.database);
        let accounts = MongoAccountRepository::new(&db);
        accounts.ensure_indexes().await?;

        let media = Arc::new(MinioMediaStore::new(settings.minio.clone()).await?);
        let notifier: Option<Arc<dyn QuoteNotifier>> = match SmtpEmailService::new(settings.email.clone()) {
            Ok(service) => Some(Arc::new(service)),
            Err(e) => {
                warn!("Confirmation emails disabled: {}", e);
                None
            }
        };

        let drafts = Arc::new(DraftStore::with_limits(
            Duration::from_secs(settings.app.draft_ttl_minutes * 60),
            settings.app.max_drafts,
        ));

        let deps = AppDependencies {
            jwt: settings.jwt.clone(),
            admin: settings.admin.clone(),
            accounts: Arc::new(accounts),
            profiles: Arc::new(MongoProfileRepository::new(&db)),
            companies: Arc::new(MongoCompanyRepository::new(&db)),
            requests: Arc::new(MongoQuoteRequestRepository::new(&db, &settings.mongo.request_collection)),
            payments: Arc::new(MongoPaymentRepository::new(&db)),
            activity: Arc::new(MongoActivityRepository::new(&db)),
            media,
            notifier,
            drafts: drafts.clone(),
        };

        let services = build_services(deps);
        bootstrap_admins(&services.auth, &settings.admin).await;
        drafts.spawn_reaper(DRAFT_SWEEP_INTERVAL);

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
        let router = services.router.layer(TraceLayer::new_for_http()).layer(cors);

        Ok(App { addr, router })
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        info!("Server running at http://{}", self.addr);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.router).await
    }
}

/// Create the account of every allow-listed admin that does not have one yet.
///
/// This is the only way admin accounts come into existence; public
/// registration refuses allow-listed addresses.
pub async fn bootstrap_admins(auth: &AuthServiceImpl, admin: &AdminConfig) {
    let Some(password) = admin.bootstrap_password.as_deref() else {
        info!("No bootstrap admin password configured");
        return;
    };
    for email in admin.bootstrap_emails() {
        if let Err(e) = auth.bootstrap_admin(email, password, &admin.bootstrap_display_name).await {
            error!(email = %email, "Failed to create bootstrap admin: {}", e);
        }
    }
}
