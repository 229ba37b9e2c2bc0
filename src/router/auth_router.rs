use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handler::auth_handler::{
    admin_sign_in_handler, company_sign_in_handler, customer_sign_in_handler, refresh_token_handler,
    register_handler,
};
use crate::service::auth_service::AuthServiceImpl;

/// Public sign-in surface, one sign-in route per portal.
pub fn auth_router(service: Arc<AuthServiceImpl>) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/refresh", post(refresh_token_handler))
        .route("/admin/auth", post(admin_sign_in_handler))
        .route("/company/auth", post(company_sign_in_handler))
        .route("/customer/auth", post(customer_sign_in_handler))
        .with_state(service)
}
