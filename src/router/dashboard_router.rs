use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::dashboard_handler::{company_dashboard_handler, customer_dashboard_handler};
use crate::middlewares::role_guard::{require_role, RoleGuard};
use crate::service::dashboard_service::DashboardServiceImpl;

pub fn company_router(service: Arc<DashboardServiceImpl>, guard: Arc<RoleGuard>) -> Router {
    Router::new()
        .route("/company/dashboard", get(company_dashboard_handler))
        .route_layer(middleware::from_fn_with_state(guard, require_role))
        .with_state(service)
}

pub fn customer_router(service: Arc<DashboardServiceImpl>, guard: Arc<RoleGuard>) -> Router {
    Router::new()
        .route("/customer/dashboard", get(customer_dashboard_handler))
        .route_layer(middleware::from_fn_with_state(guard, require_role))
        .with_state(service)
}
