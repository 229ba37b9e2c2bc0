use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::admin_handler::{
    admin_dashboard_handler, export_payments_handler, get_request_handler, list_companies_handler,
    list_payments_handler, list_requests_handler, register_company_handler, AdminState,
};
use crate::middlewares::role_guard::{require_role, RoleGuard};

pub fn admin_router(state: Arc<AdminState>, guard: Arc<RoleGuard>) -> Router {
    Router::new()
        .route("/admin/dashboard", get(admin_dashboard_handler))
        .route("/admin/payments", get(list_payments_handler))
        .route("/admin/payments/export", get(export_payments_handler))
        .route("/admin/companies", get(list_companies_handler).post(register_company_handler))
        .route("/admin/requests", get(list_requests_handler))
        .route("/admin/requests/{id}", get(get_request_handler))
        .route_layer(middleware::from_fn_with_state(guard, require_role))
        .with_state(state)
}
