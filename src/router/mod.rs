pub mod admin_router;
pub mod auth_router;
pub mod dashboard_router;
pub mod form_router;
