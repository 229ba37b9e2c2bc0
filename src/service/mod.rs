pub mod auth_service;
pub mod company_service;
pub mod dashboard_service;
pub mod payment_service;
pub mod quote_request_service;
pub mod role_service;
