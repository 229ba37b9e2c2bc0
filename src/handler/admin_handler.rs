use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::admin_dto::{NewCompanyRequest, PaymentsQuery, StatusFilter};
use crate::service::company_service::CompanyServiceImpl;
use crate::service::dashboard_service::DashboardServiceImpl;
use crate::service::payment_service::PaymentServiceImpl;
use crate::service::quote_request_service::{QuoteRequestService, QuoteRequestServiceImpl};
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::jwt::Claims;

const REQUEST_LIST_LIMIT: i64 = 200;

pub struct AdminState {
    pub payments: Arc<PaymentServiceImpl>,
    pub companies: Arc<CompanyServiceImpl>,
    pub quotes: Arc<QuoteRequestServiceImpl>,
    pub dashboards: Arc<DashboardServiceImpl>,
}

pub async fn admin_dashboard_handler(State(state): State<Arc<AdminState>>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(state.dashboards.admin().await?))
}

pub async fn list_payments_handler(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<PaymentsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let filter = StatusFilter::parse(query.status.as_deref());
    Ok(Json(state.payments.list(filter).await?))
}

pub async fn export_payments_handler(State(state): State<Arc<AdminState>>) -> Result<impl IntoResponse, HandlerError> {
    let csv = state.payments.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"payments.csv\""),
        ],
        csv,
    ))
}

pub async fn register_company_handler(
    State(state): State<Arc<AdminState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewCompanyRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::new(HandlerErrorKind::Validation, format!("Validation error: {}", e)));
    }
    let company = state.companies.register(payload, &claims.email).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn list_companies_handler(State(state): State<Arc<AdminState>>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(state.companies.list().await?))
}

pub async fn list_requests_handler(State(state): State<Arc<AdminState>>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(state.quotes.list_requests(REQUEST_LIST_LIMIT).await?))
}

pub async fn get_request_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(state.quotes.get_request(&id).await?))
}
