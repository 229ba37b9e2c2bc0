use axum::{
    extract::{Extension, Json, State},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::service::dashboard_service::DashboardServiceImpl;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn company_dashboard_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.company(&claims.sub).await?))
}

pub async fn customer_dashboard_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.customer(&claims.sub, &claims.email).await?))
}
