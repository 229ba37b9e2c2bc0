use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{RefreshTokenRequest, RegisterRequest, SignInRequest};
use crate::model::role::Role;
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::util::error::{HandlerError, HandlerErrorKind};

fn validation_error(e: validator::ValidationErrors) -> HandlerError {
    HandlerError::new(HandlerErrorKind::Validation, format!("Validation error: {}", e))
}

pub async fn register_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(validation_error)?;
    let account = service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn sign_in(service: &AuthServiceImpl, portal: Role, payload: SignInRequest) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(validation_error)?;
    let res = service.sign_in(portal, &payload.email, &payload.password).await?;
    info!(role = %res.role, redirect = %res.redirect, "Signed in");
    Ok(Json(res))
}

pub async fn admin_sign_in_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    Json(payload): Json<SignInRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    sign_in(&service, Role::Admin, payload).await
}

pub async fn company_sign_in_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    Json(payload): Json<SignInRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    sign_in(&service, Role::Company, payload).await
}

pub async fn customer_sign_in_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    Json(payload): Json<SignInRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    sign_in(&service, Role::Customer, payload).await
}

pub async fn refresh_token_handler(
    State(service): State<Arc<AuthServiceImpl>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(validation_error)?;
    let res = service.refresh(&payload.refresh_token).await?;
    Ok(Json(res))
}
