use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::model::role::Role;
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

/// State for one guarded router: who may pass and how tokens are checked.
pub struct RoleGuard {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub required: Role,
}

impl RoleGuard {
    pub fn new(jwt_utils: Arc<JwtTokenUtilsImpl>, required: Role) -> Arc<Self> {
        Arc::new(RoleGuard { jwt_utils, required })
    }
}

/// Lets the request through when its access token carries the required role.
/// The validated claims are put in the request extensions.
pub async fn require_role(
    State(guard): State<Arc<RoleGuard>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("Missing authorization header"))?;

    let token = guard
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|e| HandlerError::unauthorized(e.to_string()))?;
    let claims = guard
        .jwt_utils
        .validate_access_token(&token)
        .map_err(|e| HandlerError::unauthorized(e.to_string()))?;

    if claims.role != guard.required {
        warn!(account_id = %claims.sub, role = %claims.role, required = %guard.required, "Role mismatch");
        return Err(HandlerError::new(
            HandlerErrorKind::Forbidden,
            format!("This area requires the {} role", guard.required),
        )
        .with_redirect(claims.role.dashboard_route()));
    }

    debug!(account_id = %claims.sub, "Access granted");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
