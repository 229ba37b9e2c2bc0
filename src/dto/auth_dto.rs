use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::role::Role;
use crate::model::user::AccountView;
use crate::util::jwt::TokenPair;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 64))]
    pub display_name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 10))]
    pub refresh_token: String,
}

/// Answer to every sign-in and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub account: AccountView,
    pub role: Role,
    /// Dashboard the client should navigate to
    pub redirect: String,
    pub tokens: TokenPair,
    /// Shown to the user when the role could not be resolved
    pub notice: Option<String>,
}
