use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Account, Role};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub account: Account,
}

/// Token payload: the account's non-secret fields plus expiry. The password
/// hash never reaches a claim.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}
