use std::convert::Infallible;

use axum::http::{header, request::Parts};
use axum::extract::FromRequestParts;
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, models::Role};

pub const SESSION_COOKIE: &str = "session";

/// Verified identity restored from the session token, valid for one request.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub account_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

pub fn ensure_role(user: &SessionUser, required: Role) -> Result<(), AppError> {
    if !user.role.satisfies(required) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &SessionUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

pub fn ensure_staff(user: &SessionUser) -> Result<(), AppError> {
    ensure_role(user, Role::Employee)
}

/// Verify a session token and restore the identity it encodes. Any failure
/// (bad signature, expired, malformed claims, unset secret) yields `None`:
/// the request proceeds anonymously rather than erroring.
pub fn verify_session_token(token: &str) -> Option<SessionUser> {
    let secret = std::env::var("JWT_SECRET").ok()?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    let claims = decoded.claims;
    let account_id = claims.sub.parse::<i32>().ok()?;

    Some(SessionUser {
        account_id,
        first_name: claims.first_name,
        last_name: claims.last_name,
        email: claims.email,
        role: claims.role,
    })
}

/// Session cookie first, `Authorization: Bearer` as a fallback.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    let auth_str = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        token_from_parts(parts)
            .and_then(|token| verify_session_token(&token))
            .ok_or(AppError::Unauthorized)
    }
}

/// Identity when present, anonymous otherwise. Never rejects.
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let session = token_from_parts(parts).and_then(|token| verify_session_token(&token));
        Ok(OptionalSession(session))
    }
}
