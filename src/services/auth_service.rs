use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    models::{Account, AccountRecord},
    response::{ApiResponse, Meta},
};

const SESSION_TTL_HOURS: i64 = 1;

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub(crate) fn account_from_record(record: AccountRecord) -> AppResult<Account> {
    let role = record
        .role
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(Account {
        id: record.id,
        first_name: record.first_name,
        last_name: record.last_name,
        email: record.email,
        role,
        created_at: record.created_at,
    })
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub async fn register(pool: &DbPool, payload: RegisterRequest) -> AppResult<ApiResponse<Account>> {
    let RegisterRequest {
        first_name,
        last_name,
        email,
        password,
    } = payload;

    // Which field collided is not reported back, only a generic failure.
    let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM accounts WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest(
            "Sorry, the registration failed.".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;

    let record = sqlx::query_as::<_, AccountRecord>(
        r#"
        INSERT INTO accounts (first_name, last_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, 'Client')
        RETURNING *
        "#,
    )
    .bind(first_name.as_str())
    .bind(last_name.as_str())
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        // The unique constraint backs the pre-check under concurrent signups.
        if is_unique_violation(&err) {
            AppError::BadRequest("Sorry, the registration failed.".to_string())
        } else {
            AppError::DbError(err)
        }
    })?;

    let account = account_from_record(record)?;

    if let Err(err) = log_audit(
        pool,
        Some(account.id),
        "account_register",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": account.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = format!(
        "Congratulations, you're registered {}! Please log in.",
        account.first_name
    );
    Ok(ApiResponse::success(message, account, None))
}

pub async fn login(pool: &DbPool, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let record: Option<AccountRecord> =
        sqlx::query_as("SELECT * FROM accounts WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;

    // Unknown email and wrong password produce the same outcome.
    let record = match record {
        Some(r) => r,
        None => return Err(AppError::InvalidCredentials),
    };

    let parsed_hash = PasswordHash::new(&record.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::InvalidCredentials);
    }

    let account = account_from_record(record)?;
    let token = issue_session(&account)?;

    if let Err(err) = log_audit(
        pool,
        Some(account.id),
        "account_login",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": account.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let resp = LoginResponse { token, account };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Sign a one-hour session token from the account's non-secret fields.
pub fn issue_session(account: &Account) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(SESSION_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: account.id.to_string(),
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        email: account.email.clone(),
        role: account.role,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(token)
}
