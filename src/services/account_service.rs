use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    audit::log_audit,
    dto::account::{
        AccountList, AccountListQuery, AddUserRequest, UpdateProfileRequest, UpdatePasswordRequest,
        UpdateUserRequest,
    },
    dto::auth::LoginResponse,
    entity::accounts::{ActiveModel, Column, Entity as Accounts, Model as AccountModel},
    error::{AppError, AppResult},
    middleware::auth::{SessionUser, ensure_admin},
    models::{Account, AccountRecord},
    response::{ApiResponse, Meta},
    services::auth_service::{account_from_record, hash_password, is_unique_violation, issue_session},
    state::AppState,
};

pub async fn get_own_account(
    state: &AppState,
    user: &SessionUser,
) -> AppResult<ApiResponse<Account>> {
    let model = Accounts::find_by_id(user.account_id)
        .one(&state.orm)
        .await?;
    let model = match model {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Account Management",
        account_from_entity(model)?,
        None,
    ))
}

/// The account JSON endpoint keeps its historical shape: an array holding a
/// single account.
pub async fn get_account_json(
    state: &AppState,
    user: &SessionUser,
    account_id: i32,
) -> AppResult<Vec<Account>> {
    ensure_admin(user)?;
    let record: Option<AccountRecord> =
        sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(&state.pool)
            .await?;
    let record = match record {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    Ok(vec![account_from_record(record)?])
}

pub async fn update_profile(
    state: &AppState,
    user: &SessionUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let taken: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM accounts WHERE email = $1 AND id != $2")
            .bind(payload.email.as_str())
            .bind(user.account_id)
            .fetch_optional(&state.pool)
            .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest(
            "Sorry, the update failed.".to_string(),
        ));
    }

    let existing = Accounts::find_by_id(user.account_id)
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    active.first_name = Set(payload.first_name);
    active.last_name = Set(payload.last_name);
    active.email = Set(payload.email);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "account_update",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": user.account_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    // The session token carries the profile fields, so reissue it.
    let account = account_from_entity(updated)?;
    let message = format!("Successfully updated {}'s account.", account.first_name);
    let token = issue_session(&account)?;
    Ok(ApiResponse::success(
        message,
        LoginResponse { token, account },
        Some(Meta::empty()),
    ))
}

pub async fn update_password(
    state: &AppState,
    user: &SessionUser,
    payload: UpdatePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let password_hash = hash_password(&payload.password)?;

    let existing = Accounts::find_by_id(user.account_id)
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    active.password_hash = Set(password_hash);
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "password_update",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": user.account_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Successfully updated password.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_accounts(
    state: &AppState,
    user: &SessionUser,
    query: AccountListQuery,
) -> AppResult<ApiResponse<AccountList>> {
    ensure_admin(user)?;

    let mut finder = Accounts::find().order_by_asc(Column::Id);
    if let Some(role) = query.role {
        finder = finder.filter(Column::Role.eq(role.as_str()));
    }

    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(account_from_entity)
        .collect::<AppResult<Vec<Account>>>()?;

    let data = AccountList { items };
    Ok(ApiResponse::success("Manage Users", data, Some(Meta::empty())))
}

pub async fn add_user(
    state: &AppState,
    user: &SessionUser,
    payload: AddUserRequest,
) -> AppResult<ApiResponse<Account>> {
    ensure_admin(user)?;

    let password_hash = hash_password(&payload.password)?;

    let record = sqlx::query_as::<_, AccountRecord>(
        r#"
        INSERT INTO accounts (first_name, last_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(payload.first_name.as_str())
    .bind(payload.last_name.as_str())
    .bind(payload.email.as_str())
    .bind(password_hash)
    .bind(payload.role.as_str())
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::BadRequest("Sorry, the registration failed.".to_string())
        } else {
            AppError::DbError(err)
        }
    })?;

    let account = account_from_record(record)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "user_add",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": account.id, "role": account.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = format!("Successfully registered {}.", account.first_name);
    Ok(ApiResponse::success(message, account, Some(Meta::empty())))
}

pub async fn get_user(
    state: &AppState,
    user: &SessionUser,
    account_id: i32,
) -> AppResult<ApiResponse<Account>> {
    ensure_admin(user)?;
    let model = Accounts::find_by_id(account_id).one(&state.orm).await?;
    let model = match model {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    let account = account_from_entity(model)?;
    let message = format!("Edit {} {}", account.first_name, account.last_name);
    Ok(ApiResponse::success(message, account, None))
}

pub async fn update_user_account(
    state: &AppState,
    user: &SessionUser,
    account_id: i32,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<Account>> {
    ensure_admin(user)?;

    let taken: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM accounts WHERE email = $1 AND id != $2")
            .bind(payload.email.as_str())
            .bind(account_id)
            .fetch_optional(&state.pool)
            .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest(
            "Sorry, the update failed.".to_string(),
        ));
    }

    let existing = Accounts::find_by_id(account_id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    active.first_name = Set(payload.first_name);
    active.last_name = Set(payload.last_name);
    active.email = Set(payload.email);
    active.role = Set(payload.role.as_str().to_string());
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "user_update",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": account_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let account = account_from_entity(updated)?;
    let message = format!("Successfully updated {}'s account.", account.first_name);
    Ok(ApiResponse::success(message, account, Some(Meta::empty())))
}

pub async fn delete_account(
    state: &AppState,
    user: &SessionUser,
    account_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Accounts::delete_by_id(account_id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "user_delete",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": account_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Account deleted successfully.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn account_from_entity(model: AccountModel) -> AppResult<Account> {
    let role = model
        .role
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(Account {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        role,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
