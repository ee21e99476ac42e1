use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    dto::account::{
        AccountList, AccountListQuery, AddUserRequest, UpdateProfileRequest, UpdatePasswordRequest,
        UpdateUserRequest,
    },
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::AppResult,
    middleware::auth::{SESSION_COOKIE, SessionUser},
    models::Account,
    response::{ApiResponse, Meta},
    services::{account_service, auth_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/", get(management))
        .route("/profile", put(update_profile))
        .route("/password", put(update_password))
        .route("/json/{account_id}", get(account_json))
        .route("/manage", get(manage_users))
        .route("/users", post(add_user))
        .route(
            "/users/{account_id}",
            get(edit_user).put(update_user).delete(delete_user),
        )
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(
    post,
    path = "/account/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register account", body = ApiResponse<Account>),
        (status = 400, description = "Registration failed"),
    ),
    tag = "Account"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = auth_service::register(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/account/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login, sets session cookie", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Account"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<LoginResponse>>)> {
    let resp = auth_service::login(&state.pool, payload).await?;
    let jar = match resp.data.as_ref() {
        Some(data) => jar.add(session_cookie(
            data.token.clone(),
            state.config.cookie_secure,
        )),
        None => jar,
    };
    Ok((jar, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/account/logout",
    responses(
        (status = 200, description = "Logout, clears session cookie"),
    ),
    tag = "Account"
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<serde_json::Value>>) {
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    let resp = ApiResponse::success(
        "You have been logged out.",
        serde_json::json!({}),
        Some(Meta::empty()),
    );
    (jar, Json(resp))
}

#[utoipa::path(
    get,
    path = "/account/",
    responses(
        (status = 200, description = "Account management context", body = ApiResponse<Account>),
        (status = 401, description = "Not logged in"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn management(
    State(state): State<AppState>,
    user: SessionUser,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = account_service::get_own_account(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/account/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated, session reissued", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Update failed"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: SessionUser,
    jar: CookieJar,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<LoginResponse>>)> {
    let resp = account_service::update_profile(&state, &user, payload).await?;
    let jar = match resp.data.as_ref() {
        Some(data) => jar.add(session_cookie(
            data.token.clone(),
            state.config.cookie_secure,
        )),
        None => jar,
    };
    Ok((jar, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/account/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn update_password(
    State(state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::update_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/account/json/{account_id}",
    params(
        ("account_id" = i32, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account as a one-element array", body = [Account]),
        (status = 404, description = "No such account"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn account_json(
    State(state): State<AppState>,
    user: SessionUser,
    Path(account_id): Path<i32>,
) -> AppResult<Json<Vec<Account>>> {
    let accounts = account_service::get_account_json(&state, &user, account_id).await?;
    Ok(Json(accounts))
}

#[utoipa::path(
    get,
    path = "/account/manage",
    params(
        ("role" = Option<String>, Query, description = "Filter by role"),
    ),
    responses(
        (status = 200, description = "All accounts (admin only)", body = ApiResponse<AccountList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn manage_users(
    State(state): State<AppState>,
    user: SessionUser,
    Query(query): Query<AccountListQuery>,
) -> AppResult<Json<ApiResponse<AccountList>>> {
    let resp = account_service::list_accounts(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/account/users",
    request_body = AddUserRequest,
    responses(
        (status = 200, description = "User added with explicit role (admin only)", body = ApiResponse<Account>),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn add_user(
    State(state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<AddUserRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = account_service::add_user(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/account/users/{account_id}",
    params(
        ("account_id" = i32, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Edit-user context (admin only)", body = ApiResponse<Account>),
        (status = 404, description = "No such account"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn edit_user(
    State(state): State<AppState>,
    user: SessionUser,
    Path(account_id): Path<i32>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = account_service::get_user(&state, &user, account_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/account/users/{account_id}",
    params(
        ("account_id" = i32, Path, description = "Account ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated (admin only)", body = ApiResponse<Account>),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: SessionUser,
    Path(account_id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = account_service::update_user_account(&state, &user, account_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/account/users/{account_id}",
    params(
        ("account_id" = i32, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "User deleted (admin only)"),
        (status = 404, description = "No such account"),
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: SessionUser,
    Path(account_id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::delete_account(&state, &user, account_id).await?;
    Ok(Json(resp))
}
