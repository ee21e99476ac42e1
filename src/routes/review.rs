use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};

use crate::{
    dto::review::{
        AddReviewContext, AdminReviewList, AdminReviewQuery, ModerationResult, MyReviewList,
        ReviewResponse, SubmitReviewRequest, UpdateReviewRequest,
    },
    error::AppResult,
    middleware::auth::SessionUser,
    models::ReviewWithContext,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_reviews).post(submit))
        .route("/my-reviews", get(my_reviews))
        .route("/add/{inv_id}", get(add_context))
        .route("/admin", get(admin_list))
        .route(
            "/{review_id}",
            get(edit_context).put(update).delete(delete),
        )
        .route("/{review_id}/approval", patch(toggle_approval))
}

#[utoipa::path(
    get,
    path = "/review/my-reviews",
    responses(
        (status = 200, description = "Own reviews, all approval states", body = ApiResponse<MyReviewList>),
        (status = 401, description = "Not logged in"),
    ),
    security(("session_cookie" = [])),
    tag = "Review"
)]
pub async fn my_reviews(
    State(state): State<AppState>,
    user: SessionUser,
) -> AppResult<Json<ApiResponse<MyReviewList>>> {
    let resp = review_service::list_for_account(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/review/add/{inv_id}",
    params(
        ("inv_id" = i32, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Add-review context", body = ApiResponse<AddReviewContext>),
        (status = 404, description = "No such vehicle"),
    ),
    security(("session_cookie" = [])),
    tag = "Review"
)]
pub async fn add_context(
    State(state): State<AppState>,
    user: SessionUser,
    Path(inv_id): Path<i32>,
) -> AppResult<Json<ApiResponse<AddReviewContext>>> {
    let resp = review_service::add_review_context(&state, &user, inv_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/review/",
    request_body = SubmitReviewRequest,
    responses(
        (status = 200, description = "Review submitted, pending approval", body = ApiResponse<ReviewResponse>),
        (status = 409, description = "Already reviewed this vehicle"),
    ),
    security(("session_cookie" = [])),
    tag = "Review"
)]
pub async fn submit(
    State(state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<SubmitReviewRequest>,
) -> AppResult<Json<ApiResponse<ReviewResponse>>> {
    let resp = review_service::submit(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/review/{review_id}",
    params(
        ("review_id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Edit-review context (owner or Admin)", body = ApiResponse<ReviewWithContext>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No such review"),
    ),
    security(("session_cookie" = [])),
    tag = "Review"
)]
pub async fn edit_context(
    State(state): State<AppState>,
    user: SessionUser,
    Path(review_id): Path<i32>,
) -> AppResult<Json<ApiResponse<ReviewWithContext>>> {
    let resp = review_service::review_for_edit(&state, &user, review_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/review/{review_id}",
    params(
        ("review_id" = i32, Path, description = "Review ID")
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated (owner or Admin)", body = ApiResponse<ReviewResponse>),
        (status = 403, description = "Not the owner"),
    ),
    security(("session_cookie" = [])),
    tag = "Review"
)]
pub async fn update(
    State(state): State<AppState>,
    user: SessionUser,
    Path(review_id): Path<i32>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<ReviewResponse>>> {
    let resp = review_service::update(&state, &user, review_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/review/{review_id}",
    params(
        ("review_id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review deleted (owner or Admin)"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No such review"),
    ),
    security(("session_cookie" = [])),
    tag = "Review"
)]
pub async fn delete(
    State(state): State<AppState>,
    user: SessionUser,
    Path(review_id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = review_service::delete(&state, &user, review_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/review/admin",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("approved" = Option<bool>, Query, description = "Filter by approval state"),
    ),
    responses(
        (status = 200, description = "All reviews for moderation (staff only)", body = ApiResponse<AdminReviewList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_cookie" = [])),
    tag = "Review"
)]
pub async fn admin_list(
    State(state): State<AppState>,
    user: SessionUser,
    Query(query): Query<AdminReviewQuery>,
) -> AppResult<Json<ApiResponse<AdminReviewList>>> {
    let resp = review_service::list_all(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/review/{review_id}/approval",
    params(
        ("review_id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Approval flag toggled (staff only)", body = ApiResponse<ModerationResult>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No such review"),
    ),
    security(("session_cookie" = [])),
    tag = "Review"
)]
pub async fn toggle_approval(
    State(state): State<AppState>,
    user: SessionUser,
    Path(review_id): Path<i32>,
) -> AppResult<Json<ApiResponse<ModerationResult>>> {
    let resp = review_service::toggle_approval(&state, &user, review_id).await?;
    Ok(Json(resp))
}
