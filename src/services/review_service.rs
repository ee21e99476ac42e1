use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, EntityTrait};

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::review::{
        AddReviewContext, AdminReviewList, AdminReviewQuery, ModerationResult, MyReviewList,
        ReviewResponse, SubmitReviewRequest, UpdateReviewRequest,
    },
    entity::reviews::{ActiveModel, Entity as Reviews},
    error::{AppError, AppResult},
    middleware::auth::{SessionUser, ensure_staff},
    models::{Review, ReviewWithAuthor, ReviewWithContext, ReviewWithVehicle},
    response::{ApiResponse, Meta},
    services::auth_service::is_unique_violation,
    state::AppState,
};

const DUPLICATE_NOTICE: &str =
    "You have already reviewed this vehicle. You can edit your existing review instead.";

/// Review input bounds, re-checked at the service boundary regardless of what
/// the form layer already enforced.
fn validate_review_input(title: &str, text: &str, rating: i32) -> Result<(), AppError> {
    let title_len = title.trim().chars().count();
    if title_len < 1 || title_len > 100 {
        return Err(AppError::BadRequest(
            "Review title is required and must be between 1 and 100 characters.".to_string(),
        ));
    }
    let text_len = text.trim().chars().count();
    if text_len < 10 || text_len > 1000 {
        return Err(AppError::BadRequest(
            "Review text is required and must be between 10 and 1000 characters.".to_string(),
        ));
    }
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5 stars.".to_string(),
        ));
    }
    Ok(())
}

fn ensure_owner_or_admin(user: &SessionUser, owner_id: i32) -> Result<(), AppError> {
    if user.account_id != owner_id && !user.role.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub async fn has_reviewed(pool: &DbPool, inv_id: i32, account_id: i32) -> AppResult<bool> {
    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM reviews WHERE inv_id = $1 AND account_id = $2")
            .bind(inv_id)
            .bind(account_id)
            .fetch_optional(pool)
            .await?;
    Ok(existing.is_some())
}

/// Render context for the add-review form.
pub async fn add_review_context(
    state: &AppState,
    user: &SessionUser,
    inv_id: i32,
) -> AppResult<ApiResponse<AddReviewContext>> {
    let vehicle: Option<(String, String)> =
        sqlx::query_as("SELECT make, model FROM inventory WHERE id = $1")
            .bind(inv_id)
            .fetch_optional(&state.pool)
            .await?;
    let (make, model) = match vehicle {
        Some(v) => v,
        None => return Err(AppError::NotFound),
    };

    let vehicle_name = format!("{make} {model}");
    let reviewed = has_reviewed(&state.pool, inv_id, user.account_id).await?;
    let message = format!("Add Review - {vehicle_name}");
    let data = AddReviewContext {
        inv_id,
        vehicle_name,
        has_reviewed: reviewed,
    };
    Ok(ApiResponse::success(message, data, None))
}

/// At most one review per (account, vehicle). The pre-check gives the
/// friendly notice; the unique pair constraint makes the invariant hold even
/// when two submissions race past the check.
pub async fn submit(
    state: &AppState,
    user: &SessionUser,
    payload: SubmitReviewRequest,
) -> AppResult<ApiResponse<ReviewResponse>> {
    validate_review_input(&payload.title, &payload.text, payload.rating)?;

    let vehicle: Option<(i32,)> = sqlx::query_as("SELECT id FROM inventory WHERE id = $1")
        .bind(payload.inv_id)
        .fetch_optional(&state.pool)
        .await?;
    if vehicle.is_none() {
        return Err(AppError::NotFound);
    }

    if has_reviewed(&state.pool, payload.inv_id, user.account_id).await? {
        return Err(AppError::Duplicate(DUPLICATE_NOTICE.to_string()));
    }

    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (inv_id, account_id, title, text, rating)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(payload.inv_id)
    .bind(user.account_id)
    .bind(payload.title.as_str())
    .bind(payload.text.as_str())
    .bind(payload.rating)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::Duplicate(DUPLICATE_NOTICE.to_string())
        } else {
            AppError::DbError(err)
        }
    })?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "review_add",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review.id, "inv_id": review.inv_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Your review has been added successfully!",
        ReviewResponse { review },
        Some(Meta::empty()),
    ))
}

/// Approved reviews for the public vehicle detail page, newest first.
pub async fn list_for_vehicle(pool: &DbPool, inv_id: i32) -> AppResult<Vec<ReviewWithAuthor>> {
    let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
        r#"
        SELECT r.*, a.first_name, a.last_name
        FROM reviews r
        JOIN accounts a ON a.id = r.account_id
        WHERE r.inv_id = $1 AND r.approved = TRUE
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(inv_id)
    .fetch_all(pool)
    .await?;
    Ok(reviews)
}

/// The owner's reviews across all vehicles, every approval state included.
pub async fn list_for_account(
    state: &AppState,
    user: &SessionUser,
) -> AppResult<ApiResponse<MyReviewList>> {
    let items = sqlx::query_as::<_, ReviewWithVehicle>(
        r#"
        SELECT r.*, i.make, i.model, i.year
        FROM reviews r
        JOIN inventory i ON i.id = r.inv_id
        WHERE r.account_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(user.account_id)
    .fetch_all(&state.pool)
    .await?;

    let data = MyReviewList { items };
    Ok(ApiResponse::success("My Reviews", data, None))
}

async fn get_with_context(pool: &DbPool, review_id: i32) -> AppResult<Option<ReviewWithContext>> {
    let review = sqlx::query_as::<_, ReviewWithContext>(
        r#"
        SELECT r.*, a.first_name, a.last_name, i.make, i.model, i.year
        FROM reviews r
        JOIN accounts a ON a.id = r.account_id
        JOIN inventory i ON i.id = r.inv_id
        WHERE r.id = $1
        "#,
    )
    .bind(review_id)
    .fetch_optional(pool)
    .await?;
    Ok(review)
}

/// Render context for the edit form; only the owner or an Admin may load it.
pub async fn review_for_edit(
    state: &AppState,
    user: &SessionUser,
    review_id: i32,
) -> AppResult<ApiResponse<ReviewWithContext>> {
    let review = match get_with_context(&state.pool, review_id).await? {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    ensure_owner_or_admin(user, review.account_id)?;

    let message = format!("Edit Review - {} {}", review.make, review.model);
    Ok(ApiResponse::success(message, review, None))
}

/// Content edit by the owner or an Admin. The approval flag is left as is;
/// moderation is a separate act.
pub async fn update(
    state: &AppState,
    user: &SessionUser,
    review_id: i32,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<ReviewResponse>> {
    validate_review_input(&payload.title, &payload.text, payload.rating)?;

    let existing = Reviews::find_by_id(review_id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    ensure_owner_or_admin(user, existing.account_id)?;

    let mut active: ActiveModel = existing.into();
    active.title = Set(payload.title);
    active.text = Set(payload.text);
    active.rating = Set(payload.rating);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "review_update",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Your review has been updated successfully!",
        ReviewResponse {
            review: review_from_entity(updated),
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete(
    state: &AppState,
    user: &SessionUser,
    review_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Reviews::find_by_id(review_id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    ensure_owner_or_admin(user, existing.account_id)?;

    Reviews::delete_by_id(review_id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "review_delete",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Your review has been deleted successfully!",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Every review with author and vehicle context for the moderation view.
pub async fn list_all(
    state: &AppState,
    user: &SessionUser,
    query: AdminReviewQuery,
) -> AppResult<ApiResponse<AdminReviewList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let items = sqlx::query_as::<_, ReviewWithContext>(
        r#"
        SELECT r.*, a.first_name, a.last_name, i.make, i.model, i.year
        FROM reviews r
        JOIN accounts a ON a.id = r.account_id
        JOIN inventory i ON i.id = r.inv_id
        WHERE ($1::bool IS NULL OR r.approved = $1)
        ORDER BY r.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(query.approved)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM reviews WHERE ($1::bool IS NULL OR approved = $1)",
    )
    .bind(query.approved)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    let data = AdminReviewList { items };
    Ok(ApiResponse::success("Review Management", data, Some(meta)))
}

/// Flip the approval flag and report the resulting state.
pub async fn toggle_approval(
    state: &AppState,
    user: &SessionUser,
    review_id: i32,
) -> AppResult<ApiResponse<ModerationResult>> {
    ensure_staff(user)?;

    let row: Option<(bool,)> = sqlx::query_as(
        "UPDATE reviews SET approved = NOT approved WHERE id = $1 RETURNING approved",
    )
    .bind(review_id)
    .fetch_optional(&state.pool)
    .await?;
    let approved = match row {
        Some((a,)) => a,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "review_moderate",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review_id, "approved": approved })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let status = if approved { "approved" } else { "unapproved" };
    let message = format!("Review has been {status}.");
    let data = ModerationResult {
        review_id,
        approved,
    };
    Ok(ApiResponse::success(message, data, Some(Meta::empty())))
}

fn review_from_entity(model: crate::entity::reviews::Model) -> Review {
    Review {
        id: model.id,
        inv_id: model.inv_id,
        account_id: model.account_id,
        title: model.title,
        text: model.text,
        rating: model.rating,
        approved: model.approved,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}
