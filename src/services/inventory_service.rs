use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, EntityTrait};

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::inventory::{
        ClassificationList, CreateClassificationRequest, CreateVehicleRequest, UpdateVehicleRequest,
        VehicleDetail, VehicleList, VehicleResponse,
    },
    entity::inventory::{ActiveModel, Entity as Inventory, Model as VehicleModel},
    error::{AppError, AppResult},
    middleware::auth::{SessionUser, ensure_staff},
    models::{Classification, Vehicle, VehicleWithStats},
    response::{ApiResponse, Meta},
    services::{auth_service::is_unique_violation, review_service},
    state::AppState,
};

const VEHICLE_STATS_COLUMNS: &str = r#"
    i.id, i.make, i.model, i.year, i.description, i.image, i.thumbnail,
    i.price, i.miles, i.color, i.classification_id,
    c.name AS classification_name,
    COALESCE(AVG(r.rating), 0)::float8 AS avg_rating,
    COUNT(r.id) AS review_count
"#;

pub async fn list_classifications(pool: &DbPool) -> AppResult<ApiResponse<ClassificationList>> {
    let items = sqlx::query_as::<_, Classification>(
        "SELECT id, name FROM classifications ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let data = ClassificationList { items };
    Ok(ApiResponse::success("Classifications", data, None))
}

pub async fn add_classification(
    state: &AppState,
    user: &SessionUser,
    payload: CreateClassificationRequest,
) -> AppResult<ApiResponse<Classification>> {
    ensure_staff(user)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest(
            "Classification name is required.".to_string(),
        ));
    }

    let classification = sqlx::query_as::<_, Classification>(
        "INSERT INTO classifications (name) VALUES ($1) RETURNING id, name",
    )
    .bind(name)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::BadRequest("Sorry, adding the classification failed.".to_string())
        } else {
            AppError::DbError(err)
        }
    })?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "classification_add",
        Some("classifications"),
        Some(serde_json::json!({ "classification_id": classification.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = format!("The {} classification was successfully added.", classification.name);
    Ok(ApiResponse::success(message, classification, Some(Meta::empty())))
}

/// Vehicles in a classification, each carrying the aggregate over its
/// approved reviews. The aggregate is recomputed on every read, so a
/// moderation change shows up on the very next call.
pub async fn vehicles_by_classification(
    pool: &DbPool,
    classification_id: i32,
) -> AppResult<ApiResponse<VehicleList>> {
    let classification: Option<Classification> =
        sqlx::query_as("SELECT id, name FROM classifications WHERE id = $1")
            .bind(classification_id)
            .fetch_optional(pool)
            .await?;
    let classification = match classification {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let sql = format!(
        r#"
        SELECT {VEHICLE_STATS_COLUMNS}
        FROM inventory i
        JOIN classifications c ON c.id = i.classification_id
        LEFT JOIN reviews r ON r.inv_id = i.id AND r.approved = TRUE
        WHERE i.classification_id = $1
        GROUP BY i.id, c.name
        ORDER BY i.make, i.model
        "#
    );
    let items = sqlx::query_as::<_, VehicleWithStats>(&sql)
        .bind(classification_id)
        .fetch_all(pool)
        .await?;

    let message = format!("{} vehicles", classification.name);
    let data = VehicleList {
        classification_name: classification.name,
        items,
    };
    Ok(ApiResponse::success(message, data, None))
}

pub async fn vehicle_detail(
    state: &AppState,
    viewer: Option<&SessionUser>,
    inv_id: i32,
) -> AppResult<ApiResponse<VehicleDetail>> {
    let sql = format!(
        r#"
        SELECT {VEHICLE_STATS_COLUMNS}
        FROM inventory i
        JOIN classifications c ON c.id = i.classification_id
        LEFT JOIN reviews r ON r.inv_id = i.id AND r.approved = TRUE
        WHERE i.id = $1
        GROUP BY i.id, c.name
        "#
    );
    let vehicle: Option<VehicleWithStats> = sqlx::query_as(&sql)
        .bind(inv_id)
        .fetch_optional(&state.pool)
        .await?;
    let vehicle = match vehicle {
        Some(v) => v,
        None => return Err(AppError::NotFound),
    };

    let reviews = review_service::list_for_vehicle(&state.pool, inv_id).await?;

    let (can_review, has_reviewed) = match viewer {
        Some(user) => {
            let reviewed =
                review_service::has_reviewed(&state.pool, inv_id, user.account_id).await?;
            (!reviewed, reviewed)
        }
        None => (false, false),
    };

    let message = format!("{} {}", vehicle.make, vehicle.model);
    let data = VehicleDetail {
        vehicle,
        reviews,
        can_review,
        has_reviewed,
    };
    Ok(ApiResponse::success(message, data, None))
}

/// Bare vehicle rows for the management view's classification selector.
pub async fn vehicles_json(
    state: &AppState,
    user: &SessionUser,
    classification_id: i32,
) -> AppResult<Vec<Vehicle>> {
    ensure_staff(user)?;
    let items = sqlx::query_as::<_, Vehicle>(
        "SELECT * FROM inventory WHERE classification_id = $1 ORDER BY make, model",
    )
    .bind(classification_id)
    .fetch_all(&state.pool)
    .await?;

    if items.is_empty() {
        return Err(AppError::NotFound);
    }
    Ok(items)
}

pub async fn get_vehicle(
    state: &AppState,
    user: &SessionUser,
    inv_id: i32,
) -> AppResult<ApiResponse<VehicleResponse>> {
    ensure_staff(user)?;
    let model = Inventory::find_by_id(inv_id).one(&state.orm).await?;
    let model = match model {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    let vehicle = vehicle_from_entity(model);
    let message = format!("Edit {} {}", vehicle.make, vehicle.model);
    Ok(ApiResponse::success(message, VehicleResponse { vehicle }, None))
}

pub async fn add_vehicle(
    state: &AppState,
    user: &SessionUser,
    payload: CreateVehicleRequest,
) -> AppResult<ApiResponse<VehicleResponse>> {
    ensure_staff(user)?;

    let active = ActiveModel {
        id: NotSet,
        make: Set(payload.make),
        model: Set(payload.model),
        year: Set(payload.year),
        description: Set(payload.description),
        image: Set(payload.image),
        thumbnail: Set(payload.thumbnail),
        price: Set(payload.price),
        miles: Set(payload.miles),
        color: Set(payload.color),
        classification_id: Set(payload.classification_id),
        created_at: NotSet,
    };
    let vehicle = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "vehicle_add",
        Some("inventory"),
        Some(serde_json::json!({ "inv_id": vehicle.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let vehicle = vehicle_from_entity(vehicle);
    let message = format!("The {} {} was successfully added.", vehicle.make, vehicle.model);
    Ok(ApiResponse::success(
        message,
        VehicleResponse { vehicle },
        Some(Meta::empty()),
    ))
}

pub async fn update_vehicle(
    state: &AppState,
    user: &SessionUser,
    inv_id: i32,
    payload: UpdateVehicleRequest,
) -> AppResult<ApiResponse<VehicleResponse>> {
    ensure_staff(user)?;

    let existing = Inventory::find_by_id(inv_id).one(&state.orm).await?;
    let existing = match existing {
        Some(v) => v,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(make) = payload.make {
        active.make = Set(make);
    }
    if let Some(model) = payload.model {
        active.model = Set(model);
    }
    if let Some(year) = payload.year {
        active.year = Set(year);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(image) = payload.image {
        active.image = Set(image);
    }
    if let Some(thumbnail) = payload.thumbnail {
        active.thumbnail = Set(thumbnail);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(miles) = payload.miles {
        active.miles = Set(miles);
    }
    if let Some(color) = payload.color {
        active.color = Set(color);
    }
    if let Some(classification_id) = payload.classification_id {
        active.classification_id = Set(classification_id);
    }

    let vehicle = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "vehicle_update",
        Some("inventory"),
        Some(serde_json::json!({ "inv_id": vehicle.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let vehicle = vehicle_from_entity(vehicle);
    let message = format!(
        "The {} {} was successfully updated.",
        vehicle.make, vehicle.model
    );
    Ok(ApiResponse::success(
        message,
        VehicleResponse { vehicle },
        Some(Meta::empty()),
    ))
}

pub async fn delete_vehicle(
    state: &AppState,
    user: &SessionUser,
    inv_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;

    let result = Inventory::delete_by_id(inv_id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.account_id),
        "vehicle_delete",
        Some("inventory"),
        Some(serde_json::json!({ "inv_id": inv_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "The vehicle was successfully deleted.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn vehicle_from_entity(model: VehicleModel) -> Vehicle {
    Vehicle {
        id: model.id,
        make: model.make,
        model: model.model,
        year: model.year,
        description: model.description,
        image: model.image,
        thumbnail: model.thumbnail,
        price: model.price,
        miles: model.miles,
        color: model.color,
        classification_id: model.classification_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
