use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::inventory::{
        ClassificationList, CreateClassificationRequest, CreateVehicleRequest,
        UpdateVehicleRequest, VehicleDetail, VehicleList, VehicleResponse,
    },
    error::AppResult,
    middleware::auth::{OptionalSession, SessionUser},
    models::{Classification, Vehicle},
    response::ApiResponse,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/classifications",
            get(list_classifications).post(add_classification),
        )
        .route("/classification/{classification_id}", get(by_classification))
        .route("/detail/{inv_id}", get(detail))
        .route("/json/{classification_id}", get(inventory_json))
        .route("/vehicles", post(add_vehicle))
        .route(
            "/vehicles/{inv_id}",
            get(edit_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

#[utoipa::path(
    get,
    path = "/inv/classifications",
    responses(
        (status = 200, description = "All classifications, ordered by name", body = ApiResponse<ClassificationList>),
    ),
    tag = "Inventory"
)]
pub async fn list_classifications(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ClassificationList>>> {
    let resp = inventory_service::list_classifications(&state.pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/inv/classifications",
    request_body = CreateClassificationRequest,
    responses(
        (status = 200, description = "Classification added (staff only)", body = ApiResponse<Classification>),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_cookie" = [])),
    tag = "Inventory"
)]
pub async fn add_classification(
    State(state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<CreateClassificationRequest>,
) -> AppResult<Json<ApiResponse<Classification>>> {
    let resp = inventory_service::add_classification(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/inv/classification/{classification_id}",
    params(
        ("classification_id" = i32, Path, description = "Classification ID")
    ),
    responses(
        (status = 200, description = "Vehicles with review aggregates", body = ApiResponse<VehicleList>),
        (status = 404, description = "No such classification"),
    ),
    tag = "Inventory"
)]
pub async fn by_classification(
    State(state): State<AppState>,
    Path(classification_id): Path<i32>,
) -> AppResult<Json<ApiResponse<VehicleList>>> {
    let resp =
        inventory_service::vehicles_by_classification(&state.pool, classification_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/inv/detail/{inv_id}",
    params(
        ("inv_id" = i32, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Vehicle detail with approved reviews", body = ApiResponse<VehicleDetail>),
        (status = 404, description = "No such vehicle"),
    ),
    tag = "Inventory"
)]
pub async fn detail(
    State(state): State<AppState>,
    OptionalSession(viewer): OptionalSession,
    Path(inv_id): Path<i32>,
) -> AppResult<Json<ApiResponse<VehicleDetail>>> {
    let resp = inventory_service::vehicle_detail(&state, viewer.as_ref(), inv_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/inv/json/{classification_id}",
    params(
        ("classification_id" = i32, Path, description = "Classification ID")
    ),
    responses(
        (status = 200, description = "Bare vehicle rows (staff only)", body = [Vehicle]),
        (status = 404, description = "No vehicles in classification"),
    ),
    security(("session_cookie" = [])),
    tag = "Inventory"
)]
pub async fn inventory_json(
    State(state): State<AppState>,
    user: SessionUser,
    Path(classification_id): Path<i32>,
) -> AppResult<Json<Vec<Vehicle>>> {
    let vehicles = inventory_service::vehicles_json(&state, &user, classification_id).await?;
    Ok(Json(vehicles))
}

#[utoipa::path(
    post,
    path = "/inv/vehicles",
    request_body = CreateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle added (staff only)", body = ApiResponse<VehicleResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_cookie" = [])),
    tag = "Inventory"
)]
pub async fn add_vehicle(
    State(state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<ApiResponse<VehicleResponse>>> {
    let resp = inventory_service::add_vehicle(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/inv/vehicles/{inv_id}",
    params(
        ("inv_id" = i32, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Edit-vehicle context (staff only)", body = ApiResponse<VehicleResponse>),
        (status = 404, description = "No such vehicle"),
    ),
    security(("session_cookie" = [])),
    tag = "Inventory"
)]
pub async fn edit_vehicle(
    State(state): State<AppState>,
    user: SessionUser,
    Path(inv_id): Path<i32>,
) -> AppResult<Json<ApiResponse<VehicleResponse>>> {
    let resp = inventory_service::get_vehicle(&state, &user, inv_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/inv/vehicles/{inv_id}",
    params(
        ("inv_id" = i32, Path, description = "Vehicle ID")
    ),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated (staff only)", body = ApiResponse<VehicleResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_cookie" = [])),
    tag = "Inventory"
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    user: SessionUser,
    Path(inv_id): Path<i32>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<ApiResponse<VehicleResponse>>> {
    let resp = inventory_service::update_vehicle(&state, &user, inv_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/inv/vehicles/{inv_id}",
    params(
        ("inv_id" = i32, Path, description = "Vehicle ID")
    ),
    responses(
        (status = 200, description = "Vehicle deleted (staff only)"),
        (status = 404, description = "No such vehicle"),
    ),
    security(("session_cookie" = [])),
    tag = "Inventory"
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    user: SessionUser,
    Path(inv_id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = inventory_service::delete_vehicle(&state, &user, inv_id).await?;
    Ok(Json(resp))
}
