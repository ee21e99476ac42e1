use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Classification, ReviewWithAuthor, Vehicle, VehicleWithStats};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClassificationRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVehicleRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub description: String,
    pub image: String,
    pub thumbnail: String,
    pub price: i64,
    pub miles: i32,
    pub color: String,
    pub classification_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVehicleRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub price: Option<i64>,
    pub miles: Option<i32>,
    pub color: Option<String>,
    pub classification_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassificationList {
    pub items: Vec<Classification>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleList {
    pub classification_name: String,
    pub items: Vec<VehicleWithStats>,
}

/// Render context for the vehicle detail page: the aggregated vehicle, its
/// approved reviews, and whether the viewing account may add one.
#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleDetail {
    pub vehicle: VehicleWithStats,
    pub reviews: Vec<ReviewWithAuthor>,
    pub can_review: bool,
    pub has_reviewed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleResponse {
    pub vehicle: Vehicle,
}
