use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Review, ReviewWithContext, ReviewWithVehicle};
use crate::routes::params::Pagination;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    pub inv_id: i32,
    pub title: String,
    pub text: String,
    pub rating: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub title: String,
    pub text: String,
    pub rating: i32,
}

/// Render context for the add-review form: which vehicle is being reviewed.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddReviewContext {
    pub inv_id: i32,
    pub vehicle_name: String,
    pub has_reviewed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MyReviewList {
    pub items: Vec<ReviewWithVehicle>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminReviewList {
    pub items: Vec<ReviewWithContext>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminReviewQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub approved: Option<bool>,
}

/// Outcome of a moderation toggle, driving the "approved"/"unapproved"
/// notice.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModerationResult {
    pub review_id: i32,
    pub approved: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub review: Review,
}
