use axum::Router;

use crate::state::AppState;

pub mod account;
pub mod doc;
pub mod health;
pub mod inventory;
pub mod params;
pub mod review;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/account", account::router())
        .nest("/inv", inventory::router())
        .nest("/review", review::router())
}
