pub mod account_service;
pub mod auth_service;
pub mod inventory_service;
pub mod review_service;
