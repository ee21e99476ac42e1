use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        account::{AccountList, AccountListQuery, AddUserRequest, UpdateProfileRequest,
            UpdatePasswordRequest, UpdateUserRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        inventory::{ClassificationList, CreateClassificationRequest, CreateVehicleRequest,
            UpdateVehicleRequest, VehicleDetail, VehicleList, VehicleResponse},
        review::{AddReviewContext, AdminReviewList, ModerationResult, MyReviewList,
            ReviewResponse, SubmitReviewRequest, UpdateReviewRequest},
    },
    middleware::auth::SESSION_COOKIE,
    models::{
        Account, Classification, Review, ReviewWithAuthor, ReviewWithContext, ReviewWithVehicle,
        Role, Vehicle, VehicleWithStats,
    },
    response::{ApiResponse, Meta},
    routes::{account, health, inventory, params, review},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        account::register,
        account::login,
        account::logout,
        account::management,
        account::update_profile,
        account::update_password,
        account::account_json,
        account::manage_users,
        account::add_user,
        account::edit_user,
        account::update_user,
        account::delete_user,
        inventory::list_classifications,
        inventory::add_classification,
        inventory::by_classification,
        inventory::detail,
        inventory::inventory_json,
        inventory::add_vehicle,
        inventory::edit_vehicle,
        inventory::update_vehicle,
        inventory::delete_vehicle,
        review::my_reviews,
        review::add_context,
        review::submit,
        review::edit_context,
        review::update,
        review::delete,
        review::admin_list,
        review::toggle_approval
    ),
    components(
        schemas(
            Role,
            Account,
            Classification,
            Vehicle,
            VehicleWithStats,
            Review,
            ReviewWithAuthor,
            ReviewWithVehicle,
            ReviewWithContext,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            UpdatePasswordRequest,
            AddUserRequest,
            UpdateUserRequest,
            AccountList,
            AccountListQuery,
            CreateClassificationRequest,
            CreateVehicleRequest,
            UpdateVehicleRequest,
            ClassificationList,
            VehicleList,
            VehicleDetail,
            VehicleResponse,
            SubmitReviewRequest,
            UpdateReviewRequest,
            AddReviewContext,
            MyReviewList,
            AdminReviewList,
            ModerationResult,
            ReviewResponse,
            params::Pagination,
            Meta,
            ApiResponse<Account>,
            ApiResponse<LoginResponse>,
            ApiResponse<AccountList>,
            ApiResponse<ClassificationList>,
            ApiResponse<VehicleList>,
            ApiResponse<VehicleDetail>,
            ApiResponse<VehicleResponse>,
            ApiResponse<MyReviewList>,
            ApiResponse<AdminReviewList>,
            ApiResponse<ModerationResult>,
            ApiResponse<ReviewResponse>
        )
    ),
    security(
        ("session_cookie" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Account", description = "Registration, login, and user management"),
        (name = "Inventory", description = "Classification and vehicle endpoints"),
        (name = "Review", description = "Vehicle review and moderation endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
