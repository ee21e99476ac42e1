use axum_motors::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::auth::{LoginRequest, RegisterRequest},
    dto::review::{AdminReviewQuery, SubmitReviewRequest, UpdateReviewRequest},
    entity::{classifications::ActiveModel as ClassificationActive, inventory::ActiveModel as VehicleActive},
    error::AppError,
    middleware::auth::{SessionUser, verify_session_token},
    models::Role,
    routes::params::Pagination,
    services::{auth_service, inventory_service, review_service},
    state::AppState,
};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Statement};

// Integration flow: client registers, logs in, reviews a vehicle; the review
// stays invisible until a staff account approves it, and the vehicle's
// aggregate follows the approval state.
#[tokio::test]
async fn register_review_and_moderation_flow() -> anyhow::Result<()> {
    let state = match setup_state().await? {
        Some(s) => s,
        None => return Ok(()),
    };

    // Register and log in.
    let reg = auth_service::register(
        &state.pool,
        RegisterRequest {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            password: "secret123".into(),
        },
    )
    .await?;
    let registered = reg.data.expect("registered account");
    assert_eq!(registered.role, Role::Client);

    let login = auth_service::login(
        &state.pool,
        LoginRequest {
            email: "jane@x.com".into(),
            password: "secret123".into(),
        },
    )
    .await?;
    let login = login.data.expect("login data");

    // The restored session identity matches the registration.
    let session = verify_session_token(&login.token).expect("valid session");
    assert_eq!(session.first_name, "Jane");
    assert_eq!(session.role, Role::Client);

    // Wrong password and unknown email produce the same outcome.
    let wrong_password = auth_service::login(
        &state.pool,
        LoginRequest {
            email: "jane@x.com".into(),
            password: "wrong".into(),
        },
    )
    .await;
    let unknown_email = auth_service::login(
        &state.pool,
        LoginRequest {
            email: "nobody@x.com".into(),
            password: "secret123".into(),
        },
    )
    .await;
    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown_email, Err(AppError::InvalidCredentials)));

    // Seed a vehicle to review.
    let inv_id = seed_vehicle(&state).await?;
    let staff = seed_staff(&state, "moderator@motors.example", Role::Employee).await?;

    // Submit a review; it starts unapproved.
    let submitted = review_service::submit(
        &state,
        &session,
        SubmitReviewRequest {
            inv_id,
            title: "Great".into(),
            text: "Loved driving it, smooth ride".into(),
            rating: 5,
        },
    )
    .await?;
    let review = submitted.data.expect("review data").review;
    assert!(!review.approved);

    // Visible to the owner, absent from the public listing.
    let mine = review_service::list_for_account(&state, &session).await?;
    let mine = mine.data.expect("my reviews");
    assert_eq!(mine.items.len(), 1);
    assert!(!mine.items[0].approved);

    let detail = inventory_service::vehicle_detail(&state, Some(&session), inv_id).await?;
    let detail = detail.data.expect("detail");
    assert!(detail.reviews.is_empty());
    assert_eq!(detail.vehicle.review_count, 0);
    assert_eq!(detail.vehicle.avg_rating, 0.0);
    assert!(detail.has_reviewed);
    assert!(!detail.can_review);

    // A second submission for the same (account, vehicle) pair is rejected.
    let duplicate = review_service::submit(
        &state,
        &session,
        SubmitReviewRequest {
            inv_id,
            title: "Again".into(),
            text: "Trying to submit a second review".into(),
            rating: 4,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Duplicate(_))));

    // Out-of-range rating is rejected before touching the store.
    let bad_rating = review_service::submit(
        &state,
        &staff,
        SubmitReviewRequest {
            inv_id,
            title: "Stars".into(),
            text: "This rating is out of range".into(),
            rating: 6,
        },
    )
    .await;
    assert!(matches!(bad_rating, Err(AppError::BadRequest(_))));

    // Moderation is staff-only.
    let forbidden = review_service::toggle_approval(&state, &session, review.id).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // Approve: the review and its rating appear on the next read.
    let toggled = review_service::toggle_approval(&state, &staff, review.id).await?;
    assert!(toggled.data.expect("moderation result").approved);

    let detail = inventory_service::vehicle_detail(&state, None, inv_id).await?;
    let detail = detail.data.expect("detail");
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.vehicle.review_count, 1);
    assert_eq!(detail.vehicle.avg_rating, 5.0);

    // Toggling twice returns to the original state, and the aggregate drops.
    let toggled = review_service::toggle_approval(&state, &staff, review.id).await?;
    assert!(!toggled.data.expect("moderation result").approved);

    let detail = inventory_service::vehicle_detail(&state, None, inv_id).await?;
    let detail = detail.data.expect("detail");
    assert!(detail.reviews.is_empty());
    assert_eq!(detail.vehicle.review_count, 0);
    assert_eq!(detail.vehicle.avg_rating, 0.0);

    // The moderation listing shows every state, with pagination meta.
    let all = review_service::list_all(
        &state,
        &staff,
        AdminReviewQuery {
            pagination: Pagination {
                page: Some(1),
                per_page: Some(20),
            },
            approved: None,
        },
    )
    .await?;
    assert_eq!(all.meta.as_ref().and_then(|m| m.total), Some(1));
    assert_eq!(all.data.expect("admin list").items.len(), 1);

    // Content edits are owner-or-Admin; staff without ownership is rejected.
    let staff_edit = review_service::update(
        &state,
        &staff,
        review.id,
        UpdateReviewRequest {
            title: "Edited".into(),
            text: "An employee should not edit this".into(),
            rating: 3,
        },
    )
    .await;
    assert!(matches!(staff_edit, Err(AppError::Forbidden)));

    let owner_edit = review_service::update(
        &state,
        &session,
        review.id,
        UpdateReviewRequest {
            title: "Still great".into(),
            text: "Loved driving it, smooth ride indeed".into(),
            rating: 4,
        },
    )
    .await?;
    assert_eq!(owner_edit.data.expect("updated").review.rating, 4);

    // Role gate on inventory: a client cannot delete the vehicle.
    let delete = inventory_service::delete_vehicle(&state, &session, inv_id).await;
    assert!(matches!(delete, Err(AppError::Forbidden)));
    let still_there = inventory_service::vehicle_detail(&state, None, inv_id).await;
    assert!(still_there.is_ok());

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    // SAFETY: every test process sets the same value before issuing tokens.
    unsafe { std::env::set_var("JWT_SECRET", "test-secret") };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs.
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE reviews, audit_logs, inventory, classifications, accounts RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        cookie_secure: false,
    };

    Ok(Some(AppState { pool, orm, config }))
}

async fn seed_vehicle(state: &AppState) -> anyhow::Result<i32> {
    let classification = ClassificationActive {
        id: NotSet,
        name: Set("Sport".into()),
    }
    .insert(&state.orm)
    .await?;

    let vehicle = VehicleActive {
        id: NotSet,
        make: Set("Chevy".into()),
        model: Set("Camaro".into()),
        year: Set(2018),
        description: Set("If you want to look cool this is the car you need!".into()),
        image: Set("/images/vehicles/camaro.jpg".into()),
        thumbnail: Set("/images/vehicles/camaro-tn.jpg".into()),
        price: Set(25000),
        miles: Set(101222),
        color: Set("Red".into()),
        classification_id: Set(classification.id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(vehicle.id)
}

async fn seed_staff(state: &AppState, email: &str, role: Role) -> anyhow::Result<SessionUser> {
    let account = axum_motors::entity::accounts::ActiveModel {
        id: NotSet,
        first_name: Set("Staff".into()),
        last_name: Set("Member".into()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(SessionUser {
        account_id: account.id,
        first_name: account.first_name,
        last_name: account.last_name,
        email: account.email,
        role,
    })
}
