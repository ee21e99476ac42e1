use axum_motors::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::inventory::{CreateClassificationRequest, CreateVehicleRequest, UpdateVehicleRequest},
    error::AppError,
    middleware::auth::SessionUser,
    models::Role,
    services::inventory_service,
    state::AppState,
};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Statement};

// Staff-side inventory management: classifications, vehicle CRUD, and the
// aggregate listing reads.
#[tokio::test]
async fn inventory_management_flow() -> anyhow::Result<()> {
    let state = match setup_state().await? {
        Some(s) => s,
        None => return Ok(()),
    };

    let employee = seed_account(&state, "employee@motors.example", Role::Employee).await?;
    let client = seed_account(&state, "client@motors.example", Role::Client).await?;

    // Classifications: staff only.
    let denied = inventory_service::add_classification(
        &state,
        &client,
        CreateClassificationRequest { name: "SUV".into() },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let suv = inventory_service::add_classification(
        &state,
        &employee,
        CreateClassificationRequest { name: "SUV".into() },
    )
    .await?;
    let suv = suv.data.expect("classification");

    let blank = inventory_service::add_classification(
        &state,
        &employee,
        CreateClassificationRequest { name: "   ".into() },
    )
    .await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let listed = inventory_service::list_classifications(&state.pool).await?;
    assert!(
        listed
            .data
            .expect("classification list")
            .items
            .iter()
            .any(|c| c.id == suv.id)
    );

    // Vehicles: add two out of alphabetical order, the listing sorts by
    // make then model.
    let jeep = add_vehicle(&state, &employee, "Jeep", "Wrangler", suv.id).await?;
    let ford = add_vehicle(&state, &employee, "Ford", "Explorer", suv.id).await?;

    let listing = inventory_service::vehicles_by_classification(&state.pool, suv.id).await?;
    let listing = listing.data.expect("vehicle list");
    assert_eq!(listing.classification_name, "SUV");
    let makes: Vec<&str> = listing.items.iter().map(|v| v.make.as_str()).collect();
    assert_eq!(makes, vec!["Ford", "Jeep"]);
    assert!(listing.items.iter().all(|v| v.review_count == 0));

    let missing = inventory_service::vehicles_by_classification(&state.pool, 9999).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // The bare JSON rows are staff-gated.
    let rows = inventory_service::vehicles_json(&state, &employee, suv.id).await?;
    assert_eq!(rows.len(), 2);
    let denied = inventory_service::vehicles_json(&state, &client, suv.id).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    // Partial update.
    let updated = inventory_service::update_vehicle(
        &state,
        &employee,
        ford.id,
        UpdateVehicleRequest {
            price: Some(19999),
            color: Some("Blue".into()),
            make: None,
            model: None,
            year: None,
            description: None,
            image: None,
            thumbnail: None,
            miles: None,
            classification_id: None,
        },
    )
    .await?;
    let updated = updated.data.expect("updated vehicle").vehicle;
    assert_eq!(updated.price, 19999);
    assert_eq!(updated.color, "Blue");
    assert_eq!(updated.make, "Ford");

    // Pointing a vehicle at a classification that does not exist fails at the
    // store and leaves the row unchanged.
    let broken = inventory_service::update_vehicle(
        &state,
        &employee,
        ford.id,
        UpdateVehicleRequest {
            classification_id: Some(9999),
            make: None,
            model: None,
            year: None,
            description: None,
            image: None,
            thumbnail: None,
            price: None,
            miles: None,
            color: None,
        },
    )
    .await;
    assert!(matches!(broken, Err(AppError::OrmError(_))));

    let unchanged = inventory_service::get_vehicle(&state, &employee, ford.id).await?;
    assert_eq!(
        unchanged.data.expect("vehicle").vehicle.classification_id,
        suv.id
    );

    // Delete, then the detail read reports not found.
    inventory_service::delete_vehicle(&state, &employee, jeep.id).await?;
    let gone = inventory_service::vehicle_detail(&state, None, jeep.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
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

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

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

async fn seed_account(state: &AppState, email: &str, role: Role) -> anyhow::Result<SessionUser> {
    let account = axum_motors::entity::accounts::ActiveModel {
        id: NotSet,
        first_name: Set("Test".into()),
        last_name: Set("Account".into()),
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

async fn add_vehicle(
    state: &AppState,
    user: &SessionUser,
    make: &str,
    model: &str,
    classification_id: i32,
) -> anyhow::Result<axum_motors::models::Vehicle> {
    let resp = inventory_service::add_vehicle(
        state,
        user,
        CreateVehicleRequest {
            make: make.into(),
            model: model.into(),
            year: 2020,
            description: "A dependable vehicle for the whole family".into(),
            image: format!("/images/vehicles/{}.jpg", model.to_lowercase()),
            thumbnail: format!("/images/vehicles/{}-tn.jpg", model.to_lowercase()),
            price: 30000,
            miles: 40000,
            color: "Black".into(),
            classification_id,
        },
    )
    .await?;
    Ok(resp.data.expect("vehicle data").vehicle)
}
