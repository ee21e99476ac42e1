use axum_motors::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::account::{
        AccountListQuery, AddUserRequest, UpdateProfileRequest, UpdatePasswordRequest,
        UpdateUserRequest,
    },
    dto::auth::{LoginRequest, RegisterRequest},
    error::AppError,
    middleware::auth::{SessionUser, verify_session_token},
    models::Role,
    services::{account_service, auth_service},
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};

// Admin user management plus self-service profile and password updates.
#[tokio::test]
async fn account_management_flow() -> anyhow::Result<()> {
    let state = match setup_state().await? {
        Some(s) => s,
        None => return Ok(()),
    };

    // Bootstrap one client and one admin through the public path, then
    // promote the admin directly.
    let client = register(&state, "Jane", "jane@x.com").await?;
    let admin = register(&state, "Boss", "boss@motors.example").await?;
    promote(&state, admin.account_id, Role::Admin).await?;
    let admin = SessionUser {
        role: Role::Admin,
        ..admin
    };

    // A second registration with the same email reports a generic failure.
    let collision = auth_service::register(
        &state.pool,
        RegisterRequest {
            first_name: "Janet".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            password: "another1".into(),
        },
    )
    .await;
    match collision {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Sorry, the registration failed."),
        other => panic!("expected generic registration failure, got {other:?}"),
    }

    // Admin adds an employee with an explicit role.
    let added = account_service::add_user(
        &state,
        &admin,
        AddUserRequest {
            first_name: "Earl".into(),
            last_name: "Employee".into(),
            email: "earl@motors.example".into(),
            password: "workwork1".into(),
            role: Role::Employee,
        },
    )
    .await?;
    let earl = added.data.expect("added user");
    assert_eq!(earl.role, Role::Employee);

    // Role-filtered listing finds exactly the employee.
    let employees = account_service::list_accounts(
        &state,
        &admin,
        AccountListQuery {
            role: Some(Role::Employee),
        },
    )
    .await?;
    let employees = employees.data.expect("employee list").items;
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].email, "earl@motors.example");

    // The management JSON endpoint keeps its one-element-array shape.
    let json = account_service::get_account_json(&state, &admin, earl.id).await?;
    assert_eq!(json.len(), 1);
    assert_eq!(json[0].id, earl.id);

    // A client may not touch management operations.
    let listing = account_service::list_accounts(&state, &client, AccountListQuery { role: None }).await;
    assert!(matches!(listing, Err(AppError::Forbidden)));

    // Admin edits the employee, including the role.
    let updated = account_service::update_user_account(
        &state,
        &admin,
        earl.id,
        UpdateUserRequest {
            first_name: "Earl".into(),
            last_name: "Promoted".into(),
            email: "earl@motors.example".into(),
            role: Role::Admin,
        },
    )
    .await?;
    assert_eq!(updated.data.expect("updated user").role, Role::Admin);

    // Self-service profile update reissues the session with the new name.
    let profile = account_service::update_profile(
        &state,
        &client,
        UpdateProfileRequest {
            first_name: "Janet".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
        },
    )
    .await?;
    let profile = profile.data.expect("profile data");
    let refreshed = verify_session_token(&profile.token).expect("reissued session");
    assert_eq!(refreshed.first_name, "Janet");

    // Updating to an email another account holds reports a generic failure.
    let taken = account_service::update_profile(
        &state,
        &client,
        UpdateProfileRequest {
            first_name: "Janet".into(),
            last_name: "Doe".into(),
            email: "earl@motors.example".into(),
        },
    )
    .await;
    assert!(matches!(taken, Err(AppError::BadRequest(_))));

    // Password update: the old password stops working, the new one logs in.
    account_service::update_password(
        &state,
        &client,
        UpdatePasswordRequest {
            password: "brandnew9".into(),
        },
    )
    .await?;

    let old = auth_service::login(
        &state.pool,
        LoginRequest {
            email: "jane@x.com".into(),
            password: "secret123".into(),
        },
    )
    .await;
    assert!(matches!(old, Err(AppError::InvalidCredentials)));

    let fresh = auth_service::login(
        &state.pool,
        LoginRequest {
            email: "jane@x.com".into(),
            password: "brandnew9".into(),
        },
    )
    .await?;
    assert!(fresh.data.is_some());

    // Admin deletes the account; a second delete reports not found.
    account_service::delete_account(&state, &admin, earl.id).await?;
    let gone = account_service::delete_account(&state, &admin, earl.id).await;
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

    // SAFETY: every test process sets the same value before issuing tokens.
    unsafe { std::env::set_var("JWT_SECRET", "test-secret") };

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

async fn register(state: &AppState, first: &str, email: &str) -> anyhow::Result<SessionUser> {
    let resp = auth_service::register(
        &state.pool,
        RegisterRequest {
            first_name: first.into(),
            last_name: "Doe".into(),
            email: email.into(),
            password: "secret123".into(),
        },
    )
    .await?;
    let account = resp.data.expect("registered account");
    Ok(SessionUser {
        account_id: account.id,
        first_name: account.first_name,
        last_name: account.last_name,
        email: account.email,
        role: account.role,
    })
}

async fn promote(state: &AppState, account_id: i32, role: Role) -> anyhow::Result<()> {
    sqlx::query("UPDATE accounts SET role = $1 WHERE id = $2")
        .bind(role.as_str())
        .bind(account_id)
        .execute(&state.pool)
        .await?;
    Ok(())
}
