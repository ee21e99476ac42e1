use axum_motors::{
    middleware::auth::{SessionUser, ensure_admin, ensure_staff, verify_session_token},
    models::{Account, Role},
    services::auth_service::issue_session,
};
use chrono::Utc;

fn set_test_secret() {
    // SAFETY: every test sets the same value, so concurrent setters are benign.
    unsafe { std::env::set_var("JWT_SECRET", "test-secret") };
}

fn demo_account(role: Role) -> Account {
    Account {
        id: 42,
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "jane@x.com".into(),
        role,
        created_at: Utc::now(),
    }
}

fn session_for(role: Role) -> SessionUser {
    SessionUser {
        account_id: 42,
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "jane@x.com".into(),
        role,
    }
}

#[test]
fn token_round_trip_restores_identity() {
    set_test_secret();
    let account = demo_account(Role::Client);
    let token = issue_session(&account).expect("token");

    let session = verify_session_token(&token).expect("valid session");
    assert_eq!(session.account_id, 42);
    assert_eq!(session.first_name, "Jane");
    assert_eq!(session.email, "jane@x.com");
    assert_eq!(session.role, Role::Client);
}

#[test]
fn tampered_token_degrades_to_anonymous() {
    set_test_secret();
    let account = demo_account(Role::Admin);
    let token = issue_session(&account).expect("token");

    let mut tampered = token.clone();
    tampered.push('x');
    assert!(verify_session_token(&tampered).is_none());
    assert!(verify_session_token("not-a-token").is_none());
}

#[test]
fn role_order_admin_subsumes_employee() {
    assert!(Role::Admin.satisfies(Role::Employee));
    assert!(Role::Admin.satisfies(Role::Client));
    assert!(Role::Employee.satisfies(Role::Client));
    assert!(!Role::Employee.satisfies(Role::Admin));
    assert!(!Role::Client.satisfies(Role::Employee));
}

#[test]
fn role_gates_reject_below_required() {
    assert!(ensure_admin(&session_for(Role::Admin)).is_ok());
    assert!(ensure_admin(&session_for(Role::Employee)).is_err());
    assert!(ensure_admin(&session_for(Role::Client)).is_err());

    assert!(ensure_staff(&session_for(Role::Admin)).is_ok());
    assert!(ensure_staff(&session_for(Role::Employee)).is_ok());
    assert!(ensure_staff(&session_for(Role::Client)).is_err());
}

#[test]
fn role_parses_only_known_values() {
    assert_eq!("Client".parse::<Role>().unwrap(), Role::Client);
    assert_eq!("Employee".parse::<Role>().unwrap(), Role::Employee);
    assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
    assert!("client".parse::<Role>().is_err());
    assert!("Superuser".parse::<Role>().is_err());
}
