use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_motors::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_account(&pool, "admin@motors.example", "admin123", "Admin").await?;
    let employee_id =
        ensure_account(&pool, "employee@motors.example", "employee123", "Employee").await?;
    let client_id = ensure_account(&pool, "client@motors.example", "client123", "Client").await?;
    seed_inventory(&pool).await?;

    println!("Seed completed. Admin: {admin_id}, Employee: {employee_id}, Client: {client_id}");
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<i32> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    // First/last name derived from the mailbox for demo purposes.
    let first_name = email.split('@').next().unwrap_or("Demo");

    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        INSERT INTO accounts (first_name, last_name, email, password_hash, role)
        VALUES (initcap($1), 'Demo', $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(first_name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let account_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (i32,) = sqlx::query_as("SELECT id FROM accounts WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured account {email} (role={role})");
    Ok(account_id)
}

async fn seed_inventory(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let classifications = ["Custom", "Sedan", "Sport", "SUV", "Truck"];
    for name in classifications {
        sqlx::query("INSERT INTO classifications (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?;
    }

    let vehicles = vec![
        (
            "DMC",
            "DeLorean",
            1981,
            "So fast it's almost like traveling in time.",
            "/images/vehicles/delorean.jpg",
            "/images/vehicles/delorean-tn.jpg",
            65000_i64,
            20336,
            "Silver",
            "Custom",
        ),
        (
            "Chevy",
            "Camaro",
            2018,
            "If you want to look cool this is the car you need!",
            "/images/vehicles/camaro.jpg",
            "/images/vehicles/camaro-tn.jpg",
            25000_i64,
            101222,
            "Red",
            "Sport",
        ),
        (
            "Ford",
            "Crown Victoria",
            2013,
            "After the police force updated their fleet, this cruiser became available.",
            "/images/vehicles/crwn-vic.jpg",
            "/images/vehicles/crwn-vic-tn.jpg",
            10000_i64,
            108247,
            "White",
            "Sedan",
        ),
    ];

    for (make, model, year, description, image, thumbnail, price, miles, color, class_name) in
        vehicles
    {
        sqlx::query(
            r#"
            INSERT INTO inventory
                (make, model, year, description, image, thumbnail, price, miles, color, classification_id)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, c.id
            FROM classifications c
            WHERE c.name = $10
              AND NOT EXISTS (SELECT 1 FROM inventory WHERE make = $1 AND model = $2)
            "#,
        )
        .bind(make)
        .bind(model)
        .bind(year)
        .bind(description)
        .bind(image)
        .bind(thumbnail)
        .bind(price)
        .bind(miles)
        .bind(color)
        .bind(class_name)
        .execute(pool)
        .await?;
    }

    println!("Seeded inventory");
    Ok(())
}
