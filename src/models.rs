use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of account roles. Gates are expressed through [`Role::satisfies`]
/// so the Admin ≥ Employee ≥ Client ordering lives in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Client,
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Employee => "Employee",
            Role::Admin => "Admin",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Role::Client => 0,
            Role::Employee => 1,
            Role::Admin => 2,
        }
    }

    /// True when this role grants at least the capabilities of `required`.
    pub fn satisfies(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    pub fn is_staff(&self) -> bool {
        self.satisfies(Role::Employee)
    }

    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Client" => Ok(Role::Client),
            "Employee" => Ok(Role::Employee),
            "Admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account as it leaves the service layer: the password hash is already
/// stripped and the role is parsed into the closed enum.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Raw account row including the stored hash. Never serialized; only the
/// auth/account services see it.
#[derive(Debug, sqlx::FromRow)]
pub struct AccountRecord {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Classification {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Vehicle {
    pub id: i32,
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
    pub created_at: DateTime<Utc>,
}

/// Vehicle joined with its classification name and the aggregate over
/// approved reviews, recomputed at read time.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct VehicleWithStats {
    pub id: i32,
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
    pub classification_name: String,
    pub avg_rating: f64,
    pub review_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Review {
    pub id: i32,
    pub inv_id: i32,
    pub account_id: i32,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Review with its author's name, for the public vehicle detail listing.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct ReviewWithAuthor {
    pub id: i32,
    pub inv_id: i32,
    pub account_id: i32,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
}

/// Review with the reviewed vehicle attached, for the owner's listing.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct ReviewWithVehicle {
    pub id: i32,
    pub inv_id: i32,
    pub account_id: i32,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub make: String,
    pub model: String,
    pub year: i32,
}

/// Review with both author and vehicle context, for moderation and the edit
/// view.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct ReviewWithContext {
    pub id: i32,
    pub inv_id: i32,
    pub account_id: i32,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub make: String,
    pub model: String,
    pub year: i32,
}
