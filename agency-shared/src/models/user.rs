/// User model and database operations
///
/// Users reference their agency through a nullable `agency_id`. Accounts are
/// provisioned elsewhere; this module reads them and links them to agencies.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     first_name VARCHAR(255),
///     last_name VARCHAR(255),
///     role VARCHAR(50) NOT NULL DEFAULT 'staff',
///     agency_id UUID REFERENCES agencies(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use agency_shared::models::user::User;
/// use agency_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// for candidate in User::list_missing_agency(&pool).await? {
///     println!("{} needs {}", candidate.email, candidate.agency_name());
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::agency::derive_agency_name;

/// Account roles
///
/// Privileged roles operate across agencies and are never assigned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform operator
    SuperAdmin,

    /// Platform administrator
    Admin,

    /// Agency office staff
    Staff,

    /// Field caregiver
    Caregiver,

    /// Care recipient or family contact
    Client,
}

impl UserRole {
    /// Roles excluded from agency assignment
    pub const PRIVILEGED: [UserRole; 2] = [UserRole::SuperAdmin, UserRole::Admin];

    /// Converts role to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
            UserRole::Caregiver => "caregiver",
            UserRole::Client => "client",
        }
    }

    /// Parses role from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(UserRole::SuperAdmin),
            "admin" => Some(UserRole::Admin),
            "staff" => Some(UserRole::Staff),
            "caregiver" => Some(UserRole::Caregiver),
            "client" => Some(UserRole::Client),
            _ => None,
        }
    }

    pub fn is_privileged(&self) -> bool {
        Self::PRIVILEGED.contains(self)
    }
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address, unique across users
    pub email: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    /// Stored role string; see [`UserRole`]
    pub role: String,

    /// Agency the user belongs to (None until backfilled)
    pub agency_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
///
/// Used by provisioning flows and test fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub agency_id: Option<Uuid>,
}

/// A user that still lacks an agency
///
/// Carries only the identity fields needed to synthesize an agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BackfillCandidate {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
}

impl BackfillCandidate {
    /// Name of the agency this user would own
    pub fn agency_name(&self) -> String {
        derive_agency_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            &self.email,
        )
    }
}

fn privileged_role_names() -> Vec<String> {
    UserRole::PRIVILEGED
        .iter()
        .map(|role| role.as_str().to_string())
        .collect()
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists or the connection fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, first_name, last_name, role, agency_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, first_name, last_name, role, agency_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.role.as_str())
        .bind(data.agency_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, role, agency_id,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, role, agency_id,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists non-privileged users with no agency, in insertion order
    ///
    /// Read-only. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or connection fails.
    pub async fn list_missing_agency(pool: &PgPool) -> Result<Vec<BackfillCandidate>, sqlx::Error> {
        let candidates = sqlx::query_as::<_, BackfillCandidate>(
            r#"
            SELECT id, email, first_name, last_name, role
            FROM users
            WHERE agency_id IS NULL
              AND role <> ALL($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(privileged_role_names())
        .fetch_all(pool)
        .await?;

        Ok(candidates)
    }

    /// Counts non-privileged users with no agency
    pub async fn count_missing_agency(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE agency_id IS NULL
              AND role <> ALL($1)
            "#,
        )
        .bind(privileged_role_names())
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Links a user to an agency and refreshes `updated_at`
    ///
    /// Only matches a user whose `agency_id` is still null, so a user linked
    /// by someone else in the meantime is left alone.
    ///
    /// # Returns
    ///
    /// True if a row was updated, false if no unlinked user had this ID
    ///
    /// # Errors
    ///
    /// Returns an error if the agency does not exist (foreign key) or the
    /// connection fails.
    pub async fn assign_agency<'e, E>(
        executor: E,
        user_id: Uuid,
        agency_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET agency_id = $2, updated_at = NOW()
            WHERE id = $1 AND agency_id IS NULL
            "#,
        )
        .bind(user_id)
        .bind(agency_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
