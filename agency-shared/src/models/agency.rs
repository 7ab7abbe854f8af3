/// Agency model and database operations
///
/// An agency is the organizational tenant that users belong to. Users point at
/// their agency through `users.agency_id`; agencies do not track members.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE agencies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     address TEXT NOT NULL DEFAULT '',
///     phone VARCHAR(50) NOT NULL DEFAULT '',
///     email VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use agency_shared::models::agency::{Agency, CreateAgency};
/// use agency_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let data = CreateAgency::for_owner("Jane Doe's Agency", "jane@x.com");
/// let agency = Agency::create(&pool, data).await?;
/// println!("Created agency: {}", agency.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Suffix appended to every derived agency name
pub const AGENCY_NAME_SUFFIX: &str = "'s Agency";

/// Derives the display name of an agency created on behalf of a user
///
/// Uses `"{first} {last}'s Agency"` when both names are present and
/// non-empty, otherwise `"{local-part}'s Agency"` where the local part is
/// everything before the first `@` of the email (the whole email if it has
/// no `@`).
///
/// # Example
///
/// ```
/// use agency_shared::models::agency::derive_agency_name;
///
/// assert_eq!(
///     derive_agency_name(Some("Jane"), Some("Doe"), "jane@x.com"),
///     "Jane Doe's Agency"
/// );
/// assert_eq!(
///     derive_agency_name(Some(""), None, "bob123@example.com"),
///     "bob123's Agency"
/// );
/// ```
pub fn derive_agency_name(first_name: Option<&str>, last_name: Option<&str>, email: &str) -> String {
    match (first_name, last_name) {
        (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
            format!("{} {}{}", first, last, AGENCY_NAME_SUFFIX)
        }
        _ => {
            let local_part = email.split('@').next().unwrap_or(email);
            format!("{}{}", local_part, AGENCY_NAME_SUFFIX)
        }
    }
}

/// Agency model representing an organizational tenant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Agency {
    /// Unique agency ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Postal address (empty when unknown)
    pub address: String,

    /// Contact phone (empty when unknown)
    pub phone: String,

    /// Contact email, the owning user's email for backfilled agencies
    pub email: Option<String>,

    /// When the agency was created
    pub created_at: DateTime<Utc>,

    /// When the agency was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new agency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAgency {
    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub phone: String,

    pub email: String,
}

impl CreateAgency {
    /// Agency owned by a single user: blank address and phone, the owner's email
    pub fn for_owner(name: impl Into<String>, owner_email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            phone: String::new(),
            email: owner_email.into(),
        }
    }
}

impl Agency {
    /// Creates a new agency
    ///
    /// Accepts any executor so the insert can share a transaction with the
    /// user update that references it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert violates a constraint or the
    /// connection fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use agency_shared::models::agency::{Agency, CreateAgency};
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let mut tx = pool.begin().await?;
    /// let agency = Agency::create(&mut *tx, CreateAgency::for_owner("Acme's Agency", "acme@x.com")).await?;
    /// tx.commit().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create<'e, E>(executor: E, data: CreateAgency) -> Result<Self, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let agency = sqlx::query_as::<_, Agency>(
            r#"
            INSERT INTO agencies (name, address, phone, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, name, address, phone, email, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.address)
        .bind(data.phone)
        .bind(data.email)
        .fetch_one(executor)
        .await?;

        Ok(agency)
    }

    /// Finds an agency by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let agency = sqlx::query_as::<_, Agency>(
            r#"
            SELECT id, name, address, phone, email, created_at, updated_at
            FROM agencies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(agency)
    }

    /// Lists agencies whose contact email matches, oldest first
    ///
    /// Agency emails are not unique, so this returns every match.
    pub async fn list_by_email(pool: &PgPool, email: &str) -> Result<Vec<Self>, sqlx::Error> {
        let agencies = sqlx::query_as::<_, Agency>(
            r#"
            SELECT id, name, address, phone, email, created_at, updated_at
            FROM agencies
            WHERE email = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(email)
        .fetch_all(pool)
        .await?;

        Ok(agencies)
    }

    /// Counts total number of agencies
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agencies")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_first_and_last() {
        assert_eq!(
            derive_agency_name(Some("Jane"), Some("Doe"), "jane@x.com"),
            "Jane Doe's Agency"
        );
    }

    #[test]
    fn test_name_falls_back_to_email_local_part() {
        assert_eq!(
            derive_agency_name(Some(""), Some(""), "bob123@example.com"),
            "bob123's Agency"
        );
        assert_eq!(
            derive_agency_name(None, None, "bob123@example.com"),
            "bob123's Agency"
        );
    }

    #[test]
    fn test_name_needs_both_parts() {
        assert_eq!(
            derive_agency_name(Some("Jane"), None, "jane@x.com"),
            "jane's Agency"
        );
        assert_eq!(
            derive_agency_name(Some("Jane"), Some(""), "jane@x.com"),
            "jane's Agency"
        );
        assert_eq!(
            derive_agency_name(None, Some("Doe"), "jane@x.com"),
            "jane's Agency"
        );
    }

    #[test]
    fn test_name_splits_on_first_at_sign() {
        assert_eq!(
            derive_agency_name(None, None, "odd@name@example.com"),
            "odd's Agency"
        );
    }

    #[test]
    fn test_name_without_at_sign_uses_whole_email() {
        assert_eq!(derive_agency_name(None, None, "localonly"), "localonly's Agency");
    }

    #[test]
    fn test_create_agency_for_owner_defaults() {
        let data = CreateAgency::for_owner("Jane Doe's Agency", "jane@x.com");
        assert_eq!(data.name, "Jane Doe's Agency");
        assert_eq!(data.address, "");
        assert_eq!(data.phone, "");
        assert_eq!(data.email, "jane@x.com");
    }
}
