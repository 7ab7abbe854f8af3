/// Error types for the agency backfill
///
/// Every variant names the step that failed. Per-row variants carry the user
/// ID so a failed run can be traced back to the row that stopped it.

use thiserror::Error;
use uuid::Uuid;

/// Backfill error
#[derive(Debug, Error)]
pub enum BackfillError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Could not reach the database
    #[error("Database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Candidate selection query failed
    #[error("Failed to select users without an agency: {0}")]
    Selection(#[source] sqlx::Error),

    /// Could not open or commit the per-user transaction
    #[error("Transaction failed for user {user_id}: {source}")]
    Transaction {
        user_id: Uuid,
        #[source]
        source: sqlx::Error,
    },

    /// Agency insert failed
    #[error("Failed to create agency for user {user_id}: {source}")]
    AgencyInsert {
        user_id: Uuid,
        #[source]
        source: sqlx::Error,
    },

    /// User update failed
    #[error("Failed to link user {user_id} to agency {agency_id}: {source}")]
    Association {
        user_id: Uuid,
        agency_id: Uuid,
        #[source]
        source: sqlx::Error,
    },

    /// User update matched no row
    #[error("User {user_id} was not updated: no unlinked user with that ID")]
    UserNotUpdated { user_id: Uuid },
}

impl BackfillError {
    /// Short name of the step that failed, for log fields
    pub fn step(&self) -> &'static str {
        match self {
            BackfillError::Config(_) => "config",
            BackfillError::Connection(_) => "connect",
            BackfillError::Selection(_) => "select",
            BackfillError::Transaction { .. } => "transaction",
            BackfillError::AgencyInsert { .. } => "create_agency",
            BackfillError::Association { .. } | BackfillError::UserNotUpdated { .. } => {
                "link_user"
            }
        }
    }
}

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is not set
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    /// Environment variable has an unusable value
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Backfill result type alias
pub type BackfillResult<T> = Result<T, BackfillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        let user_id = Uuid::new_v4();
        assert_eq!(
            BackfillError::Selection(sqlx::Error::PoolTimedOut).step(),
            "select"
        );
        assert_eq!(
            BackfillError::AgencyInsert {
                user_id,
                source: sqlx::Error::RowNotFound
            }
            .step(),
            "create_agency"
        );
        assert_eq!(BackfillError::UserNotUpdated { user_id }.step(), "link_user");
    }

    #[test]
    fn test_config_error_message() {
        let err = BackfillError::from(ConfigError::Missing("DATABASE_URL"));
        assert_eq!(
            err.to_string(),
            "Configuration error: DATABASE_URL environment variable is required"
        );
    }
}
