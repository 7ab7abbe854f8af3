/// Configuration for the backfill run
///
/// Loaded from environment variables, with a `.env` file honoured for local
/// development.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `APP_ENV` or `NODE_ENV`: `production` enables TLS to the database
/// - `DATABASE_CONNECT_TIMEOUT_SECS`: connect timeout (default: 10)
/// - `BACKFILL_CONTINUE_ON_ERROR`: keep going after a failed user (default: false)
/// - `BACKFILL_DRY_RUN`: report what would be created without writing (default: false)
/// - `RUST_LOG`: log filter
///
/// # Example
///
/// ```no_run
/// use agency_backfill::config::BackfillConfig;
///
/// # fn example() -> Result<(), agency_backfill::error::ConfigError> {
/// let config = BackfillConfig::from_env()?;
/// println!("TLS required: {}", config.database.require_tls);
/// # Ok(())
/// # }
/// ```

use agency_shared::db::pool::{DatabaseConfig, DEFAULT_CONNECT_TIMEOUT_SECONDS};
use std::env;

use crate::error::ConfigError;

/// What to do when a single user fails to provision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failed user
    #[default]
    Abort,

    /// Record the failure and move on to the next user
    Continue,
}

/// Complete backfill configuration
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    /// Database pool configuration
    pub database: DatabaseConfig,

    /// Deployment environment name (e.g. "production", "development")
    pub environment: String,

    /// Per-user failure handling
    pub failure_policy: FailurePolicy,

    /// Select and report only
    pub dry_run: bool,
}

impl BackfillConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a variable has an
    /// unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let environment = lookup("APP_ENV")
            .or_else(|| lookup("NODE_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let connect_timeout_seconds = match lookup("DATABASE_CONNECT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0).ok_or(
                ConfigError::Invalid {
                    key: "DATABASE_CONNECT_TIMEOUT_SECS",
                    value: raw,
                },
            )?,
            None => DEFAULT_CONNECT_TIMEOUT_SECONDS,
        };

        let continue_on_error = parse_flag(&lookup, "BACKFILL_CONTINUE_ON_ERROR")?;
        let dry_run = parse_flag(&lookup, "BACKFILL_DRY_RUN")?;

        let require_tls = is_production(&environment);

        Ok(Self {
            database: DatabaseConfig {
                url,
                connect_timeout_seconds,
                require_tls,
                ..Default::default()
            },
            environment,
            failure_policy: if continue_on_error {
                FailurePolicy::Continue
            } else {
                FailurePolicy::Abort
            },
            dry_run,
        })
    }
}

fn is_production(environment: &str) -> bool {
    environment.trim().eq_ignore_ascii_case("production")
}

fn parse_flag<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}
