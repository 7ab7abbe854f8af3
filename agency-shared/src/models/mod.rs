/// Database models
///
/// # Models
///
/// - `user`: User accounts, roles, and the agency backfill queries
/// - `agency`: Agencies (organizational tenants) and agency naming
///
/// # Example
///
/// ```no_run
/// use agency_shared::models::agency::{Agency, CreateAgency};
/// use agency_shared::models::user::User;
/// use agency_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let candidates = User::list_missing_agency(&pool).await?;
/// if let Some(user) = candidates.first() {
///     let mut tx = pool.begin().await?;
///     let agency = Agency::create(
///         &mut *tx,
///         CreateAgency::for_owner(user.agency_name(), user.email.clone()),
///     )
///     .await?;
///     User::assign_agency(&mut *tx, user.id, agency.id).await?;
///     tx.commit().await?;
/// }
/// # Ok(())
/// # }
/// ```

pub mod agency;
pub mod user;
