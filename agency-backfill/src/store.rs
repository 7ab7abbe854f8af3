/// Storage seam for the backfill
///
/// The orchestrator talks to storage only through [`AgencyStore`]. The
/// PostgreSQL implementation runs agency creation and user linking in one
/// transaction per user, so a failed link never leaves an orphaned agency.
///
/// # Example
///
/// ```no_run
/// use agency_backfill::store::{AgencyStore, PgAgencyStore};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let store = PgAgencyStore::new(pool);
///
/// for candidate in store.select_candidates().await? {
///     let name = candidate.agency_name();
///     let agency = store.provision_agency(&candidate, &name).await?;
///     println!("{} -> {}", candidate.email, agency.agency_id);
/// }
/// # Ok(())
/// # }
/// ```

use agency_shared::models::agency::{Agency, CreateAgency};
use agency_shared::models::user::{BackfillCandidate, User};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{BackfillError, BackfillResult};

/// Agency created for a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAgency {
    pub agency_id: Uuid,
    pub agency_name: String,
}

/// Reads candidates and provisions agencies for them
#[async_trait]
pub trait AgencyStore: Send + Sync {
    /// Non-privileged users without an agency, in insertion order
    async fn select_candidates(&self) -> BackfillResult<Vec<BackfillCandidate>>;

    /// Creates an agency named `agency_name` owned by `candidate` and links
    /// the candidate to it, atomically
    async fn provision_agency(
        &self,
        candidate: &BackfillCandidate,
        agency_name: &str,
    ) -> BackfillResult<ProvisionedAgency>;
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgAgencyStore {
    pool: PgPool,
}

impl PgAgencyStore {
    pub fn new(pool: PgPool) -> Self {
        PgAgencyStore { pool }
    }
}

#[async_trait]
impl AgencyStore for PgAgencyStore {
    async fn select_candidates(&self) -> BackfillResult<Vec<BackfillCandidate>> {
        User::list_missing_agency(&self.pool)
            .await
            .map_err(BackfillError::Selection)
    }

    async fn provision_agency(
        &self,
        candidate: &BackfillCandidate,
        agency_name: &str,
    ) -> BackfillResult<ProvisionedAgency> {
        let user_id = candidate.id;

        // Dropping `tx` on an early return rolls back the agency insert.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| BackfillError::Transaction { user_id, source })?;

        let agency = Agency::create(
            &mut *tx,
            CreateAgency::for_owner(agency_name, candidate.email.as_str()),
        )
        .await
        .map_err(|source| BackfillError::AgencyInsert { user_id, source })?;

        debug!(user_id = %user_id, agency_id = %agency.id, "Agency inserted");

        let linked = User::assign_agency(&mut *tx, user_id, agency.id)
            .await
            .map_err(|source| BackfillError::Association {
                user_id,
                agency_id: agency.id,
                source,
            })?;

        if !linked {
            if let Err(err) = tx.rollback().await {
                warn!(user_id = %user_id, error = %err, "Rollback after unmatched update failed");
            }
            return Err(BackfillError::UserNotUpdated { user_id });
        }

        tx.commit()
            .await
            .map_err(|source| BackfillError::Transaction { user_id, source })?;

        Ok(ProvisionedAgency {
            agency_id: agency.id,
            agency_name: agency.name,
        })
    }
}
