/// Agency backfill orchestrator
///
/// Gives every non-privileged user without an agency an agency of their own.
///
/// # Flow
///
/// ```text
/// AgencyBackfill::run()
///   ├─> AgencyStore::select_candidates()     (once; failure aborts the run)
///   └─> for each candidate, in order:
///         ├─> derive agency name
///         ├─> AgencyStore::provision_agency() (insert + link, one transaction)
///         └─> RunReport::record_*()
/// ```
///
/// Candidates are processed one at a time. Under [`FailurePolicy::Abort`] the
/// first failed candidate ends the loop; under [`FailurePolicy::Continue`] it
/// is recorded and the loop moves on.
///
/// # Example
///
/// ```no_run
/// use agency_backfill::backfill::AgencyBackfill;
/// use agency_backfill::config::FailurePolicy;
/// use agency_backfill::store::PgAgencyStore;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) {
/// let backfill = AgencyBackfill::new(PgAgencyStore::new(pool), FailurePolicy::Abort);
/// let report = backfill.run().await;
/// report.log_summary();
/// std::process::exit(report.exit_code().into());
/// # }
/// ```

use tracing::{error, info, warn};

use crate::config::FailurePolicy;
use crate::report::RunReport;
use crate::store::AgencyStore;

/// Single-pass backfill over a store
pub struct AgencyBackfill<S> {
    store: S,
    policy: FailurePolicy,
    dry_run: bool,
}

impl<S: AgencyStore> AgencyBackfill<S> {
    pub fn new(store: S, policy: FailurePolicy) -> Self {
        AgencyBackfill {
            store,
            policy,
            dry_run: false,
        }
    }

    /// Select and report only; nothing is written
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the backfill to completion and returns the terminated report
    ///
    /// Never returns early without a report: selection failures are recorded
    /// with [`RunReport::abort`], per-user failures as row outcomes.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::new(self.dry_run);

        info!(dry_run = self.dry_run, policy = ?self.policy, "Selecting users without an agency");

        let candidates = match self.store.select_candidates().await {
            Ok(candidates) => candidates,
            Err(err) => {
                error!(step = err.step(), error = %err, "Candidate selection failed");
                report.abort(&err);
                return report;
            }
        };

        let total = candidates.len();
        report.record_candidates(total);
        info!(count = total, "Found {} users without an agency", total);

        for (index, candidate) in candidates.iter().enumerate() {
            let agency_name = candidate.agency_name();

            if self.dry_run {
                info!(
                    user_id = %candidate.id,
                    email = %candidate.email,
                    agency_name = %agency_name,
                    "Would create agency"
                );
                report.record_planned(candidate, agency_name);
                continue;
            }

            info!(
                user_id = %candidate.id,
                email = %candidate.email,
                position = index + 1,
                total,
                "Processing user"
            );

            match self.store.provision_agency(candidate, &agency_name).await {
                Ok(agency) => {
                    info!(
                        user_id = %candidate.id,
                        agency_id = %agency.agency_id,
                        agency_name = %agency.agency_name,
                        "Created agency and linked user"
                    );
                    report.record_linked(candidate, agency);
                }
                Err(err) => {
                    error!(
                        user_id = %candidate.id,
                        email = %candidate.email,
                        step = err.step(),
                        error = %err,
                        "Failed to backfill user"
                    );
                    report.record_failed(candidate, &err);

                    if self.policy == FailurePolicy::Abort {
                        warn!(
                            remaining = total - (index + 1),
                            "Stopping after first failure"
                        );
                        break;
                    }
                }
            }
        }

        report.finish();
        report
    }
}
