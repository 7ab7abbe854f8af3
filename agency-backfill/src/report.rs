/// Run reporting
///
/// Collects what happened to each candidate and decides the process exit
/// status.
///
/// # State Machine
///
/// ```text
/// Running ──finish()──> Terminated(Succeeded | Failed)
///    └─────abort()────> Terminated(Failed)
/// ```
///
/// A run is `Succeeded` only if selection worked and no candidate failed.

use std::fmt;
use uuid::Uuid;

use agency_shared::models::user::BackfillCandidate;

use crate::error::BackfillError;
use crate::store::ProvisionedAgency;

/// Final status of a terminated run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Iterating candidates
    Running,

    /// Finished, one way or the other
    Terminated(RunStatus),
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Agency created and user linked
    Linked {
        user_id: Uuid,
        email: String,
        agency_id: Uuid,
        agency_name: String,
    },

    /// Dry run: the agency that would have been created
    Planned {
        user_id: Uuid,
        email: String,
        agency_name: String,
    },

    /// Provisioning failed; nothing was written for this user
    Failed {
        user_id: Uuid,
        email: String,
        step: &'static str,
        error: String,
    },
}

impl RowOutcome {
    pub fn user_id(&self) -> Uuid {
        match self {
            RowOutcome::Linked { user_id, .. }
            | RowOutcome::Planned { user_id, .. }
            | RowOutcome::Failed { user_id, .. } => *user_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RowOutcome::Failed { .. })
    }
}

/// Accumulated results of one backfill run
#[derive(Debug, Clone)]
pub struct RunReport {
    state: RunState,
    dry_run: bool,
    candidates_found: usize,
    outcomes: Vec<RowOutcome>,
    fatal_error: Option<String>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        RunReport {
            state: RunState::Running,
            dry_run,
            candidates_found: 0,
            outcomes: Vec::new(),
            fatal_error: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn candidates_found(&self) -> usize {
        self.candidates_found
    }

    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    /// Error that ended the run before any candidate was processed
    pub fn fatal_error(&self) -> Option<&str> {
        self.fatal_error.as_deref()
    }

    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Candidates never attempted (only non-zero after an abort)
    pub fn unprocessed(&self) -> usize {
        self.candidates_found.saturating_sub(self.processed())
    }

    pub fn record_candidates(&mut self, count: usize) {
        debug_assert_eq!(self.state, RunState::Running);
        self.candidates_found = count;
    }

    pub fn record_linked(&mut self, candidate: &BackfillCandidate, agency: ProvisionedAgency) {
        debug_assert_eq!(self.state, RunState::Running);
        self.outcomes.push(RowOutcome::Linked {
            user_id: candidate.id,
            email: candidate.email.clone(),
            agency_id: agency.agency_id,
            agency_name: agency.agency_name,
        });
    }

    pub fn record_planned(&mut self, candidate: &BackfillCandidate, agency_name: String) {
        debug_assert_eq!(self.state, RunState::Running);
        self.outcomes.push(RowOutcome::Planned {
            user_id: candidate.id,
            email: candidate.email.clone(),
            agency_name,
        });
    }

    pub fn record_failed(&mut self, candidate: &BackfillCandidate, error: &BackfillError) {
        debug_assert_eq!(self.state, RunState::Running);
        self.outcomes.push(RowOutcome::Failed {
            user_id: candidate.id,
            email: candidate.email.clone(),
            step: error.step(),
            error: error.to_string(),
        });
    }

    /// Terminates the run after an error that is not tied to one candidate
    pub fn abort(&mut self, error: &BackfillError) {
        self.fatal_error = Some(error.to_string());
        self.state = RunState::Terminated(RunStatus::Failed);
    }

    /// Terminates the run normally; fails if any candidate failed
    pub fn finish(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        let status = if self.failed() == 0 {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        };
        self.state = RunState::Terminated(status);
    }

    /// True once terminated without any failure
    pub fn is_success(&self) -> bool {
        self.state == RunState::Terminated(RunStatus::Succeeded)
    }

    /// Process exit code: 0 on success, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Writes the summary banner and any failures to the log
    pub fn log_summary(&self) {
        if let Some(error) = &self.fatal_error {
            tracing::error!(error = %error, "Backfill aborted before processing any users");
            return;
        }

        for outcome in &self.outcomes {
            if let RowOutcome::Failed {
                user_id,
                email,
                step,
                error,
            } = outcome
            {
                tracing::error!(user_id = %user_id, email = %email, step = *step, error = %error, "User not backfilled");
            }
        }

        if self.is_success() {
            tracing::info!(
                candidates = self.candidates_found,
                succeeded = self.succeeded(),
                dry_run = self.is_dry_run(),
                "{}",
                self
            );
        } else {
            tracing::error!(
                candidates = self.candidates_found,
                succeeded = self.succeeded(),
                failed = self.failed(),
                unprocessed = self.unprocessed(),
                "{}",
                self
            );
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.fatal_error {
            return write!(f, "Backfill failed: {}", error);
        }

        let verb = if self.is_dry_run() { "planned" } else { "linked" };

        match self.state {
            RunState::Running => write!(
                f,
                "Backfill running: {} of {} users processed",
                self.processed(),
                self.candidates_found
            ),
            RunState::Terminated(RunStatus::Succeeded) => write!(
                f,
                "Backfill complete: {} of {} users {}",
                self.succeeded(),
                self.candidates_found,
                verb
            ),
            RunState::Terminated(RunStatus::Failed) => write!(
                f,
                "Backfill failed: processed {} of {} users ({} {}, {} failed, {} not attempted)",
                self.processed(),
                self.candidates_found,
                self.succeeded(),
                verb,
                self.failed(),
                self.unprocessed()
            ),
        }
    }
}
