use crate::config::RenewConfig;
use crate::eligibility;
use crate::paths::CertPaths;
use crate::renew::{DomainOutcome, Renewer, run_renewals};
use crate::snapshot::{self, SnapshotError};
use crate::store::SnapshotStore;

/// Coarse run status reported through the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing needed renewal, or every attempted renewal succeeded.
    Normal,
    /// At least one renewal or the snapshot export failed. The run still
    /// completed; the distinction from an unexpected failure lives in the
    /// log, not the exit code.
    Degraded,
}

/// Map a run status to the job's process exit code.
pub fn exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Normal => 0,
        RunStatus::Degraded => 2,
    }
}

/// Report of one pipeline run.
#[derive(Debug)]
pub struct RunReport {
    pub status: RunStatus,
    pub outcomes: Vec<(String, DomainOutcome)>,
}

impl RunReport {
    fn skipped() -> Self {
        Self {
            status: RunStatus::Normal,
            outcomes: Vec::new(),
        }
    }
}

/// Execute one renewal run: eligibility, snapshot import, per-domain
/// renewal, snapshot export. Strictly forward, no retries.
///
/// The export runs whenever the eligibility pass did not short-circuit,
/// even if every renewal failed or none was attempted: the external tool
/// may have mutated the working directory regardless, and the store must
/// reflect the latest local state every run.
pub fn run(
    config: &RenewConfig,
    paths: &CertPaths,
    store: &dyn SnapshotStore,
    renewer: &dyn Renewer,
) -> Result<RunReport, SnapshotError> {
    let plan = eligibility::resolve(config);
    if !plan.active {
        tracing::info!("Certificate renewal is not activated, skipping");
        return Ok(RunReport::skipped());
    }

    snapshot::import(store, paths)?;

    let outcomes = run_renewals(&plan, paths, renewer);
    let mut status = if outcomes.iter().any(|(_, o)| *o == DomainOutcome::Failed) {
        RunStatus::Degraded
    } else {
        RunStatus::Normal
    };

    match snapshot::export(store, paths) {
        Ok(()) => tracing::info!("Saved certificate data to the shared store"),
        Err(e) => {
            tracing::error!("Failed to save certificate data to the shared store: {}", e);
            status = RunStatus::Degraded;
        }
    }

    Ok(RunReport { status, outcomes })
}
