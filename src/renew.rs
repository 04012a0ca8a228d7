use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use crate::eligibility::EligibilityPlan;
use crate::paths::CertPaths;

/// Seam over the external ACME client. Only the exit status is consulted;
/// the tool's own output goes to its `--logs-dir`.
pub trait Renewer {
    fn renew(&self, domain: &str) -> io::Result<ExitStatus>;
}

/// Invokes a certbot-compatible binary once per domain, blocking until it
/// exits. The deploy hook is run by the tool itself after a successful
/// renewal; this job never calls it directly.
pub struct CertbotRenewer {
    pub certbot: PathBuf,
    pub deploy_hook: PathBuf,
    pub paths: CertPaths,
}

impl Renewer for CertbotRenewer {
    fn renew(&self, domain: &str) -> io::Result<ExitStatus> {
        Command::new(&self.certbot)
            .arg("renew")
            .arg("--config-dir")
            .arg(self.paths.config_dir())
            .arg("--work-dir")
            .arg(&self.paths.work_dir)
            .arg("--logs-dir")
            .arg(&self.paths.logs_dir)
            .arg("--cert-name")
            .arg(domain)
            .arg("--deploy-hook")
            .arg(&self.deploy_hook)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
    }
}

/// Per-domain renewal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainOutcome {
    /// Not attempted: unnamed, disabled, or never issued a certificate.
    Skipped,
    Renewed,
    Failed,
}

/// Run the external renewal for every eligible domain, one at a time.
///
/// A domain is only attempted when its effective flag is set and its live
/// certificate already exists; issuance is out of scope. A failed spawn is
/// treated like a nonzero exit for that domain. One domain's failure never
/// stops the remaining attempts.
pub fn run_renewals(
    plan: &EligibilityPlan,
    paths: &CertPaths,
    renewer: &dyn Renewer,
) -> Vec<(String, DomainOutcome)> {
    let mut outcomes = Vec::new();

    for domain in &plan.domains {
        if domain.name.is_empty() || !domain.enabled {
            outcomes.push((domain.name.clone(), DomainOutcome::Skipped));
            continue;
        }
        if !paths.has_live_cert(&domain.name) {
            tracing::debug!(domain = %domain.name, "No live certificate, skipping renewal");
            outcomes.push((domain.name.clone(), DomainOutcome::Skipped));
            continue;
        }

        tracing::info!(domain = %domain.name, "Renewing certificate");
        let outcome = match renewer.renew(&domain.name) {
            Ok(status) if status.success() => DomainOutcome::Renewed,
            Ok(status) => {
                tracing::error!(
                    domain = %domain.name,
                    status = %status,
                    "Certificate renewal failed"
                );
                DomainOutcome::Failed
            }
            Err(e) => {
                tracing::error!(domain = %domain.name, "Failed to run renewal command: {}", e);
                DomainOutcome::Failed
            }
        };
        outcomes.push((domain.name.clone(), outcome));
    }

    outcomes
}
