use std::path::PathBuf;

/// Filesystem layout handed to the renewal job.
///
/// The ACME client works against three locations: the config root holding
/// issued certificate material (the part that gets snapshotted), a scratch
/// work directory, and a logs directory. Only `cert_dir` round-trips through
/// the shared store.
#[derive(Debug, Clone)]
pub struct CertPaths {
    /// Root of the snapshotted certificate working directory.
    pub cert_dir: PathBuf,
    /// Scratch directory passed to the ACME client via `--work-dir`.
    pub work_dir: PathBuf,
    /// Directory passed to the ACME client via `--logs-dir`.
    pub logs_dir: PathBuf,
}

impl CertPaths {
    pub fn new(cert_dir: PathBuf, work_dir: PathBuf, logs_dir: PathBuf) -> Self {
        Self {
            cert_dir,
            work_dir,
            logs_dir,
        }
    }

    /// Config root passed to the ACME client via `--config-dir`.
    pub fn config_dir(&self) -> PathBuf {
        self.cert_dir.join("etc")
    }

    /// The live certificate file for a domain.
    ///
    /// Its presence is the renewal gate: a domain without one was never
    /// issued a certificate, and issuance is not this job's business.
    pub fn live_cert(&self, domain: &str) -> PathBuf {
        self.config_dir().join("live").join(domain).join("cert.pem")
    }

    pub fn has_live_cert(&self, domain: &str) -> bool {
        self.live_cert(domain).is_file()
    }

    /// Create the working directories if absent. Idempotent.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.cert_dir)?;
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(&self.logs_dir)
    }
}
