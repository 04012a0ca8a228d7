use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Sandbox for one job run: working directories, a SQLite store, and a fake
/// certbot that records its `--cert-name` arguments.
pub struct JobEnv {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl JobEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn cert_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.dir.path().join("logs")
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("db.sqlite3")
    }

    pub fn invocation_log(&self) -> PathBuf {
        self.dir.path().join("certbot-invocations.log")
    }

    /// Lay down a live certificate so the domain passes the renewal gate.
    pub fn issue_live_cert(&self, domain: &str) {
        let live = self.cert_dir().join("etc/live").join(domain);
        fs::create_dir_all(&live).unwrap();
        fs::write(live.join("cert.pem"), format!("cert for {domain}")).unwrap();
    }

    /// Install a fake certbot shell script. It appends the `--cert-name`
    /// value to the invocation log and exits 1 for any domain in `failing`.
    pub fn install_fake_certbot(&self, failing: &[&str]) -> PathBuf {
        let script = self.dir.path().join("fake-certbot.sh");
        let mut body = format!(
            "#!/bin/sh\n\
             cert_name=\"\"\n\
             while [ \"$#\" -gt 0 ]; do\n\
             \x20 if [ \"$1\" = \"--cert-name\" ]; then cert_name=\"$2\"; shift; fi\n\
             \x20 shift\n\
             done\n\
             printf '%s\\n' \"$cert_name\" >> '{}'\n",
            self.invocation_log().display()
        );
        for domain in failing {
            body.push_str(&format!(
                "if [ \"$cert_name\" = \"{domain}\" ]; then exit 1; fi\n"
            ));
        }
        body.push_str("exit 0\n");

        fs::write(&script, body).unwrap();
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
        script
    }

    /// Domains the fake certbot was invoked for, in order.
    pub fn invocations(&self) -> Vec<String> {
        match fs::read_to_string(self.invocation_log()) {
            Ok(log) => log.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Run the job binary against this sandbox with the given environment.
    pub fn run_job(&self, certbot: &Path, envs: &[(&str, &str)]) -> Output {
        self.run_job_with_store(certbot, &self.store_path(), envs)
    }

    pub fn run_job_with_store(
        &self,
        certbot: &Path,
        store: &Path,
        envs: &[(&str, &str)],
    ) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_certsync"));
        cmd.arg("--cert-dir")
            .arg(self.cert_dir())
            .arg("--work-dir")
            .arg(self.work_dir())
            .arg("--logs-dir")
            .arg(self.logs_dir())
            .arg("--certbot")
            .arg(certbot)
            .arg("--deploy-hook")
            .arg(self.dir.path().join("deploy-hook"))
            .arg("--store")
            .arg(store)
            .stdin(Stdio::null());

        // Keep the parent test environment from leaking into the job.
        for var in ["AUTO_LETS_ENCRYPT", "MULTISITE", "SERVER_NAME", "DATABASE_URI"] {
            cmd.env_remove(var);
        }
        cmd.env("RUST_LOG", "info");
        for (key, value) in envs {
            cmd.env(key, value);
        }

        cmd.output().unwrap()
    }

    /// Read the snapshot blob straight out of the SQLite store.
    pub fn stored_snapshot(&self) -> Option<Vec<u8>> {
        use rusqlite::OptionalExtension;

        let conn = rusqlite::Connection::open(self.store_path()).unwrap();
        conn.query_row(
            "SELECT data FROM job_cache WHERE file_name = 'folder.tgz';",
            [],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()
        .unwrap()
    }

    /// Extract a snapshot blob into a fresh directory and return its root.
    pub fn extract_snapshot(&self, data: &[u8], name: &str) -> PathBuf {
        let dest = self.dir.path().join(name);
        fs::create_dir_all(&dest).unwrap();
        let decoder = flate2::read::GzDecoder::new(data);
        let mut archive = tar::Archive::new(decoder);
        archive.unpack(&dest).unwrap();
        dest
    }
}
