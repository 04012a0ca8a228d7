mod config;
mod eligibility;
mod paths;
mod pipeline;
mod renew;
mod snapshot;
mod store;

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{RenewConfig, is_yes, overrides_from_env};
use crate::paths::CertPaths;
use crate::pipeline::{RunStatus, exit_code};
use crate::renew::CertbotRenewer;
use crate::store::SqliteSnapshotStore;

/// certsync - certificate renewal job with shared-store state sync
#[derive(Parser)]
#[command(name = "certsync")]
#[command(version)]
#[command(about = "Renews certificates via an external ACME client and syncs the working directory through a shared store")]
pub struct Args {
    /// Global certificate management flag (yes/no)
    #[arg(long, env = "AUTO_LETS_ENCRYPT", default_value = "no")]
    pub auto_renew: String,

    /// Multi-site mode: per-domain flags override the global one (yes/no)
    #[arg(long, env = "MULTISITE", default_value = "no")]
    pub multisite: String,

    /// Space-separated server names to renew
    #[arg(long, env = "SERVER_NAME", default_value = "")]
    pub server_names: String,

    /// Shared store database (path or sqlite:// URI)
    #[arg(long, env = "DATABASE_URI", default_value = "/var/lib/certsync/db.sqlite3")]
    pub store: String,

    /// Certificate working directory, snapshotted wholesale
    #[arg(long, default_value = "/var/cache/certsync/letsencrypt")]
    pub cert_dir: PathBuf,

    /// Scratch directory for the ACME client
    #[arg(long, default_value = "/var/lib/certsync/letsencrypt")]
    pub work_dir: PathBuf,

    /// Log directory for the ACME client
    #[arg(long, default_value = "/var/log/certsync")]
    pub logs_dir: PathBuf,

    /// ACME client binary, invoked once per eligible domain
    #[arg(long, default_value = "certbot")]
    pub certbot: PathBuf,

    /// Deploy hook the ACME client runs after a successful renewal
    #[arg(long, default_value = "/usr/share/certsync/certbot-deploy")]
    pub deploy_hook: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    // The environment is read exactly once; everything downstream takes
    // explicit values.
    let env_snapshot: HashMap<String, String> = std::env::vars().collect();
    let config = RenewConfig::new(
        is_yes(&args.auto_renew),
        is_yes(&args.multisite),
        &args.server_names,
        overrides_from_env(env_snapshot),
    );

    let paths = CertPaths::new(args.cert_dir, args.work_dir, args.logs_dir);
    let store = SqliteSnapshotStore::from_uri(&args.store);
    let renewer = CertbotRenewer {
        certbot: args.certbot,
        deploy_hook: args.deploy_hook,
        paths: paths.clone(),
    };

    let status = match pipeline::run(&config, &paths, &store, &renewer) {
        Ok(report) => report.status,
        Err(e) => {
            tracing::error!("Renewal job failed unexpectedly: {}", e);
            RunStatus::Degraded
        }
    };

    std::process::exit(exit_code(status));
}
